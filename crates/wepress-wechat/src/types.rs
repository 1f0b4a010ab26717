//! WeChat API request and response types.

use serde::{Deserialize, Serialize};

/// One article in a draft submission.
#[derive(Debug, Clone, Serialize)]
pub struct Article {
    /// Article title.
    pub title: String,
    /// Display author.
    pub author: String,
    /// Summary shown in feeds.
    pub digest: String,
    /// Publishable HTML content.
    pub content: String,
    /// "Read original" link.
    pub content_source_url: String,
    /// Permanent media id of the cover image.
    pub thumb_media_id: String,
    /// Whether comments are open (0/1).
    pub need_open_comment: u8,
    /// Whether only followers may comment (0/1).
    pub only_fans_can_comment: u8,
}

/// Draft submission request body.
#[derive(Debug, Serialize)]
pub struct DraftRequest {
    /// Articles in the draft (the platform allows several per draft).
    pub articles: Vec<Article>,
}

/// Release (free publish) request body.
#[derive(Debug, Serialize)]
pub struct ReleaseRequest {
    /// Draft media id to release.
    pub media_id: String,
}

/// Release response.
#[derive(Debug, Deserialize)]
pub struct ReleaseResponse {
    /// Id of the publish job, absent on failure.
    pub publish_id: Option<u64>,
    #[serde(flatten)]
    pub status: ApiStatus,
}

/// Mass send request body, pushing a draft to followers.
#[derive(Debug, Serialize)]
pub struct MassSendRequest {
    /// Audience filter.
    pub filter: MassSendFilter,
    /// The draft to send.
    pub mpnews: MediaRef,
    /// Message type, always `mpnews` for article drafts.
    pub msgtype: String,
    /// Whether to send even when the platform flags the content as reprinted.
    pub send_ignore_reprint: u8,
}

impl MassSendRequest {
    /// Build an all-followers mpnews send for a draft.
    #[must_use]
    pub fn mpnews(media_id: &str) -> Self {
        Self {
            filter: MassSendFilter { is_to_all: true },
            mpnews: MediaRef {
                media_id: media_id.to_owned(),
            },
            msgtype: "mpnews".to_owned(),
            send_ignore_reprint: 0,
        }
    }
}

/// Mass send audience filter.
#[derive(Debug, Serialize)]
pub struct MassSendFilter {
    /// Send to every follower.
    pub is_to_all: bool,
}

/// Reference to a piece of material by media id.
#[derive(Debug, Serialize)]
pub struct MediaRef {
    /// Permanent media id.
    pub media_id: String,
}

/// Mass send response.
#[derive(Debug, Deserialize)]
pub struct MassSendResponse {
    /// Id of the send job.
    pub msg_id: Option<u64>,
    /// Id usable to query send status, absent on failure.
    pub msg_data_id: Option<u64>,
    #[serde(flatten)]
    pub status: ApiStatus,
}

/// Error envelope present on every failed response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiStatus {
    /// Zero on success.
    #[serde(default)]
    pub errcode: i64,
    /// Human-readable message.
    #[serde(default)]
    pub errmsg: String,
}

/// Access token response.
#[derive(Debug, Deserialize)]
pub struct AccessTokenResponse {
    /// The token, absent on failure.
    pub access_token: Option<String>,
    /// Validity in seconds.
    #[serde(default)]
    pub expires_in: u64,
    #[serde(flatten)]
    pub status: ApiStatus,
}

/// Permanent material upload response.
#[derive(Debug, Deserialize)]
pub struct MaterialResponse {
    /// Media id of the uploaded material.
    pub media_id: Option<String>,
    /// CDN URL (images only).
    pub url: Option<String>,
    #[serde(flatten)]
    pub status: ApiStatus,
}

/// In-article image upload response.
#[derive(Debug, Deserialize)]
pub struct UploadImageResponse {
    /// Rewritten CDN URL usable inside article content.
    pub url: Option<String>,
    #[serde(flatten)]
    pub status: ApiStatus,
}

/// Draft creation response.
#[derive(Debug, Deserialize)]
pub struct DraftResponse {
    /// Media id of the created draft.
    pub media_id: Option<String>,
    #[serde(flatten)]
    pub status: ApiStatus,
}

/// One item in a material listing.
#[derive(Debug, Clone, Deserialize)]
pub struct MaterialItem {
    /// Permanent media id.
    pub media_id: String,
    /// Filename the material was uploaded under.
    #[serde(default)]
    pub name: String,
    /// CDN URL, if the material has one.
    pub url: Option<String>,
    /// Last update time (unix seconds).
    #[serde(default)]
    pub update_time: u64,
}

/// Material listing response.
#[derive(Debug, Default, Deserialize)]
pub struct MaterialList {
    /// Materials in this page.
    #[serde(default)]
    pub item: Vec<MaterialItem>,
    /// Total number of materials of this type.
    #[serde(default)]
    pub total_count: u32,
    /// Number of items in this page.
    #[serde(default)]
    pub item_count: u32,
    #[serde(flatten)]
    pub status: ApiStatus,
}
