//! Release and mass-send operations for the WeChat API.
//!
//! Creating a draft does not make it visible; it has to be released through
//! the free-publish endpoint, or pushed to followers as a mass send.

use tracing::info;

use super::{WechatClient, check_status, read_response};
use crate::error::WechatError;
use crate::types::{MassSendRequest, MassSendResponse, ReleaseRequest, ReleaseResponse};

impl WechatClient {
    /// Release a created draft to the platform, returning the publish job id.
    pub fn release(&self, media_id: &str) -> Result<u64, WechatError> {
        let url = self.api_url("freepublish/submit");

        info!("Releasing draft {}", media_id);

        let payload_bytes = serde_json::to_vec(&ReleaseRequest {
            media_id: media_id.to_owned(),
        })?;

        let response = self
            .agent
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])
            .map_err(|e| WechatError::Http {
                status: 0,
                body: e.to_string(),
            })?;

        let resp: ReleaseResponse = read_response(response)?;
        check_status(&resp.status)?;
        resp.publish_id.ok_or(WechatError::Api {
            errcode: -1,
            errmsg: "release response without publish_id".to_owned(),
        })
    }

    /// Push a draft to every follower, returning the message data id.
    ///
    /// Normal accounts may mass send once per day; the platform enforces the
    /// quota, this client only reports the resulting error.
    pub fn send_to_all(&self, media_id: &str) -> Result<u64, WechatError> {
        let url = self.api_url("message/mass/sendall");

        info!("Mass sending draft {}", media_id);

        let payload_bytes = serde_json::to_vec(&MassSendRequest::mpnews(media_id))?;

        let response = self
            .agent
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])
            .map_err(|e| WechatError::Http {
                status: 0,
                body: e.to_string(),
            })?;

        let resp: MassSendResponse = read_response(response)?;
        check_status(&resp.status)?;
        resp.msg_data_id.or(resp.msg_id).ok_or(WechatError::Api {
            errcode: -1,
            errmsg: "mass send response without msg_data_id".to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::types::{MassSendRequest, ReleaseRequest};

    #[test]
    fn test_release_payload_shape() {
        let body = serde_json::to_value(ReleaseRequest {
            media_id: "draft1".to_owned(),
        })
        .expect("serialize");
        assert_eq!(body, serde_json::json!({ "media_id": "draft1" }));
    }

    #[test]
    fn test_mass_send_payload_shape() {
        let body = serde_json::to_value(MassSendRequest::mpnews("draft1")).expect("serialize");
        assert_eq!(
            body,
            serde_json::json!({
                "filter": { "is_to_all": true },
                "mpnews": { "media_id": "draft1" },
                "msgtype": "mpnews",
                "send_ignore_reprint": 0,
            })
        );
    }
}
