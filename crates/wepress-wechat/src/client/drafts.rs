//! Draft operations for the WeChat API.

use tracing::info;

use super::{WechatClient, check_status, read_response};
use crate::error::WechatError;
use crate::types::{Article, DraftRequest, DraftResponse};

impl WechatClient {
    /// Submit articles as a new draft, returning the draft media id.
    pub fn add_draft(&self, articles: &[Article]) -> Result<String, WechatError> {
        let url = self.api_url("draft/add");

        // The draft endpoint rejects raw CR/LF inside content.
        let articles: Vec<Article> = articles
            .iter()
            .map(|article| {
                let mut article = article.clone();
                article.content.retain(|c| c != '\r' && c != '\n');
                article
            })
            .collect();

        info!("Submitting draft with {} article(s)", articles.len());

        let payload_bytes = serde_json::to_vec(&DraftRequest { articles })?;

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

        let resp: DraftResponse = read_response(response)?;
        check_status(&resp.status)?;
        resp.media_id.ok_or(WechatError::Api {
            errcode: -1,
            errmsg: "draft response without media_id".to_owned(),
        })
    }
}
