//! WeChat Official Account REST API client.
//!
//! Sync HTTP client for the `cgi-bin` API with access-token authentication.
//! The token is fetched once at login; callers create a fresh client when it
//! expires. No retry policy lives here.

mod drafts;
mod material;
mod publish;

pub use material::Material;

use std::time::Duration;

use ureq::Agent;

use crate::error::WechatError;
use crate::types::{AccessTokenResponse, ApiStatus};

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Production API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.weixin.qq.com/cgi-bin";

/// WeChat Official Account API client.
pub struct WechatClient {
    agent: Agent,
    base_url: String,
    access_token: String,
}

impl WechatClient {
    /// Create a client from an already-obtained access token.
    #[must_use]
    pub fn from_token(base_url: &str, access_token: &str) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            access_token: access_token.to_owned(),
        }
    }

    /// Log in with app credentials, fetching an access token.
    pub fn login(base_url: &str, appid: &str, secret: &str) -> Result<Self, WechatError> {
        let mut client = Self::from_token(base_url, "");

        let url = format!(
            "{}/token?grant_type=client_credential&appid={appid}&secret={secret}",
            client.base_url
        );
        tracing::info!("Fetching access token for app {}", appid);

        let response = client
            .agent
            .get(&url)
            .header("Accept", "application/json")
            .call()
            .map_err(|e| WechatError::Http {
                status: 0,
                body: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let mut body_reader = response.into_body();
        if status >= 400 {
            let error_body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(WechatError::Http {
                status,
                body: error_body,
            });
        }

        let token: AccessTokenResponse = body_reader.read_json()?;
        check_status(&token.status)?;
        client.access_token = token.access_token.ok_or(WechatError::Api {
            errcode: -1,
            errmsg: "token response without access_token".to_owned(),
        })?;
        Ok(client)
    }

    /// Build an API URL with the access token attached.
    fn api_url(&self, path: &str) -> String {
        format!(
            "{}/{path}?access_token={}",
            self.base_url, self.access_token
        )
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Map a non-zero error envelope to a typed error.
fn check_status(status: &ApiStatus) -> Result<(), WechatError> {
    if status.errcode == 0 {
        Ok(())
    } else {
        Err(WechatError::Api {
            errcode: status.errcode,
            errmsg: status.errmsg.clone(),
        })
    }
}

/// Read a JSON response, mapping HTTP failures to [`WechatError::Http`].
fn read_response<T: serde::de::DeserializeOwned>(
    response: ureq::http::Response<ureq::Body>,
) -> Result<T, WechatError> {
    let status = response.status().as_u16();
    let mut body_reader = response.into_body();

    if status >= 400 {
        let error_body = body_reader
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(WechatError::Http {
            status,
            body: error_body,
        });
    }

    Ok(body_reader.read_json()?)
}
