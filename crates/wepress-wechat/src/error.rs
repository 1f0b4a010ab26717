//! Error types for the WeChat API client.

/// Error from WeChat API operations.
#[derive(Debug, thiserror::Error)]
pub enum WechatError {
    /// HTTP transport or status error.
    #[error("HTTP error: {status} - {body}")]
    Http { status: u16, body: String },

    /// Error envelope returned by the WeChat API.
    #[error("WeChat API error {errcode}: {errmsg}")]
    Api { errcode: i64, errmsg: String },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Upload kind outside the supported set.
    #[error("unsupported upload kind '{0}': expected image, video, voice or thumb")]
    UnsupportedKind(String),

    /// Front matter block could not be parsed.
    #[error("front matter error: {0}")]
    FrontMatter(String),
}

impl From<serde_json::Error> for WechatError {
    fn from(e: serde_json::Error) -> Self {
        WechatError::Json(e.to_string())
    }
}

impl From<ureq::Error> for WechatError {
    fn from(e: ureq::Error) -> Self {
        WechatError::Http {
            status: 0,
            body: e.to_string(),
        }
    }
}
