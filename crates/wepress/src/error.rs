//! CLI error types.

use wepress_config::ConfigError;
use wepress_wechat::WechatError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Wechat(#[from] WechatError),

    #[error("{0}")]
    Validation(String),
}
