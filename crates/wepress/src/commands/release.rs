//! `wepress release` command implementation.

use std::path::PathBuf;

use clap::Args;
use tracing::info;
use wepress_config::{CliSettings, Config};
use wepress_wechat::WechatClient;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the release command.
#[derive(Args)]
pub struct ReleaseArgs {
    /// Media id of the draft to release.
    media_id: String,

    /// Push to every follower instead of releasing to the account profile.
    #[arg(long)]
    send_all: bool,

    /// App id (overrides config).
    #[arg(long, env = "WEPRESS_APPID")]
    appid: Option<String>,

    /// App secret (overrides config).
    #[arg(long, env = "WEPRESS_SECRET")]
    secret: Option<String>,

    /// Path to configuration file (default: auto-discover wepress.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ReleaseArgs {
    /// Execute the release command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is incomplete or the API call fails.
    pub fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            appid: self.appid,
            secret: self.secret,
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        if config.account.appid.is_empty() || config.account.secret.is_empty() {
            return Err(CliError::Validation(
                "account.appid and account.secret required (via config or --appid/--secret)"
                    .to_string(),
            ));
        }

        info!("Releasing draft {}", self.media_id);

        let client = WechatClient::login(
            &config.account.base_url,
            &config.account.appid,
            &config.account.secret,
        )?;

        if self.send_all {
            let msg_data_id = client.send_to_all(&self.media_id)?;
            output.success("Draft sent to all subscribers");
            output.highlight(&format!("msg_data_id: {msg_data_id}"));
        } else {
            let publish_id = client.release(&self.media_id)?;
            output.success("Draft released");
            output.highlight(&format!("publish_id: {publish_id}"));
        }

        Ok(())
    }
}
