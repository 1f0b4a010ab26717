//! `wepress upload` command implementation.

use std::path::PathBuf;

use clap::Args;
use tracing::info;
use wepress_config::{CliSettings, Config};
use wepress_wechat::WechatClient;
use wepress_wechat::multipart::UploadKind;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the upload command.
#[derive(Args)]
pub struct UploadArgs {
    /// File to upload.
    file: PathBuf,

    /// Material kind: image, video, voice or thumb.
    #[arg(short, long, default_value = "image")]
    kind: UploadKind,

    /// Material name (default: the file stem).
    #[arg(short, long)]
    name: Option<String>,

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

impl UploadArgs {
    /// Execute the upload command.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the upload fails.
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

        info!("Uploading {} as {} material", self.file.display(), self.kind);

        let data = std::fs::read(&self.file)?;
        let name = self.name.unwrap_or_else(|| {
            self.file
                .file_stem()
                .map_or_else(|| "material".to_string(), |s| s.to_string_lossy().into_owned())
        });

        let client = WechatClient::login(
            &config.account.base_url,
            &config.account.appid,
            &config.account.secret,
        )?;

        let material = client.upload_material(self.kind, &name, &data)?;
        output.success(&format!("Uploaded {} material '{name}'", self.kind));
        output.highlight(&format!("media_id: {}", material.media_id));
        if let Some(url) = &material.url {
            output.info(&format!("url: {url}"));
        }

        Ok(())
    }
}
