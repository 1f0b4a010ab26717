//! `wepress publish` command implementation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use clap::Args;
use tracing::info;
use wepress_config::{CliSettings, Config, PublishConfig};
use wepress_pipeline::Pipeline;
use wepress_wechat::front::{ArticleMeta, split_front_matter};
use wepress_wechat::images::{image_paths, rewrite_image_refs};
use wepress_wechat::multipart::UploadKind;
use wepress_wechat::types::Article;
use wepress_wechat::{WechatClient, WechatError};

use crate::error::CliError;
use crate::output::Output;
use crate::render::render_markdown;

/// Arguments for the publish command.
#[derive(Args)]
pub struct PublishArgs {
    /// Markdown file to publish.
    file: PathBuf,

    /// Article title (overrides front matter and the first heading).
    #[arg(long)]
    title: Option<String>,

    /// Stylesheet to inline (overrides config).
    #[arg(long)]
    css: Option<PathBuf>,

    /// Release the draft to the platform after creating it.
    #[arg(long)]
    release: bool,

    /// Push the draft to every follower after creating it.
    #[arg(long, conflicts_with = "release")]
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

impl PublishArgs {
    /// Execute the publish command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is incomplete, a referenced image
    /// cannot be read, or any API call fails.
    pub fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            appid: self.appid,
            secret: self.secret,
            css_path: self.css,
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        if config.account.appid.is_empty() || config.account.secret.is_empty() {
            return Err(CliError::Validation(
                "account.appid and account.secret required (via config or --appid/--secret)"
                    .to_string(),
            ));
        }

        info!("Publishing {}", self.file.display());

        let markdown = std::fs::read_to_string(&self.file)?;
        let (meta, body) = split_front_matter(&markdown)?;

        let client = WechatClient::login(
            &config.account.base_url,
            &config.account.appid,
            &config.account.secret,
        )?;

        // Push local images up first so the draft references CDN URLs.
        let base_dir = self.file.parent().unwrap_or(Path::new("."));
        let replacements = upload_local_images(&client, &output, base_dir, body)?;
        let body = rewrite_image_refs(body, &replacements);

        let rendered = render_markdown(&body);

        let css_text = match &config.style_resolved.css_path {
            Some(path) => std::fs::read_to_string(path)?,
            None => String::new(),
        };
        let result = Pipeline::new().run(&rendered.html, &css_text);
        for warning in &result.warnings {
            output.warning(&format!("Warning: {warning}"));
        }

        let title = self
            .title
            .or_else(|| meta.title.clone())
            .or(rendered.title)
            .or_else(|| {
                self.file
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
            })
            .ok_or_else(|| CliError::Validation("article title required".to_string()))?;

        let thumb_media_id = resolve_thumb(&client, &meta, &config.publish)?;
        let article = build_article(title, result.html, &meta, &config.publish, thumb_media_id);

        let media_id = client.add_draft(std::slice::from_ref(&article))?;
        output.success(&format!("Draft created for '{}'", article.title));
        output.highlight(&format!("media_id: {media_id}"));

        if self.release {
            let publish_id = client.release(&media_id)?;
            output.success("Draft released");
            output.highlight(&format!("publish_id: {publish_id}"));
        } else if self.send_all {
            let msg_data_id = client.send_to_all(&media_id)?;
            output.success("Draft sent to all subscribers");
            output.highlight(&format!("msg_data_id: {msg_data_id}"));
        }

        Ok(())
    }
}

/// Upload every local image the document references, returning the source
/// path to CDN URL mapping. Remote references pass through untouched.
fn upload_local_images(
    client: &WechatClient,
    output: &Output,
    base_dir: &Path,
    body: &str,
) -> Result<HashMap<String, String>, CliError> {
    let mut replacements = HashMap::new();
    for path in image_paths(body) {
        if path.starts_with("http://") || path.starts_with("https://") {
            continue;
        }
        let file = base_dir.join(&path);
        let data = std::fs::read(&file)?;
        let filename = file
            .file_name()
            .map_or_else(|| path.clone(), |n| n.to_string_lossy().into_owned());

        let url = client.upload_image(&filename, &data)?;
        output.info(&format!("Uploaded {path} -> {url}"));
        replacements.insert(path, url);
    }
    Ok(replacements)
}

/// Pick a cover image id: front matter, then config, then the newest
/// permanent image material on the account.
fn resolve_thumb(
    client: &WechatClient,
    meta: &ArticleMeta,
    defaults: &PublishConfig,
) -> Result<String, CliError> {
    if let Some(id) = meta
        .thumb_media_id
        .clone()
        .or_else(|| defaults.thumb_media_id.clone())
    {
        return Ok(id);
    }

    let list = client.list_materials(UploadKind::Image, 0, 1)?;
    list.item
        .first()
        .map(|item| item.media_id.clone())
        .ok_or_else(|| {
            CliError::Wechat(WechatError::Api {
                errcode: -1,
                errmsg: "no image material available for a cover; set thumb_media_id".to_string(),
            })
        })
}

/// Merge front matter over config defaults into a draft article.
fn build_article(
    title: String,
    content: String,
    meta: &ArticleMeta,
    defaults: &PublishConfig,
    thumb_media_id: String,
) -> Article {
    Article {
        title,
        content,
        author: meta
            .author
            .clone()
            .or_else(|| defaults.author.clone())
            .unwrap_or_default(),
        digest: meta
            .digest
            .clone()
            .or_else(|| defaults.digest.clone())
            .unwrap_or_default(),
        content_source_url: meta
            .source_url
            .clone()
            .or_else(|| defaults.source_url.clone())
            .unwrap_or_default(),
        thumb_media_id,
        need_open_comment: u8::from(
            meta.open_comment
                .or(defaults.open_comment)
                .unwrap_or(false),
        ),
        only_fans_can_comment: 0,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn meta_with(author: Option<&str>, open_comment: Option<bool>) -> ArticleMeta {
        ArticleMeta {
            author: author.map(str::to_string),
            open_comment,
            ..Default::default()
        }
    }

    #[test]
    fn test_front_matter_beats_config_defaults() {
        let meta = meta_with(Some("Ann"), Some(true));
        let defaults = PublishConfig {
            author: Some("Fallback".to_string()),
            open_comment: Some(false),
            ..Default::default()
        };

        let article = build_article(
            "T".to_string(),
            "<p/>".to_string(),
            &meta,
            &defaults,
            "thumb1".to_string(),
        );

        assert_eq!(article.author, "Ann");
        assert_eq!(article.need_open_comment, 1);
        assert_eq!(article.thumb_media_id, "thumb1");
    }

    #[test]
    fn test_config_defaults_fill_missing_fields() {
        let meta = meta_with(None, None);
        let defaults = PublishConfig {
            author: Some("Fallback".to_string()),
            digest: Some("D".to_string()),
            ..Default::default()
        };

        let article = build_article(
            "T".to_string(),
            "<p/>".to_string(),
            &meta,
            &defaults,
            "thumb1".to_string(),
        );

        assert_eq!(article.author, "Fallback");
        assert_eq!(article.digest, "D");
        assert_eq!(article.need_open_comment, 0);
    }
}
