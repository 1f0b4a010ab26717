//! Configuration management for wepress.
//!
//! Parses `wepress.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`]. Credential
//! fields support `${VAR}` environment variable expansion so secrets can be
//! kept out of the file.

mod expand;

use std::path::{Path, PathBuf};

use serde::Deserialize;

use expand::expand_env;

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "wepress.toml";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Clone, Default)]
pub struct CliSettings {
    /// Override the Official Account app id.
    pub appid: Option<String>,
    /// Override the Official Account app secret.
    pub secret: Option<String>,
    /// Override the API base URL.
    pub base_url: Option<String>,
    /// Override the stylesheet path.
    pub css_path: Option<PathBuf>,
}

impl CliSettings {
    /// Check if all override fields are None (no overrides specified).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.appid.is_none()
            && self.secret.is_none()
            && self.base_url.is_none()
            && self.css_path.is_none()
    }
}

/// Application configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Official Account credentials.
    pub account: AccountConfig,
    /// Stylesheet configuration (path is a relative string from TOML).
    #[serde(default)]
    style: StyleConfigRaw,
    /// Draft publishing defaults.
    pub publish: PublishConfig,

    /// Resolved stylesheet configuration (set after loading).
    #[serde(skip)]
    pub style_resolved: StyleConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Official Account credentials.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// App id of the Official Account.
    pub appid: String,
    /// App secret of the Official Account.
    pub secret: String,
    /// API base URL.
    pub base_url: String,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            appid: String::new(),
            secret: String::new(),
            base_url: "https://api.weixin.qq.com/cgi-bin".to_string(),
        }
    }
}

/// Raw stylesheet configuration as parsed from TOML (path as string).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct StyleConfigRaw {
    css_path: Option<String>,
}

/// Resolved stylesheet configuration with an absolute path.
#[derive(Debug, Clone, Default)]
pub struct StyleConfig {
    /// Stylesheet applied to rendered articles, if configured.
    pub css_path: Option<PathBuf>,
}

/// Draft publishing defaults, overridable per article via front matter.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PublishConfig {
    /// Default display author.
    pub author: Option<String>,
    /// Default feed summary.
    pub digest: Option<String>,
    /// Default "read original" link.
    pub source_url: Option<String>,
    /// Default cover image media id.
    pub thumb_media_id: Option<String>,
    /// Whether comments are open on new drafts.
    pub open_comment: Option<bool>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Environment variable expansion error.
    #[error("Invalid value for {field}: {message}")]
    EnvVar {
        /// Config field being expanded.
        field: String,
        /// What went wrong.
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `wepress.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails, or
    /// a referenced environment variable is unset.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(appid) = &settings.appid {
            self.account.appid.clone_from(appid);
        }
        if let Some(secret) = &settings.secret {
            self.account.secret.clone_from(secret);
        }
        if let Some(base_url) = &settings.base_url {
            self.account.base_url.clone_from(base_url);
        }
        if let Some(css_path) = &settings.css_path {
            self.style_resolved.css_path = Some(css_path.clone());
        }
    }

    /// Search for config file in current directory and parents.
    #[must_use]
    pub fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.account.appid = expand_env(&config.account.appid, "account.appid")?;
        config.account.secret = expand_env(&config.account.secret, "account.secret")?;
        config.account.base_url = expand_env(&config.account.base_url, "account.base_url")?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Resolve the stylesheet path relative to the config directory.
    ///
    /// `~` is expanded to the home directory before joining.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.style_resolved = StyleConfig {
            css_path: self.style.css_path.as_deref().map(|raw| {
                let expanded = shellexpand::tilde(raw);
                let path = Path::new(expanded.as_ref());
                if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    config_dir.join(path)
                }
            }),
        };
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.account.base_url, "https://api.weixin.qq.com/cgi-bin");
        assert!(config.account.appid.is_empty());
        assert!(config.style_resolved.css_path.is_none());
        assert!(config.publish.author.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let toml = "";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.account.base_url, "https://api.weixin.qq.com/cgi-bin");
    }

    #[test]
    fn test_parse_account_config() {
        let toml = r#"
[account]
appid = "wx123"
secret = "s3cret"
base_url = "https://proxy.example.com/cgi-bin"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.account.appid, "wx123");
        assert_eq!(config.account.secret, "s3cret");
        assert_eq!(config.account.base_url, "https://proxy.example.com/cgi-bin");
    }

    #[test]
    fn test_parse_publish_config() {
        let toml = r#"
[publish]
author = "Ann"
digest = "Weekly notes"
open_comment = true
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.publish.author.as_deref(), Some("Ann"));
        assert_eq!(config.publish.digest.as_deref(), Some("Weekly notes"));
        assert_eq!(config.publish.open_comment, Some(true));
    }

    #[test]
    fn test_resolve_relative_css_path() {
        let toml = r#"
[style]
css_path = "styles/wechat.css"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.style_resolved.css_path,
            Some(PathBuf::from("/project/styles/wechat.css"))
        );
    }

    #[test]
    fn test_resolve_absolute_css_path() {
        let toml = r#"
[style]
css_path = "/etc/wepress/wechat.css"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.style_resolved.css_path,
            Some(PathBuf::from("/etc/wepress/wechat.css"))
        );
    }

    #[test]
    fn test_apply_cli_settings_appid() {
        let mut config = Config::default();
        let overrides = CliSettings {
            appid: Some("wx999".to_string()),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.account.appid, "wx999");
        assert_eq!(config.account.base_url, "https://api.weixin.qq.com/cgi-bin"); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_css_path() {
        let mut config = Config::default();
        let overrides = CliSettings {
            css_path: Some(PathBuf::from("/custom/theme.css")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(
            config.style_resolved.css_path,
            Some(PathBuf::from("/custom/theme.css"))
        );
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default());

        assert!(config.account.appid.is_empty());
        assert!(config.style_resolved.css_path.is_none());
    }

    #[test]
    fn test_cli_settings_is_empty() {
        assert!(CliSettings::default().is_empty());

        assert!(
            !CliSettings {
                appid: Some("wx1".to_string()),
                ..Default::default()
            }
            .is_empty()
        );

        assert!(
            !CliSettings {
                css_path: Some(PathBuf::from("a.css")),
                ..Default::default()
            }
            .is_empty()
        );
    }
}
