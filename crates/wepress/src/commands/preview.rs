//! `wepress preview` command implementation.

use std::path::PathBuf;

use clap::Args;
use tracing::info;
use wepress_config::{CliSettings, Config};
use wepress_pipeline::Pipeline;
use wepress_wechat::front::split_front_matter;

use crate::error::CliError;
use crate::output::Output;
use crate::render::render_markdown;

/// Arguments for the preview command.
#[derive(Args)]
pub struct PreviewArgs {
    /// Markdown file to render.
    file: PathBuf,

    /// Stylesheet to inline (overrides config).
    #[arg(long)]
    css: Option<PathBuf>,

    /// Write the result here instead of stdout.
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover wepress.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl PreviewArgs {
    /// Execute the preview command.
    ///
    /// # Errors
    ///
    /// Returns an error if the input or stylesheet cannot be read, or the
    /// front matter is malformed.
    pub fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            css_path: self.css,
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        info!("Previewing {}", self.file.display());

        let markdown = std::fs::read_to_string(&self.file)?;
        let (_, body) = split_front_matter(&markdown)?;

        let css_text = match &config.style_resolved.css_path {
            Some(path) => std::fs::read_to_string(path)?,
            None => String::new(),
        };

        let rendered = render_markdown(body);
        let result = Pipeline::new().run(&rendered.html, &css_text);
        for warning in &result.warnings {
            output.warning(&format!("Warning: {warning}"));
        }

        match self.out {
            Some(path) => {
                std::fs::write(&path, &result.html)?;
                output.success(&format!("Preview written to {}", path.display()));
            }
            None => {
                // stdout is the preview sink when no output file is given
                #[allow(clippy::print_stdout)]
                {
                    println!("{}", result.html);
                }
            }
        }

        Ok(())
    }
}
