//! `sbomfetch config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use sbomfetch_core::SbomfetchConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

const SECTIONS: [&str; 4] = ["general", "resolve", "download", "extract"];

/// Load the effective configuration.
///
/// With a path, the file must exist; without one, defaults plus
/// `SBOMFETCH_*` environment overrides are used.
pub async fn load(path: Option<&Path>) -> Result<SbomfetchConfig, CliError> {
    let config = match path {
        Some(path) => SbomfetchConfig::load(path).await?,
        None => SbomfetchConfig::from_env()?,
    };
    Ok(config)
}

/// Execute the `config` command.
pub fn execute(
    args: &ConfigArgs,
    source: Option<&Path>,
    config: &SbomfetchConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match &args.action {
        ConfigAction::Show { section } => {
            let report = build_report(source, section.as_deref(), config)?;
            writer.render(&report)
        }
    }
}

/// Serialize the whole configuration or one section of it.
pub fn build_report(
    source: Option<&Path>,
    section: Option<&str>,
    config: &SbomfetchConfig,
) -> Result<ConfigReport, CliError> {
    let config_toml = match section {
        None => to_toml(config),
        Some("general") => to_toml(&config.general),
        Some("resolve") => to_toml(&config.resolve),
        Some("download") => to_toml(&config.download),
        Some("extract") => to_toml(&config.extract),
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {} (expected: {})",
                other,
                SECTIONS.join(", ")
            )));
        }
    };

    Ok(ConfigReport {
        source: source
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "defaults + environment".to_owned()),
        section: section.map(str::to_owned),
        config_toml,
        config: serde_json::to_value(config)?,
    })
}

fn to_toml<T: Serialize>(value: &T) -> String {
    toml::to_string_pretty(value).unwrap_or_else(|e| format!("(serialization error: {})", e))
}

/// Configuration display report.
///
/// Text output prints `config_toml`; JSON output carries the full
/// configuration as a structured value.
#[derive(Serialize)]
pub struct ConfigReport {
    /// Configuration file path, or a note that none was given
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip)]
    pub config_toml: String,
    /// Effective configuration
    pub config: serde_json::Value,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        match &self.section {
            Some(section) => writeln!(
                w,
                "Configuration {} (source: {})",
                format!("[{}]", section).bold(),
                self.source
            )?,
            None => writeln!(w, "Configuration (source: {})", self.source.bold())?,
        }
        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;
        Ok(())
    }
}
