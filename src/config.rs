use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::{info, warn};

use crate::cli::{ExportFormat, SourceArgs};
use crate::commands::ingest::{DEFAULT_LANGUAGES_FILE, PipelineOptions};
use crate::model::GeoLocation;

const CONFIG_CANDIDATES: [&str; 2] = ["config.json", "config/config.json"];

pub const DEFAULT_LANGUAGE: &str = "auto";
pub const DEFAULT_NOTEBOOK: &str = "Kindle Imports";
pub const DEFAULT_CREATOR: &str = "System";
pub const DEFAULT_OUTPUT: &str = "import_clippings";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub input_file: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
    pub language: String,
    pub encoding: Option<String>,
    pub languages_file: Option<PathBuf>,
    pub notebook_title: String,
    pub creator: String,
    pub location: [f64; 3],
    pub format: Option<String>,
    pub deduplicate: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_file: None,
            output_file: None,
            language: DEFAULT_LANGUAGE.to_string(),
            encoding: None,
            languages_file: None,
            notebook_title: DEFAULT_NOTEBOOK.to_string(),
            creator: DEFAULT_CREATOR.to_string(),
            location: [0.0, 0.0, 0.0],
            format: None,
            deduplicate: true,
        }
    }
}

impl AppConfig {
    pub fn input_path(&self, source: &SourceArgs) -> Result<PathBuf> {
        source
            .input
            .clone()
            .or_else(|| self.input_file.clone())
            .context("no input file given; pass --input or set input_file in the config")
    }

    pub fn languages_path(&self, explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.languages_file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LANGUAGES_FILE))
    }

    pub fn pipeline_options(&self, source: &SourceArgs) -> PipelineOptions {
        PipelineOptions {
            language: source
                .language
                .clone()
                .unwrap_or_else(|| self.language.clone()),
            encoding: source.encoding.clone().or_else(|| self.encoding.clone()),
            languages_file: Some(self.languages_path(source.languages_file.as_deref())),
            deduplicate: self.deduplicate,
            latest_notes_only: false,
        }
    }

    pub fn geo_location(&self) -> GeoLocation {
        GeoLocation {
            latitude: self.location[0],
            longitude: self.location[1],
            altitude: self.location[2],
        }
    }

    pub fn export_format(&self) -> ExportFormat {
        match self.format.as_deref() {
            None => ExportFormat::default(),
            Some(code) => ExportFormat::from_code(code).unwrap_or_else(|| {
                warn!(format = %code, "unknown export format in config, defaulting to jex");
                ExportFormat::default()
            }),
        }
    }
}

pub fn load(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        if !path.exists() {
            bail!("config file does not exist: {}", path.display());
        }
        return read_config(path);
    }

    for candidate in CONFIG_CANDIDATES {
        let path = Path::new(candidate);
        if path.exists() {
            return read_config(path);
        }
    }

    info!(
        checked = ?CONFIG_CANDIDATES,
        "no configuration file found, using defaults"
    );
    Ok(AppConfig::default())
}

fn read_config(path: &Path) -> Result<AppConfig> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let config: AppConfig = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    info!(path = %path.display(), "loaded configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults_for_missing_fields() {
        let config: AppConfig =
            serde_json::from_str(r#"{"creator": "Reader", "location": [40.4, -3.7, 650]}"#)
                .expect("valid config json");

        assert_eq!(config.creator, "Reader");
        assert_eq!(config.language, DEFAULT_LANGUAGE);
        assert_eq!(config.notebook_title, DEFAULT_NOTEBOOK);
        assert!(config.deduplicate);
        assert_eq!(config.geo_location().altitude, 650.0);
    }

    #[test]
    fn cli_source_args_override_config_values() {
        let config = AppConfig {
            input_file: Some(PathBuf::from("from-config.txt")),
            language: "es".to_string(),
            ..AppConfig::default()
        };
        let source = SourceArgs {
            input: Some(PathBuf::from("from-cli.txt")),
            language: Some("en".to_string()),
            ..SourceArgs::default()
        };

        assert_eq!(
            config.input_path(&source).expect("input path"),
            PathBuf::from("from-cli.txt")
        );
        assert_eq!(config.pipeline_options(&source).language, "en");
        assert_eq!(
            config.input_path(&SourceArgs::default()).expect("input path"),
            PathBuf::from("from-config.txt")
        );
    }

    #[test]
    fn unknown_format_falls_back_to_jex() {
        let config = AppConfig {
            format: Some("docx".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(config.export_format(), ExportFormat::Jex);

        let config = AppConfig {
            format: Some("Markdown".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(config.export_format(), ExportFormat::Markdown);
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope.json");
        assert!(load(Some(missing.as_path())).is_err());
    }

    #[test]
    fn explicit_config_file_is_read() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"notebook_title": "Kindle", "format": "csv"}"#).expect("write");

        let config = load(Some(path.as_path())).expect("config loads");
        assert_eq!(config.notebook_title, "Kindle");
        assert_eq!(config.export_format(), ExportFormat::Csv);
    }
}
