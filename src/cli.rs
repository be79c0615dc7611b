use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::model::GeoLocation;

#[derive(Parser, Debug)]
#[command(
    name = "kindle-clippings",
    version,
    about = "Parse, deduplicate and export Kindle 'My Clippings.txt' files"
)]
pub struct Cli {
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Export(ExportArgs),
    Inspect(InspectArgs),
    Languages(LanguagesArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    #[arg(long)]
    pub input: Option<PathBuf>,

    #[arg(long)]
    pub language: Option<String>,

    #[arg(long)]
    pub encoding: Option<String>,

    #[arg(long)]
    pub languages_file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub format: Option<ExportFormat>,

    #[arg(long)]
    pub notebook: Option<String>,

    #[arg(long)]
    pub creator: Option<String>,

    #[arg(long, value_parser = parse_geo_location)]
    pub location: Option<GeoLocation>,

    #[arg(long, default_value_t = false)]
    pub no_dedup: bool,

    #[arg(long, default_value_t = false)]
    pub include_duplicates: bool,

    #[arg(long, default_value_t = false)]
    pub latest_notes_only: bool,

    #[arg(long)]
    pub stats_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(long, default_value_t = false)]
    pub latest_notes_only: bool,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct LanguagesArgs {
    #[arg(long)]
    pub languages_file: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    #[default]
    Jex,
    Csv,
    Json,
    #[value(name = "md", alias = "markdown")]
    Markdown,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jex => "jex",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Markdown => "md",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "jex" => Some(Self::Jex),
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "md" | "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }
}

pub fn parse_geo_location(raw: &str) -> Result<GeoLocation, String> {
    let values = raw
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<f64>, _>>()
        .map_err(|err| format!("invalid coordinate in '{raw}': {err}"))?;

    match values.as_slice() {
        [latitude, longitude] => Ok(GeoLocation {
            latitude: *latitude,
            longitude: *longitude,
            altitude: 0.0,
        }),
        [latitude, longitude, altitude] => Ok(GeoLocation {
            latitude: *latitude,
            longitude: *longitude,
            altitude: *altitude,
        }),
        _ => Err(format!("expected 'lat,lon' or 'lat,lon,alt', got '{raw}'")),
    }
}
