use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cli::{ExportArgs, ExportFormat};
use crate::commands::ingest::{DedupReport, run_pipeline};
use crate::config::{AppConfig, DEFAULT_OUTPUT};
use crate::model::{Clipping, ExportContext, ParseStats, TagSet, generator_string};
use crate::util::{ensure_directory, now_utc_string, sha256_hex, write_json_pretty};

mod csv_export;
mod jex;
mod json_export;
mod markdown;
mod run;
#[cfg(test)]
mod tests;

pub(crate) use run::run;

use csv_export::*;
use jex::*;
use json_export::*;
use markdown::*;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub trait Exporter {
    fn export(
        &self,
        clippings: &[Clipping],
        output: &Path,
        context: &ExportContext,
    ) -> Result<PathBuf>;
}

pub fn exporter_for(format: ExportFormat) -> Box<dyn Exporter> {
    match format {
        ExportFormat::Jex => Box::new(JexExporter),
        ExportFormat::Csv => Box::new(CsvExporter),
        ExportFormat::Json => Box::new(JsonExporter),
        ExportFormat::Markdown => Box::new(MarkdownExporter),
    }
}

fn with_extension(output: &Path, extension: &str) -> PathBuf {
    let matches = output
        .extension()
        .and_then(|current| current.to_str())
        .is_some_and(|current| current.eq_ignore_ascii_case(extension));
    if matches {
        return output.to_path_buf();
    }

    let mut name = output.as_os_str().to_owned();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_directory(parent),
        _ => Ok(()),
    }
}

fn iso_date_time(value: Option<NaiveDateTime>) -> Option<String> {
    value.map(|date_time| date_time.format("%Y-%m-%dT%H:%M:%S").to_string())
}
