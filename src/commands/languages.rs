use std::io::{self, Write};

use anyhow::Result;
use tracing::info;

use crate::cli::LanguagesArgs;
use crate::commands::ingest::{Language, PatternStore};
use crate::config::AppConfig;

pub fn run(args: LanguagesArgs, config: &AppConfig) -> Result<()> {
    let path = config.languages_path(args.languages_file.as_deref());
    let store = PatternStore::load(Some(path.as_path()))?;

    info!(path = %path.display(), count = store.codes().len(), "available languages");

    let mut output = io::BufWriter::new(io::stdout().lock());
    for code in store.codes() {
        let origin = if Language::from_code(code).is_some() {
            "built-in"
        } else {
            "resource"
        };
        writeln!(output, "{code}\t{origin}")?;
    }
    writeln!(output, "auto\tdetect")?;
    output.flush()?;
    Ok(())
}
