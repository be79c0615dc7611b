use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cli::InspectArgs;
use crate::commands::ingest::{DedupReport, ProbableDuplicate, find_probable_duplicates, run_pipeline};
use crate::config::AppConfig;
use crate::model::ParseStats;

#[derive(Debug, Serialize)]
struct InspectReport<'a> {
    input: String,
    language: &'a str,
    encoding: &'a str,
    highlights: usize,
    duplicates: usize,
    dedup: Option<DedupReport>,
    probable_duplicates: Vec<ProbableDuplicate>,
    stats: &'a ParseStats,
}

pub fn run(args: InspectArgs, config: &AppConfig) -> Result<()> {
    let input = config.input_path(&args.source)?;
    let mut options = config.pipeline_options(&args.source);
    options.latest_notes_only = args.latest_notes_only;

    let outcome = run_pipeline(&input, &options)?;
    let report = InspectReport {
        input: input.display().to_string(),
        language: &outcome.language,
        encoding: &outcome.encoding,
        highlights: outcome.clippings.len(),
        duplicates: outcome.duplicate_count(),
        dedup: outcome.dedup,
        probable_duplicates: find_probable_duplicates(&outcome.clippings),
        stats: &outcome.stats,
    };

    if args.json {
        write_json_report(&report)
    } else {
        write_text_report(&report)
    }
}

fn write_json_report(report: &InspectReport<'_>) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, report)
        .context("failed to serialize inspect json output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

fn write_text_report(report: &InspectReport<'_>) -> Result<()> {
    let stats = report.stats;
    info!(
        input = %report.input,
        language = %report.language,
        encoding = %report.encoding,
        "inspected clippings"
    );

    let mut output = io::BufWriter::new(io::stdout().lock());
    writeln!(output, "Input: {}", report.input)?;
    writeln!(
        output,
        "Language: {} Encoding: {}",
        report.language, report.encoding
    )?;
    writeln!(
        output,
        "Blocks: total={} parsed={} skipped={}",
        stats.total, stats.parsed, stats.skipped
    )?;
    writeln!(
        output,
        "Cleaning: titles={} pdf_joins={}",
        stats.titles_cleaned, stats.pdfs_cleaned
    )?;
    writeln!(
        output,
        "Notes: linked={} orphaned={}",
        stats.notes_linked, stats.notes_orphaned
    )?;
    writeln!(
        output,
        "Highlights: {} (flagged duplicates: {})",
        report.highlights, report.duplicates
    )?;

    for change in &stats.title_changes {
        writeln!(output, "Title: {:?} -> {:?}", change.original, change.cleaned)?;
    }

    if report.probable_duplicates.is_empty() {
        writeln!(output, "Probable duplicates: none")?;
    } else {
        writeln!(
            output,
            "Probable duplicates: {}",
            report.probable_duplicates.len()
        )?;
        for pair in &report.probable_duplicates {
            writeln!(
                output,
                "  {} @ {} similarity={:.2} {} {}",
                pair.book_title,
                pair.location,
                pair.similarity,
                &pair.first_uid[..pair.first_uid.len().min(8)],
                &pair.second_uid[..pair.second_uid.len().min(8)],
            )?;
        }
    }
    output.flush()?;

    if stats.skipped > 0 {
        warn!(
            skipped = stats.skipped,
            sampled = stats.failed_blocks.len(),
            "unparseable blocks present"
        );
        for sample in &stats.failed_blocks {
            debug!(block = %sample, "failed block sample");
        }
    }
    Ok(())
}
