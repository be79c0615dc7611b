use super::*;

#[derive(Debug, Serialize)]
struct ExportRunReport<'a> {
    generated_at: String,
    generator: String,
    input: String,
    output: String,
    format: &'static str,
    language: &'a str,
    encoding: &'a str,
    exported: usize,
    duplicates_skipped: usize,
    dedup: Option<DedupReport>,
    stats: &'a ParseStats,
}

pub fn run(args: ExportArgs, config: &AppConfig) -> Result<()> {
    let input = config.input_path(&args.source)?;
    let mut options = config.pipeline_options(&args.source);
    if args.no_dedup {
        options.deduplicate = false;
    }
    options.latest_notes_only = args.latest_notes_only;

    let format = args.format.unwrap_or_else(|| config.export_format());
    let output = args
        .output
        .clone()
        .or_else(|| config.output_file.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    let context = ExportContext {
        root_notebook_name: args
            .notebook
            .clone()
            .unwrap_or_else(|| config.notebook_title.clone()),
        creator_name: args
            .creator
            .clone()
            .unwrap_or_else(|| config.creator.clone()),
        geo_location: args.location.unwrap_or_else(|| config.geo_location()),
    };

    info!(
        input = %input.display(),
        output = %output.display(),
        format = format.as_str(),
        deduplicate = options.deduplicate,
        "starting export"
    );

    let outcome = run_pipeline(&input, &options)?;
    let selected = select_for_export(&outcome.clippings, args.include_duplicates);
    let duplicates_skipped = outcome.clippings.len() - selected.len();

    let written = if selected.is_empty() {
        warn!(input = %input.display(), "no clippings to export");
        None
    } else {
        Some(exporter_for(format).export(&selected, &output, &context)?)
    };

    if let Some(stats_path) = &args.stats_path {
        let report = ExportRunReport {
            generated_at: now_utc_string(),
            generator: generator_string(),
            input: input.display().to_string(),
            output: written
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_default(),
            format: format.as_str(),
            language: &outcome.language,
            encoding: &outcome.encoding,
            exported: selected.len(),
            duplicates_skipped,
            dedup: outcome.dedup,
            stats: &outcome.stats,
        };
        write_json_pretty(stats_path, &report)?;
        info!(path = %stats_path.display(), "wrote parse statistics");
    }

    info!(
        exported = selected.len(),
        duplicates_skipped,
        skipped_blocks = outcome.stats.skipped,
        "export complete"
    );
    Ok(())
}

fn select_for_export(clippings: &[Clipping], include_duplicates: bool) -> Vec<Clipping> {
    clippings
        .iter()
        .filter(|clipping| include_duplicates || !clipping.is_duplicate)
        .cloned()
        .collect()
}
