use super::*;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub language: String,
    pub encoding: Option<String>,
    pub languages_file: Option<PathBuf>,
    pub deduplicate: bool,
    pub latest_notes_only: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            language: "auto".to_string(),
            encoding: None,
            languages_file: None,
            deduplicate: true,
            latest_notes_only: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub clippings: Vec<Clipping>,
    pub stats: ParseStats,
    pub language: String,
    pub encoding: String,
    pub dedup: Option<DedupReport>,
}

impl PipelineOutcome {
    pub fn duplicate_count(&self) -> usize {
        self.clippings
            .iter()
            .filter(|clipping| clipping.is_duplicate)
            .count()
    }
}

pub fn run_pipeline(input: &Path, options: &PipelineOptions) -> Result<PipelineOutcome> {
    info!(input = %input.display(), language = %options.language, "reading clippings");

    let decoded = read_clippings_file(input, options.encoding.as_deref())?;
    let store = PatternStore::load(options.languages_file.as_deref())?;
    process_content(&decoded.text, &store, options, decoded.encoding)
}

pub fn process_content(
    content: &str,
    store: &PatternStore,
    options: &PipelineOptions,
    encoding: &str,
) -> Result<PipelineOutcome> {
    let content = strip_invisible(content);
    let patterns = store.resolve(&options.language, &content);
    let parser = BlockParser::new(patterns)?;

    let mut stats = ParseStats::default();
    let parsed = parser.parse_all(&content, &mut stats);
    let (mut highlights, mut notes): (Vec<Clipping>, Vec<Clipping>) =
        parsed.into_iter().partition(Clipping::is_highlight);

    if options.latest_notes_only {
        let superseded = resolve_note_redundancy(&mut notes);
        notes.retain(|note| !note.is_duplicate);
        debug!(superseded, "dropped superseded notes before linking");
    }

    let links = link_notes(&mut highlights, &notes);
    stats.notes_linked = links.linked;
    stats.notes_orphaned = links.orphaned;

    assign_uids(&mut highlights);

    let dedup = options
        .deduplicate
        .then(|| deduplicate(&mut highlights));

    if stats.skipped > 0 {
        warn!(skipped = stats.skipped, "some clipping blocks could not be parsed");
    }
    info!(
        language = %patterns.code(),
        encoding = %encoding,
        total = stats.total,
        parsed = stats.parsed,
        highlights = highlights.len(),
        notes = notes.len(),
        notes_linked = stats.notes_linked,
        notes_orphaned = stats.notes_orphaned,
        titles_cleaned = stats.titles_cleaned,
        pdfs_cleaned = stats.pdfs_cleaned,
        "parsed clippings"
    );

    Ok(PipelineOutcome {
        clippings: highlights,
        stats,
        language: patterns.code().to_string(),
        encoding: encoding.to_string(),
        dedup,
    })
}
