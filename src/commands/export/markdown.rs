use super::*;

const ILLEGAL_FILENAME_CHARS: [char; 9] = ['\\', '/', '*', '?', ':', '"', '<', '>', '|'];
const UNDATED_STAMP: &str = "000000";
const UID_PREFIX_CHARS: usize = 8;
const UNNAMED_FOLDER: &str = "_";

pub(super) fn sanitize_filename(text: &str) -> String {
    text.chars()
        .filter(|character| !ILLEGAL_FILENAME_CHARS.contains(character))
        .collect::<String>()
        .trim()
        .to_string()
}

fn folder_name(text: &str) -> String {
    let name = sanitize_filename(text);
    match name.as_str() {
        "" | "." | ".." => UNNAMED_FOLDER.to_string(),
        _ => name,
    }
}

pub(super) fn yaml_quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

pub(super) fn markdown_filename(clipping: &Clipping) -> String {
    let stamp = clipping
        .date_time
        .map(|value| value.format("%Y%m%d%H%M%S").to_string())
        .unwrap_or_else(|| UNDATED_STAMP.to_string());

    let prefix = if !clipping.page.is_empty() {
        format!("Page {}", clipping.page)
    } else if !clipping.location.is_empty() {
        format!("Loc {}", clipping.location)
    } else {
        "Note".to_string()
    };

    let digest = if clipping.uid.is_empty() {
        sha256_hex(&clipping.content)
    } else {
        clipping.uid.clone()
    };
    let short = digest.chars().take(UID_PREFIX_CHARS).collect::<String>();

    format!("{} - {stamp}_{short}.md", sanitize_filename(&prefix))
}

pub(super) fn markdown_document(clipping: &Clipping) -> String {
    let tags = clipping
        .tags
        .iter()
        .map(|tag| yaml_quote(tag))
        .collect::<Vec<String>>()
        .join(", ");

    format!(
        "---\nbook: {}\nauthor: {}\ncategory: {}\ndate: {}\npage: {}\ntags: [{}]\nsource: \"kindle\"\ngenerator: {}\n---\n\n{}\n",
        yaml_quote(&clipping.book_title),
        yaml_quote(&clipping.author),
        yaml_quote(clipping.entry_type.as_str()),
        iso_date_time(clipping.date_time).unwrap_or_default(),
        yaml_quote(&clipping.page),
        tags,
        yaml_quote(&generator_string()),
        clipping.content,
    )
}

pub struct MarkdownExporter;

impl Exporter for MarkdownExporter {
    fn export(
        &self,
        clippings: &[Clipping],
        output: &Path,
        _context: &ExportContext,
    ) -> Result<PathBuf> {
        let root = output.to_path_buf();
        ensure_directory(&root)?;

        let mut written = HashSet::new();
        for clipping in clippings {
            let folder = root
                .join(folder_name(&clipping.author.to_uppercase()))
                .join(folder_name(&clipping.book_title));
            ensure_directory(&folder)?;

            let filename = markdown_filename(clipping);
            let mut path = folder.join(&filename);
            let mut attempt = 1;
            while !written.insert(path.clone()) {
                attempt += 1;
                let stem = filename.trim_end_matches(".md");
                path = folder.join(format!("{stem}-{attempt}.md"));
            }

            let mut file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            file.write_all(markdown_document(clipping).as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
            debug!(path = %path.display(), "wrote markdown note");
        }

        info!(path = %root.display(), files = written.len(), "wrote markdown export");
        Ok(root)
    }
}
