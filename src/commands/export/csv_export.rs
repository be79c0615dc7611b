use super::*;

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    book_title: &'a str,
    author: &'a str,
    content: &'a str,
    #[serde(rename = "type")]
    entry_type: &'static str,
    date_time: String,
    page: &'a str,
    location: &'a str,
    tags: String,
}

pub struct CsvExporter;

impl Exporter for CsvExporter {
    fn export(
        &self,
        clippings: &[Clipping],
        output: &Path,
        _context: &ExportContext,
    ) -> Result<PathBuf> {
        let path = with_extension(output, "csv");
        ensure_parent(&path)?;

        let mut file =
            File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
        file.write_all(UTF8_BOM)
            .with_context(|| format!("failed to write {}", path.display()))?;

        let mut writer = csv::Writer::from_writer(file);
        for clipping in clippings {
            writer
                .serialize(CsvRow {
                    book_title: &clipping.book_title,
                    author: &clipping.author,
                    content: &clipping.content,
                    entry_type: clipping.entry_type.as_str(),
                    date_time: iso_date_time(clipping.date_time).unwrap_or_default(),
                    page: &clipping.page,
                    location: &clipping.location,
                    tags: clipping.tags.join(", "),
                })
                .with_context(|| format!("failed to write csv row to {}", path.display()))?;
        }
        writer
            .flush()
            .with_context(|| format!("failed to flush {}", path.display()))?;

        info!(path = %path.display(), rows = clippings.len(), "wrote csv export");
        Ok(path)
    }
}
