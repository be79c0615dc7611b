use super::*;

const CLIPPING_SOURCE: &str = "kindle";

#[derive(Debug, Serialize)]
struct JsonDocument<'a> {
    meta: JsonMeta<'a>,
    clippings: Vec<JsonClipping<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonMeta<'a> {
    count: usize,
    generated_at: String,
    creator: &'a str,
    root_notebook: &'a str,
    source: String,
}

#[derive(Debug, Serialize)]
struct JsonClipping<'a> {
    uid: &'a str,
    book_title: &'a str,
    author: &'a str,
    content: &'a str,
    #[serde(rename = "type")]
    entry_type: &'static str,
    date_time: Option<String>,
    page: &'a str,
    location: &'a str,
    tags: &'a TagSet,
    is_duplicate: bool,
    source: &'static str,
}

pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn export(
        &self,
        clippings: &[Clipping],
        output: &Path,
        context: &ExportContext,
    ) -> Result<PathBuf> {
        let path = with_extension(output, "json");

        let document = JsonDocument {
            meta: JsonMeta {
                count: clippings.len(),
                generated_at: now_utc_string(),
                creator: &context.creator_name,
                root_notebook: &context.root_notebook_name,
                source: generator_string(),
            },
            clippings: clippings
                .iter()
                .map(|clipping| JsonClipping {
                    uid: &clipping.uid,
                    book_title: &clipping.book_title,
                    author: &clipping.author,
                    content: &clipping.content,
                    entry_type: clipping.entry_type.as_str(),
                    date_time: iso_date_time(clipping.date_time),
                    page: &clipping.page,
                    location: &clipping.location,
                    tags: &clipping.tags,
                    is_duplicate: clipping.is_duplicate,
                    source: CLIPPING_SOURCE,
                })
                .collect(),
        };

        write_json_pretty(&path, &document)?;
        info!(path = %path.display(), clippings = clippings.len(), "wrote json export");
        Ok(path)
    }
}
