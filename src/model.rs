use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "kindle-clippings";

pub fn generator_string() -> String {
    format!("{} v{}", APP_NAME, env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    #[default]
    Highlight,
    Note,
}

impl EntryType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Highlight => "highlight",
            Self::Note => "note",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(Vec<String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if tag.is_empty() || self.contains(&tag) {
            return false;
        }
        self.0.push(tag);
        true
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|existing| existing == tag)
    }

    pub fn merge_from(&mut self, other: &TagSet) {
        for tag in other.iter() {
            self.insert(tag.as_str());
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn join(&self, separator: &str) -> String {
        self.0.join(separator)
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut tags = TagSet::new();
        for tag in iter {
            tags.insert(tag);
        }
        tags
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Clipping {
    pub content: String,
    pub book_title: String,
    pub author: String,
    pub date_time: Option<NaiveDateTime>,
    pub location: String,
    pub page: String,
    pub entry_type: EntryType,
    pub tags: TagSet,
    pub is_duplicate: bool,
    pub uid: String,
}

impl Clipping {
    pub fn title_hash(&self) -> String {
        format!("{}_{}", self.book_title, self.author)
    }

    pub fn is_highlight(&self) -> bool {
        self.entry_type == EntryType::Highlight
    }

    pub fn is_note(&self) -> bool {
        self.entry_type == EntryType::Note
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleChange {
    pub original: String,
    pub cleaned: String,
}

pub const MAX_FAILED_BLOCK_SAMPLES: usize = 50;
pub const MAX_TITLE_CHANGE_SAMPLES: usize = 50;
pub const FAILED_BLOCK_SAMPLE_CHARS: usize = 500;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseStats {
    pub total: usize,
    pub parsed: usize,
    pub skipped: usize,
    pub titles_cleaned: usize,
    pub pdfs_cleaned: usize,
    pub notes_linked: usize,
    pub notes_orphaned: usize,
    pub failed_blocks: Vec<String>,
    pub title_changes: Vec<TitleChange>,
}

impl ParseStats {
    pub fn record_failed_block(&mut self, raw: &str) {
        self.skipped += 1;
        if self.failed_blocks.len() < MAX_FAILED_BLOCK_SAMPLES {
            let sample = raw
                .trim()
                .chars()
                .take(FAILED_BLOCK_SAMPLE_CHARS)
                .collect::<String>();
            self.failed_blocks.push(sample);
        }
    }

    pub fn record_title_change(&mut self, original: &str, cleaned: &str) {
        self.titles_cleaned += 1;
        let already_sampled = self
            .title_changes
            .iter()
            .any(|change| change.original == original && change.cleaned == cleaned);
        if !already_sampled && self.title_changes.len() < MAX_TITLE_CHANGE_SAMPLES {
            self.title_changes.push(TitleChange {
                original: original.to_string(),
                cleaned: cleaned.to_string(),
            });
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportContext {
    pub root_notebook_name: String,
    pub creator_name: String,
    pub geo_location: GeoLocation,
}
