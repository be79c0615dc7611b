use super::*;

pub const BLOCK_SEPARATOR: &str = "==========";
pub const UNKNOWN_AUTHOR: &str = "Unknown";

const MIN_BLOCK_LINES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRejection {
    TooFewLines(usize),
    NoMetadataLine,
}

impl BlockRejection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TooFewLines(_) => "too_few_lines",
            Self::NoMetadataLine => "no_metadata_line",
        }
    }
}

pub struct BlockParser<'a> {
    patterns: &'a LanguagePatternSet,
    text: TextNormalizer,
    titles: TitleNormalizer,
    header: Regex,
}

impl<'a> BlockParser<'a> {
    pub fn new(patterns: &'a LanguagePatternSet) -> Result<Self> {
        Ok(Self {
            patterns,
            text: TextNormalizer::new()?,
            titles: TitleNormalizer::new()?,
            header: Regex::new(r"^(?P<title>.*)\((?P<author>.*)\)")
                .context("failed to compile book header regex")?,
        })
    }

    pub fn parse_all(&self, content: &str, stats: &mut ParseStats) -> Vec<Clipping> {
        let mut clippings = Vec::new();

        for raw in content.split(BLOCK_SEPARATOR) {
            if raw.trim().is_empty() {
                continue;
            }
            stats.total += 1;

            match self.parse_block(raw, stats) {
                Ok(clipping) => {
                    stats.parsed += 1;
                    clippings.push(clipping);
                }
                Err(rejection) => {
                    debug!(
                        reason = rejection.as_str(),
                        block = stats.total,
                        "skipping unparseable block"
                    );
                    stats.record_failed_block(raw);
                }
            }
        }

        clippings
    }

    pub fn parse_block(
        &self,
        raw: &str,
        stats: &mut ParseStats,
    ) -> std::result::Result<Clipping, BlockRejection> {
        let lines = raw
            .lines()
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<&str>>();
        if lines.len() < MIN_BLOCK_LINES {
            return Err(BlockRejection::TooFewLines(lines.len()));
        }

        let (meta_index, entry_type) = lines
            .iter()
            .enumerate()
            .skip(1)
            .find_map(|(index, line)| {
                self.patterns
                    .entry_type_of(line)
                    .map(|entry_type| (index, entry_type))
            })
            .ok_or(BlockRejection::NoMetadataLine)?;

        let header = lines[..meta_index]
            .iter()
            .map(|line| line.trim())
            .collect::<Vec<&str>>()
            .join(" ");
        let (raw_title, author) = self.split_header(&header);

        let book_title = self.titles.normalize(&raw_title);
        let original_title = raw_title.trim();
        if !original_title.is_empty() && book_title != original_title {
            stats.record_title_change(original_title, &book_title);
        }

        let meta_line = lines[meta_index];
        let location = self.patterns.location_in(meta_line).unwrap_or_default();
        let page = self.patterns.page_in(meta_line).unwrap_or_default();
        let date_time = self
            .patterns
            .date_text_in(meta_line)
            .and_then(|text| parse_added_on(&text));
        if date_time.is_none() {
            debug!(line = %meta_line.trim(), "no parseable date on metadata line");
        }

        let body = lines[meta_index + 1..].join("\n");
        let (content, joins) = self.text.normalize_with_report(&body);
        if joins > 0 {
            stats.pdfs_cleaned += 1;
        }

        Ok(Clipping {
            content,
            book_title,
            author,
            date_time,
            location,
            page,
            entry_type,
            tags: TagSet::new(),
            is_duplicate: false,
            uid: String::new(),
        })
    }

    /// Greedy split: the last parenthesised group is the author.
    fn split_header(&self, header: &str) -> (String, String) {
        match self.header.captures(header) {
            Some(captures) => {
                let title = captures
                    .name("title")
                    .map(|value| value.as_str().trim())
                    .unwrap_or_default();
                let author = captures
                    .name("author")
                    .map(|value| value.as_str().trim())
                    .filter(|value| !value.is_empty())
                    .unwrap_or(UNKNOWN_AUTHOR);
                (title.to_string(), author.to_string())
            }
            None => (header.trim().to_string(), UNKNOWN_AUTHOR.to_string()),
        }
    }
}
