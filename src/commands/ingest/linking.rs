use super::*;

/// `"100-200"` -> `(100, 200)`, `"150"` -> `(150, 150)`. Thousands commas are ignored.
pub fn parse_location_range(location: &str) -> Option<(i64, i64)> {
    let cleaned = location.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }

    let mut parts = cleaned.split('-');
    let start = parts.next()?.trim().parse::<i64>().ok()?;
    let end = match parts.next() {
        Some(value) => value.trim().parse::<i64>().ok()?,
        None => start,
    };
    Some((start, end))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkReport {
    pub linked: usize,
    pub orphaned: usize,
}

pub fn link_notes(highlights: &mut [Clipping], notes: &[Clipping]) -> LinkReport {
    let mut by_book: HashMap<String, Vec<usize>> = HashMap::new();
    for (index, highlight) in highlights.iter().enumerate() {
        by_book
            .entry(highlight.book_title.clone())
            .or_default()
            .push(index);
    }

    let mut report = LinkReport::default();
    for note in notes {
        let target = parse_location_range(&note.location).and_then(|(note_start, _)| {
            by_book.get(&note.book_title).and_then(|candidates| {
                candidates.iter().copied().find(|&index| {
                    parse_location_range(&highlights[index].location)
                        .map(|(start, end)| start <= note_start && note_start <= end)
                        .unwrap_or(false)
                })
            })
        });

        match target {
            Some(index) => {
                for tag in note_tags(&note.content) {
                    highlights[index].tags.insert(tag);
                }
                report.linked += 1;
            }
            None => {
                debug!(
                    location = %note.location,
                    book = %note.book_title,
                    "orphaned note, no highlight covers its location"
                );
                report.orphaned += 1;
            }
        }
    }

    report
}

pub fn note_tags(text: &str) -> Vec<String> {
    text.split(['.', ',', ';', '\n', '\r'])
        .filter_map(|raw| {
            let token = raw.trim();
            let mut chars = token.chars();
            let first = chars.next()?;
            let token = if first.is_alphanumeric() {
                token
            } else {
                chars.as_str().trim()
            };
            (!token.is_empty()).then(|| token.to_string())
        })
        .collect()
}
