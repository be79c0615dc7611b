use super::*;

pub const OVERLAP_TOLERANCE: i64 = 5;
pub const OVERLAP_RATIO_THRESHOLD: f64 = 0.5;
pub const FRAGMENT_LENGTH: usize = 75;
pub const GARBAGE_LENGTH: usize = 5;

const SENTENCE_ENDINGS: [char; 6] = ['.', '!', '?', '"', '\u{201d}', ')'];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DedupReport {
    pub highlights_flagged: usize,
    pub notes_flagged: usize,
}

pub fn deduplicate(clippings: &mut [Clipping]) -> DedupReport {
    let mut books: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (index, clipping) in clippings.iter_mut().enumerate() {
        clipping.is_duplicate = false;
        books.entry(clipping.title_hash()).or_default().push(index);
    }

    for indices in books.values() {
        let highlights = indices
            .iter()
            .copied()
            .filter(|&index| clippings[index].is_highlight())
            .collect::<Vec<usize>>();
        let notes = indices
            .iter()
            .copied()
            .filter(|&index| clippings[index].is_note())
            .collect::<Vec<usize>>();

        flag_highlights(clippings, &highlights);
        flag_redundant_notes(clippings, &notes);
    }

    clippings.sort_by_key(|clipping| clipping.date_time);

    let report = DedupReport {
        highlights_flagged: clippings
            .iter()
            .filter(|clipping| clipping.is_highlight() && clipping.is_duplicate)
            .count(),
        notes_flagged: clippings
            .iter()
            .filter(|clipping| clipping.is_note() && clipping.is_duplicate)
            .count(),
    };
    info!(
        highlights_flagged = report.highlights_flagged,
        notes_flagged = report.notes_flagged,
        books = books.len(),
        "deduplication complete"
    );
    report
}

pub fn resolve_note_redundancy(notes: &mut [Clipping]) -> usize {
    let mut books: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (index, note) in notes.iter().enumerate() {
        if note.is_note() {
            books.entry(note.title_hash()).or_default().push(index);
        }
    }

    books
        .values()
        .map(|indices| flag_redundant_notes(notes, indices))
        .sum()
}

fn looks_accidental(clipping: &Clipping) -> bool {
    let text = clipping.content.trim();
    let length = text.chars().count();
    if length < GARBAGE_LENGTH {
        return true;
    }
    if length >= FRAGMENT_LENGTH {
        return false;
    }

    let starts_lowercase = text
        .chars()
        .next()
        .is_some_and(|first| first.is_lowercase());
    let unterminated = text
        .chars()
        .last()
        .is_some_and(|last| !SENTENCE_ENDINGS.contains(&last));
    starts_lowercase || unterminated
}

#[derive(Debug, Clone, Copy)]
struct Span {
    index: usize,
    start: i64,
    end: i64,
    chars: usize,
}

fn flag_highlights(clippings: &mut [Clipping], highlights: &[usize]) {
    let mut spans = Vec::with_capacity(highlights.len());
    for &index in highlights {
        let clipping = &mut clippings[index];
        if clipping.tags.is_empty() && looks_accidental(clipping) {
            clipping.is_duplicate = true;
        }

        let (start, end) = parse_location_range(&clipping.location).unwrap_or((0, 0));
        spans.push(Span {
            index,
            start,
            end,
            chars: clipping.content.chars().count(),
        });
    }
    spans.sort_by_key(|span| span.start);

    let Some((&first, rest)) = spans.split_first() else {
        return;
    };

    let mut survivor = first;
    for &current in rest {
        let overlapping =
            current.start >= survivor.start && current.start <= survivor.end + OVERLAP_TOLERANCE;
        if !overlapping {
            survivor = current;
            continue;
        }

        let survivor_text = &clippings[survivor.index].content;
        let current_text = &clippings[current.index].content;
        if current_text.contains(survivor_text.as_str()) {
            supersede(clippings, survivor.index, current.index);
            survivor = current;
        } else if survivor_text.contains(current_text.as_str()) {
            supersede(clippings, current.index, survivor.index);
        } else {
            let overlap = survivor.end.min(current.end) - survivor.start.max(current.start);
            let span = survivor.end.max(current.end) - survivor.start.min(current.start);
            if span > 0 && overlap as f64 / span as f64 > OVERLAP_RATIO_THRESHOLD {
                if current.chars > survivor.chars {
                    supersede(clippings, survivor.index, current.index);
                    survivor = current;
                } else {
                    supersede(clippings, current.index, survivor.index);
                }
            }
        }
    }
}

fn flag_redundant_notes(clippings: &mut [Clipping], notes: &[usize]) -> usize {
    let mut by_location: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for &index in notes {
        by_location
            .entry(clippings[index].location.clone())
            .or_default()
            .push(index);
    }

    let mut flagged = 0;
    for group in by_location.values_mut() {
        if group.len() < 2 {
            continue;
        }
        // Newest first; undated notes sort last.
        group.sort_by(|left, right| clippings[*right].date_time.cmp(&clippings[*left].date_time));

        let keeper = group[0];
        for &older in &group[1..] {
            supersede(clippings, older, keeper);
            flagged += 1;
        }
    }
    flagged
}

fn supersede(clippings: &mut [Clipping], loser: usize, winner: usize) {
    let rescued = clippings[loser].tags.clone();
    clippings[winner].tags.merge_from(&rescued);
    clippings[loser].is_duplicate = true;
}
