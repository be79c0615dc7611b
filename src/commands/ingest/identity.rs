use super::*;

pub const UNKNOWN_LOCATION: &str = "unknown_loc";
pub const FUZZY_SIMILARITY_THRESHOLD: f64 = 0.8;

/// Content-derived identifier. The timestamp is excluded so re-imports keep the same uid.
pub fn clipping_uid(clipping: &Clipping) -> String {
    let location = clipping.location.trim();
    let page = clipping.page.trim();
    let marker = if !location.is_empty() {
        location
    } else if !page.is_empty() {
        page
    } else {
        UNKNOWN_LOCATION
    };

    sha256_hex(&format!(
        "{}|{}|{}|{}",
        clipping.content.trim(),
        clipping.book_title.trim(),
        clipping.author.trim(),
        marker
    ))
}

pub fn assign_uids(clippings: &mut [Clipping]) {
    for clipping in clippings.iter_mut() {
        clipping.uid = clipping_uid(clipping);
    }
}

fn word_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .chars()
        .filter(|character| !character.is_ascii_punctuation())
        .collect::<String>()
        .split_whitespace()
        .map(ToOwned::to_owned)
        .collect()
}

pub fn jaccard_similarity(left: &str, right: &str) -> f64 {
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let left = word_set(left);
    let right = word_set(right);
    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    left.intersection(&right).count() as f64 / union as f64
}

pub fn is_probable_duplicate(left: &Clipping, right: &Clipping) -> bool {
    if clipping_uid(left) == clipping_uid(right) {
        return true;
    }

    left.book_title == right.book_title
        && !left.location.is_empty()
        && left.location == right.location
        && jaccard_similarity(&left.content, &right.content) > FUZZY_SIMILARITY_THRESHOLD
}

#[derive(Debug, Clone, Serialize)]
pub struct ProbableDuplicate {
    pub book_title: String,
    pub location: String,
    pub first_uid: String,
    pub second_uid: String,
    pub similarity: f64,
}

pub fn find_probable_duplicates(clippings: &[Clipping]) -> Vec<ProbableDuplicate> {
    let mut by_book: BTreeMap<String, Vec<&Clipping>> = BTreeMap::new();
    for clipping in clippings
        .iter()
        .filter(|clipping| clipping.is_highlight() && !clipping.is_duplicate)
    {
        by_book
            .entry(clipping.title_hash())
            .or_default()
            .push(clipping);
    }

    let mut pairs = Vec::new();
    for group in by_book.values() {
        for (offset, left) in group.iter().enumerate() {
            for right in &group[offset + 1..] {
                if is_probable_duplicate(left, right) {
                    pairs.push(ProbableDuplicate {
                        book_title: left.book_title.clone(),
                        location: left.location.clone(),
                        first_uid: left.uid.clone(),
                        second_uid: right.uid.clone(),
                        similarity: jaccard_similarity(&left.content, &right.content),
                    });
                }
            }
        }
    }

    pairs
}
