use super::*;

const BYTE_ORDER_MARK: char = '\u{feff}';
const ZERO_WIDTH_SPACE: char = '\u{200b}';
const UNKNOWN_BOOK: &str = "Unknown Book";

pub fn strip_invisible(text: &str) -> String {
    text.chars()
        .filter(|character| *character != BYTE_ORDER_MARK && *character != ZERO_WIDTH_SPACE)
        .collect()
}

#[derive(Debug, Clone)]
pub struct TextNormalizer {
    dehyphenate: Regex,
    space_runs: Regex,
    space_before_punctuation: Regex,
}

impl TextNormalizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dehyphenate: Regex::new(r"([^\W\d_]+)-\s*\n\s*([^\W\d_]+)")
                .context("failed to compile de-hyphenation regex")?,
            space_runs: Regex::new(r" +").context("failed to compile space run regex")?,
            space_before_punctuation: Regex::new(r"\s+([.,;:!?])")
                .context("failed to compile punctuation spacing regex")?,
        })
    }

    pub fn normalize(&self, text: &str) -> String {
        self.normalize_with_report(text).0
    }

    pub fn normalize_with_report(&self, text: &str) -> (String, usize) {
        if text.is_empty() {
            return (String::new(), 0);
        }

        let composed = text.nfc().collect::<String>();
        let unified = composed.replace("\r\n", "\n").replace('\r', "\n");
        let visible = strip_invisible(&unified);

        let joins = self.dehyphenate.find_iter(&visible).count();
        let dehyphenated = self.dehyphenate.replace_all(&visible, "${1}${2}");
        let collapsed = self.space_runs.replace_all(&dehyphenated, " ");
        let tidied = self.space_before_punctuation.replace_all(&collapsed, "${1}");

        (capitalize_sentence(tidied.trim()), joins)
    }
}

fn capitalize_sentence(text: &str) -> String {
    if text.starts_with("...") {
        return text.to_string();
    }

    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_lowercase() && first.is_alphabetic() => {
            first.to_uppercase().chain(chars).collect()
        }
        _ => text.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct TitleNormalizer {
    noise: Vec<Regex>,
    empty_trailing_parens: Regex,
    empty_trailing_brackets: Regex,
}

impl TitleNormalizer {
    pub fn new() -> Result<Self> {
        let patterns = [
            r"\.mobi$",
            r"\.azw3?$",
            r"\.txt$",
            r"\.pdf$",
            r"\.epub$",
            r"\s*\(Spanish Edition\)",
            r"\s*\(English Edition\)",
            r"\s*\(Edición española\)",
            r"\s*\(Edición en español\)",
            r"\s*\(French Edition\)",
            r"\s*\([EÉ]dition française\)",
            r"\s*\(Version française\)",
            r"\s*\(German Edition\)",
            r"\s*\(Deutsche Ausgabe\)",
            r"\s*\(Italian Edition\)",
            r"\s*\(Edizione italiana\)",
            r"\s*\(Portuguese Edition\)",
            r"\s*\(Edição portuguesa\)",
            r"\s*\(Edição em português\)",
            r"\s*\(Kindle Edition\)",
            r"\s*\[Print Replica\]",
            r"\s*\[eBook\]",
            r"\s*\(Edition \d+\)",
            r"^\d+\s+",
        ];

        let noise = patterns
            .iter()
            .map(|pattern| {
                Regex::new(&format!("(?i){pattern}"))
                    .with_context(|| format!("failed to compile title pattern {pattern}"))
            })
            .collect::<Result<Vec<Regex>>>()?;

        Ok(Self {
            noise,
            empty_trailing_parens: Regex::new(r"\s*\(\s*\)$")
                .context("failed to compile empty parenthesis regex")?,
            empty_trailing_brackets: Regex::new(r"\s*\[\s*\]$")
                .context("failed to compile empty bracket regex")?,
        })
    }

    pub fn normalize(&self, title: &str) -> String {
        let visible = strip_invisible(title);
        let mut clean = visible.trim().to_string();
        if clean.is_empty() {
            return UNKNOWN_BOOK.to_string();
        }

        for pattern in &self.noise {
            clean = pattern.replace_all(&clean, "").into_owned();
        }
        clean = self
            .empty_trailing_parens
            .replace_all(&clean, "")
            .into_owned();
        clean = self
            .empty_trailing_brackets
            .replace_all(&clean, "")
            .into_owned();

        let clean = clean.trim();
        if clean.is_empty() {
            UNKNOWN_BOOK.to_string()
        } else {
            clean.to_string()
        }
    }
}
