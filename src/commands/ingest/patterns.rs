use super::*;

pub const DEFAULT_LANGUAGES_FILE: &str = "resources/languages.json";
pub const DEFAULT_PATTERN_CODE: &str = "default";

const DETECTION_SAMPLE_CHARS: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    English,
    Spanish,
    French,
    German,
    Italian,
    Portuguese,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Italian,
        Language::Portuguese,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Spanish => "es",
            Self::French => "fr",
            Self::German => "de",
            Self::Italian => "it",
            Self::Portuguese => "pt",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|language| language.code().eq_ignore_ascii_case(code.trim()))
    }

    fn source(self) -> PatternSource {
        match self {
            Self::English => PatternSource::new(
                "Highlight",
                "Note",
                "page",
                "Added on",
                r"Location|loc\.",
            ),
            Self::Spanish => PatternSource::new(
                "subrayado",
                "nota",
                r"página|pág\.",
                r"Añadid[oa\.]? el|Agregado el",
                r"posición|pos\.",
            ),
            Self::French => PatternSource::new(
                "surlignement|surlignage",
                "note",
                "page",
                "Ajouté le",
                r"emplacement|empl\.",
            ),
            Self::German => PatternSource::new(
                "Markierung",
                "Notiz",
                "Seite",
                "Hinzugefügt am",
                r"Position|Pos\.",
            ),
            Self::Italian => PatternSource::new(
                "evidenziazione|evidenziato",
                "nota",
                "pagina",
                "Aggiunt[oa] il",
                r"posizione|pos\.",
            ),
            Self::Portuguese => PatternSource::new(
                "destaque",
                "nota",
                "página",
                "Adicionado(?: em|:)",
                "posição",
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PatternSource {
    pub highlight: String,
    pub note: String,
    pub page: String,
    pub added: String,
    pub location: String,
}

impl PatternSource {
    fn new(highlight: &str, note: &str, page: &str, added: &str, location: &str) -> Self {
        Self {
            highlight: highlight.to_string(),
            note: note.to_string(),
            page: page.to_string(),
            added: added.to_string(),
            location: location.to_string(),
        }
    }

    pub fn fallback() -> Self {
        Self::new(
            "subrayado|Highlight",
            "nota|Note",
            r"página|page|pág\.",
            r"Añadid[oa\.]? el|Added on|Agregado el",
            r"posición|Pos\.|position|location|loc\.",
        )
    }
}

#[derive(Debug, Clone)]
pub struct LanguagePatternSet {
    code: String,
    highlight: Regex,
    note: Regex,
    location: Regex,
    added: Regex,
    page_value: Regex,
    location_value: Regex,
    added_value: Regex,
}

impl LanguagePatternSet {
    pub fn compile(code: &str, source: &PatternSource) -> Result<Self> {
        let keyword = |name: &str, alternation: &str| {
            Regex::new(&format!("(?i)(?:{alternation})"))
                .with_context(|| format!("failed to compile {name} pattern for language {code}"))
        };
        let numeric_value = |name: &str, alternation: &str| {
            Regex::new(&format!(r"(?i)(?:{alternation})\s+(?P<value>[0-9,\-]+)")).with_context(
                || format!("failed to compile {name} value pattern for language {code}"),
            )
        };

        Ok(Self {
            code: code.to_string(),
            highlight: keyword("highlight", &source.highlight)?,
            note: keyword("note", &source.note)?,
            location: keyword("location", &source.location)?,
            added: keyword("added", &source.added)?,
            page_value: numeric_value("page", &source.page)?,
            location_value: numeric_value("location", &source.location)?,
            added_value: Regex::new(&format!(r"(?i)(?:{})\s+(?P<date>.*)$", source.added))
                .with_context(|| format!("failed to compile added pattern for language {code}"))?,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn entry_type_of(&self, line: &str) -> Option<EntryType> {
        if self.highlight.is_match(line) {
            Some(EntryType::Highlight)
        } else if self.note.is_match(line) {
            Some(EntryType::Note)
        } else {
            None
        }
    }

    pub fn location_in(&self, line: &str) -> Option<String> {
        capture_value(&self.location_value, line, "value")
    }

    pub fn page_in(&self, line: &str) -> Option<String> {
        capture_value(&self.page_value, line, "value")
    }

    pub fn date_text_in(&self, line: &str) -> Option<String> {
        capture_value(&self.added_value, line, "date")
    }

    fn signal_score(&self, sample: &str) -> usize {
        [&self.highlight, &self.note, &self.location, &self.added]
            .into_iter()
            .filter(|regex| regex.is_match(sample))
            .count()
    }
}

fn capture_value(regex: &Regex, line: &str, group: &str) -> Option<String> {
    regex
        .captures(line)
        .and_then(|captures| captures.name(group))
        .map(|value| value.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Clone)]
pub struct PatternStore {
    languages: BTreeMap<String, LanguagePatternSet>,
    fallback: LanguagePatternSet,
}

impl PatternStore {
    pub fn builtin() -> Result<Self> {
        let mut languages = BTreeMap::new();
        for language in Language::ALL {
            let set = LanguagePatternSet::compile(language.code(), &language.source())?;
            languages.insert(language.code().to_string(), set);
        }

        Ok(Self {
            languages,
            fallback: LanguagePatternSet::compile(DEFAULT_PATTERN_CODE, &PatternSource::fallback())?,
        })
    }

    pub fn load(resource: Option<&Path>) -> Result<Self> {
        let mut store = Self::builtin()?;
        let Some(path) = resource else {
            return Ok(store);
        };

        if !path.exists() {
            warn!(path = %path.display(), "language pattern file not found, using built-in patterns");
            return Ok(store);
        }

        let sources = match read_pattern_sources(path) {
            Ok(sources) => sources,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring invalid language pattern file");
                return Ok(store);
            }
        };

        for (code, source) in sources {
            match LanguagePatternSet::compile(&code, &source) {
                Ok(set) => {
                    store.languages.insert(code, set);
                }
                Err(err) => {
                    warn!(language = %code, error = %err, "skipping language with invalid patterns");
                }
            }
        }

        debug!(
            path = %path.display(),
            languages = store.languages.len(),
            "loaded language pattern file"
        );
        Ok(store)
    }

    pub fn codes(&self) -> Vec<&str> {
        self.languages.keys().map(String::as_str).collect()
    }

    pub fn select(&self, code: &str) -> &LanguagePatternSet {
        let key = code.trim().to_ascii_lowercase();
        match self.languages.get(&key) {
            Some(set) => set,
            None => {
                warn!(language = %code, "language not found, using default patterns");
                &self.fallback
            }
        }
    }

    pub fn detect(&self, content: &str) -> &LanguagePatternSet {
        let sample = content
            .chars()
            .take(DETECTION_SAMPLE_CHARS)
            .collect::<String>();

        let mut best: Option<(&LanguagePatternSet, usize)> = None;
        for set in self.languages.values() {
            let score = set.signal_score(&sample);
            debug!(language = %set.code(), score, "language detection score");
            if score > best.map(|(_, top)| top).unwrap_or(0) {
                best = Some((set, score));
            }
        }

        match best {
            Some((set, score)) => {
                info!(language = %set.code(), score, "detected clippings language");
                set
            }
            None => {
                warn!("language auto-detection failed, using default patterns");
                &self.fallback
            }
        }
    }

    pub fn resolve(&self, requested: &str, content: &str) -> &LanguagePatternSet {
        if requested.trim().eq_ignore_ascii_case("auto") {
            self.detect(content)
        } else {
            self.select(requested)
        }
    }
}

fn read_pattern_sources(path: &Path) -> Result<BTreeMap<String, PatternSource>> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let sources: BTreeMap<String, PatternSource> = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(sources
        .into_iter()
        .map(|(code, source)| (code.trim().to_ascii_lowercase(), source))
        .collect())
}
