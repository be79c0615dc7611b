use super::*;

const NOTE_TITLE_CHARS: usize = 50;
const MAX_PAGE_REFERENCE_CHARS: usize = 6;
const ENTITY_ID_CHARS: usize = 32;
const NOTE_SOURCE: &str = "kindle-to-jex";
const NOTE_SOURCE_APPLICATION: &str = "kindle";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntityKind {
    Note = 1,
    Folder = 2,
    Tag = 5,
    NoteTag = 6,
}

#[derive(Debug, Clone)]
pub(super) struct JoplinEntity {
    pub(super) id: String,
    kind: EntityKind,
    title: Option<String>,
    body: Option<String>,
    properties: Vec<(&'static str, String)>,
}

impl JoplinEntity {
    fn new(id: String, kind: EntityKind) -> Self {
        Self {
            id,
            kind,
            title: None,
            body: None,
            properties: Vec::new(),
        }
    }

    fn property(mut self, key: &'static str, value: impl ToString) -> Self {
        self.properties.push((key, value.to_string()));
        self
    }

    fn timestamps(self, stamp: &str) -> Self {
        self.property("created_time", stamp)
            .property("updated_time", stamp)
            .property("user_created_time", stamp)
            .property("user_updated_time", stamp)
    }

    pub(super) fn render(&self) -> String {
        let mut out = String::new();
        if let Some(title) = &self.title {
            out.push_str(title);
            out.push_str("\n\n");
        }
        if let Some(body) = &self.body {
            out.push_str(body);
            out.push_str("\n\n");
        }
        out.push_str(&format!("id: {}\n", self.id));
        for (key, value) in &self.properties {
            out.push_str(&format!("{key}: {value}\n"));
        }
        out.push_str(&format!("type_: {}", self.kind as u8));
        out
    }
}

fn entity_id(namespace: &str, key: &str) -> String {
    sha256_hex(&format!("{namespace}:{key}"))[..ENTITY_ID_CHARS].to_string()
}

fn joplin_time(value: NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

pub(super) fn note_title(content: &str, page: &str) -> String {
    let snippet = content
        .chars()
        .take(NOTE_TITLE_CHARS)
        .collect::<String>()
        .replace('\n', " ");

    let digits_only = page
        .chars()
        .filter(|character| *character != '-')
        .collect::<String>();
    let numeric = !digits_only.is_empty() && digits_only.chars().all(|c| c.is_ascii_digit());
    if !numeric || page.chars().count() > MAX_PAGE_REFERENCE_CHARS {
        return snippet;
    }

    match page.split('-').next().and_then(|first| first.parse::<u64>().ok()) {
        Some(number) => format!("[{number}] {snippet}"),
        None => format!("[{page}] {snippet}"),
    }
}

pub(super) fn note_body(clipping: &Clipping) -> String {
    let date = clipping
        .date_time
        .map(|value| value.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default();

    let mut meta = vec![
        format!("- date: {date}"),
        format!("- author: {}", clipping.author),
        format!("- book: {}", clipping.book_title),
        format!("- page: {}", clipping.page),
        format!("- location: {}", clipping.location),
    ];
    if !clipping.tags.is_empty() {
        meta.push(format!("- tags: {}", clipping.tags.join(", ")));
    }

    format!("{}\n\n\n-----\n{}\n-----\n", clipping.content, meta.join("\n"))
}

pub(super) struct JexBuilder<'a> {
    context: &'a ExportContext,
    stamp: String,
    root_id: String,
    entities: Vec<JoplinEntity>,
    authors: HashMap<String, String>,
    books: HashMap<(String, String), String>,
    tags: HashMap<String, String>,
    note_ids: HashSet<String>,
}

impl<'a> JexBuilder<'a> {
    pub(super) fn new(context: &'a ExportContext) -> Self {
        let stamp = joplin_time(Utc::now().naive_utc());
        let root_id = entity_id("notebook", &context.root_notebook_name);
        let root = folder(root_id.clone(), &context.root_notebook_name, "", &stamp);

        Self {
            context,
            stamp,
            root_id,
            entities: vec![root],
            authors: HashMap::new(),
            books: HashMap::new(),
            tags: HashMap::new(),
            note_ids: HashSet::new(),
        }
    }

    pub(super) fn add(&mut self, clipping: &Clipping) {
        let book_id = self.book_folder(&clipping.author, &clipping.book_title);
        let note_id = self.note_id(clipping);
        let created = clipping
            .date_time
            .map(joplin_time)
            .unwrap_or_else(|| self.stamp.clone());
        let geo = self.context.geo_location;

        let mut note = JoplinEntity::new(note_id.clone(), EntityKind::Note)
            .property("parent_id", &book_id)
            .timestamps(&created)
            .property("latitude", geo.latitude)
            .property("longitude", geo.longitude)
            .property("altitude", geo.altitude)
            .property("author", &self.context.creator_name)
            .property("source", NOTE_SOURCE)
            .property("source_application", NOTE_SOURCE_APPLICATION)
            .property("is_todo", 0)
            .property("encryption_applied", 0)
            .property("is_shared", 0)
            .property("order", 0)
            .property("markup_language", 1);
        note.title = Some(note_title(&clipping.content, &clipping.page));
        note.body = Some(note_body(clipping));
        self.entities.push(note);

        self.link_tags(&note_id, &clipping.tags);
    }

    pub(super) fn finish(self) -> Vec<JoplinEntity> {
        self.entities
    }

    fn author_folder(&mut self, author: &str) -> String {
        if let Some(id) = self.authors.get(author) {
            return id.clone();
        }

        let id = entity_id("author", author);
        let entity = folder(id.clone(), author, &self.root_id, &self.stamp);
        self.entities.push(entity);
        self.authors.insert(author.to_string(), id.clone());
        id
    }

    fn book_folder(&mut self, author: &str, title: &str) -> String {
        let key = (author.to_string(), title.to_string());
        if let Some(id) = self.books.get(&key) {
            return id.clone();
        }

        let author_id = self.author_folder(author);
        let id = entity_id("book", &format!("{author}\u{1f}{title}"));
        let entity = folder(id.clone(), title, &author_id, &self.stamp);
        self.entities.push(entity);
        self.books.insert(key, id.clone());
        id
    }

    fn note_id(&mut self, clipping: &Clipping) -> String {
        let seed = if clipping.uid.is_empty() {
            format!("{}|{}", clipping.title_hash(), clipping.content)
        } else {
            clipping.uid.clone()
        };

        let mut id = entity_id("note", &seed);
        let mut attempt = 1;
        while !self.note_ids.insert(id.clone()) {
            attempt += 1;
            id = entity_id("note", &format!("{seed}#{attempt}"));
        }
        id
    }

    fn link_tags(&mut self, note_id: &str, tags: &TagSet) {
        let mut linked = HashSet::new();
        for raw in tags.iter() {
            let title = raw.trim();
            if title.is_empty() {
                continue;
            }

            let key = title.to_lowercase();
            let tag_id = match self.tags.get(&key) {
                Some(id) => id.clone(),
                None => {
                    let id = entity_id("tag", &key);
                    let mut tag = JoplinEntity::new(id.clone(), EntityKind::Tag)
                        .property("parent_id", "")
                        .timestamps(&self.stamp)
                        .property("encryption_applied", 0);
                    tag.title = Some(title.to_string());
                    self.entities.push(tag);
                    self.tags.insert(key, id.clone());
                    id
                }
            };
            if !linked.insert(tag_id.clone()) {
                continue;
            }

            let link = JoplinEntity::new(
                entity_id("note_tag", &format!("{note_id}:{tag_id}")),
                EntityKind::NoteTag,
            )
            .property("note_id", note_id)
            .property("tag_id", &tag_id)
            .timestamps(&self.stamp)
            .property("encryption_applied", 0);
            self.entities.push(link);
        }
    }
}

fn folder(id: String, title: &str, parent_id: &str, stamp: &str) -> JoplinEntity {
    let mut entity = JoplinEntity::new(id, EntityKind::Folder)
        .property("parent_id", parent_id)
        .timestamps(stamp)
        .property("encryption_applied", 0)
        .property("is_shared", 0);
    entity.title = Some(title.to_string());
    entity
}

pub struct JexExporter;

impl Exporter for JexExporter {
    fn export(
        &self,
        clippings: &[Clipping],
        output: &Path,
        context: &ExportContext,
    ) -> Result<PathBuf> {
        let path = with_extension(output, "jex");
        ensure_parent(&path)?;

        let mut builder = JexBuilder::new(context);
        for clipping in clippings {
            builder.add(clipping);
        }
        let entities = builder.finish();

        let file =
            File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
        let mut archive = tar::Builder::new(file);
        let mtime = u64::try_from(Utc::now().timestamp()).unwrap_or_default();

        for entity in &entities {
            let content = entity.render();
            let mut header = tar::Header::new_ustar();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_mtime(mtime);
            header.set_cksum();

            archive
                .append_data(&mut header, format!("{}.md", entity.id), content.as_bytes())
                .with_context(|| format!("failed to append entity {} to archive", entity.id))?;
        }
        archive
            .finish()
            .with_context(|| format!("failed to finalize {}", path.display()))?;

        info!(
            path = %path.display(),
            entities = entities.len(),
            notes = clippings.len(),
            "wrote joplin export"
        );
        Ok(path)
    }
}
