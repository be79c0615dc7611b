use std::collections::BTreeMap;
use std::fs;
use std::io::Read;

use chrono::NaiveDate;

use super::*;
use crate::cli::SourceArgs;
use crate::model::{EntryType, GeoLocation};

fn sample_clipping() -> Clipping {
    let mut tags = TagSet::new();
    tags.insert("fantasy");
    tags.insert("epic");
    Clipping {
        content: "This is the quote content.".to_string(),
        book_title: "The Way of Kings".to_string(),
        author: "Brandon Sanderson".to_string(),
        date_time: NaiveDate::from_ymd_opt(2023, 10, 27).and_then(|date| date.and_hms_opt(12, 0, 0)),
        location: "100-200".to_string(),
        page: "42".to_string(),
        entry_type: EntryType::Highlight,
        tags,
        is_duplicate: false,
        uid: sha256_hex("This is the quote content.|The Way of Kings|Brandon Sanderson|100-200"),
    }
}

fn sample_context() -> ExportContext {
    ExportContext {
        root_notebook_name: "Kindle Imports".to_string(),
        creator_name: "Reader".to_string(),
        geo_location: GeoLocation {
            latitude: 40.4,
            longitude: -3.7,
            altitude: 650.0,
        },
    }
}

fn read_archive(path: &Path) -> BTreeMap<String, String> {
    let file = File::open(path).expect("open archive");
    let mut archive = tar::Archive::new(file);
    let mut entries = BTreeMap::new();
    for entry in archive.entries().expect("archive entries") {
        let mut entry = entry.expect("archive entry");
        let name = entry
            .path()
            .expect("entry path")
            .to_string_lossy()
            .into_owned();
        let mut content = String::new();
        entry.read_to_string(&mut content).expect("entry content");
        entries.insert(name, content);
    }
    entries
}

#[test]
fn output_extension_is_appended_when_missing() {
    assert_eq!(with_extension(Path::new("out"), "jex"), PathBuf::from("out.jex"));
    assert_eq!(
        with_extension(Path::new("out.JEX"), "jex"),
        PathBuf::from("out.JEX")
    );
    assert_eq!(
        with_extension(Path::new("dir/file.txt"), "csv"),
        PathBuf::from("dir/file.txt.csv")
    );
}

#[test]
fn note_titles_carry_short_numeric_page_references() {
    assert_eq!(note_title("Hello\nworld", "12"), "[12] Hello world");
    assert_eq!(note_title("Range", "10-12"), "[10] Range");
    assert_eq!(note_title("No page", ""), "No page");
    assert_eq!(note_title("Too long", "1234567"), "Too long");
    assert_eq!(note_title("Roman", "xii"), "Roman");

    let long = "x".repeat(80);
    assert_eq!(note_title(&long, "").chars().count(), 50);
}

#[test]
fn note_body_ends_with_metadata_footer() {
    let mut clipping = sample_clipping();
    let body = note_body(&clipping);
    assert!(body.starts_with("This is the quote content.\n\n\n-----\n"));
    assert!(body.contains("- date: 2023-10-27 12:00:00\n"));
    assert!(body.contains("- tags: fantasy, epic\n"));
    assert!(body.ends_with("-----\n"));

    clipping.tags = TagSet::new();
    assert!(!note_body(&clipping).contains("- tags:"));
}

#[test]
fn jex_archive_holds_folders_notes_and_tags() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut second = sample_clipping();
    second.content = "Another highlight from the same book.".to_string();
    second.uid = sha256_hex("second");
    second.tags = ["Fantasy ", "epic", "EPIC"].into_iter().collect();

    let clippings = vec![sample_clipping(), second];
    let written = JexExporter
        .export(&clippings, &dir.path().join("library"), &sample_context())
        .expect("jex export");
    assert_eq!(written, dir.path().join("library.jex"));

    let entries = read_archive(&written);
    // root, author, book, two notes, two tags, four note-tag links
    assert_eq!(entries.len(), 11);
    assert!(entries.keys().all(|name| name.ends_with(".md")));

    let types = entries
        .values()
        .map(|content| {
            assert!(!content.ends_with('\n'));
            content
                .rsplit("type_: ")
                .next()
                .expect("type line")
                .to_string()
        })
        .collect::<Vec<String>>();
    assert_eq!(types.iter().filter(|kind| *kind == "2").count(), 3);
    assert_eq!(types.iter().filter(|kind| *kind == "1").count(), 2);
    assert_eq!(types.iter().filter(|kind| *kind == "5").count(), 2);
    assert_eq!(types.iter().filter(|kind| *kind == "6").count(), 4);

    let note = entries
        .values()
        .find(|content| content.starts_with("[42] This is the quote content."))
        .expect("note entity");
    assert!(note.contains("latitude: 40.4\n"));
    assert!(note.contains("author: Reader\n"));
    assert!(note.contains("created_time: 2023-10-27T12:00:00.000Z\n"));

    let tag_titles = entries
        .values()
        .filter(|content| content.ends_with("type_: 5"))
        .map(|content| content.lines().next().unwrap_or_default().to_string())
        .collect::<Vec<String>>();
    assert!(tag_titles.contains(&"fantasy".to_string()));
    assert!(tag_titles.contains(&"epic".to_string()));
}

#[test]
fn jex_entity_ids_are_deterministic() {
    let dir = tempfile::tempdir().expect("tempdir");
    let clippings = vec![sample_clipping()];

    let first = JexExporter
        .export(&clippings, &dir.path().join("first"), &sample_context())
        .expect("first export");
    let second = JexExporter
        .export(&clippings, &dir.path().join("second.jex"), &sample_context())
        .expect("second export");

    let first_names = read_archive(&first).into_keys().collect::<Vec<String>>();
    let second_names = read_archive(&second).into_keys().collect::<Vec<String>>();
    assert_eq!(first_names, second_names);
}

#[test]
fn repeated_uids_get_distinct_note_ids() {
    let context = sample_context();
    let mut builder = JexBuilder::new(&context);
    builder.add(&sample_clipping());
    builder.add(&sample_clipping());

    let entities = builder.finish();
    let ids = entities
        .iter()
        .map(|entity| entity.id.clone())
        .collect::<HashSet<String>>();
    assert_eq!(ids.len(), entities.len());
}

#[test]
fn csv_export_writes_bom_and_header() {
    let dir = tempfile::tempdir().expect("tempdir");
    let written = CsvExporter
        .export(&[sample_clipping()], &dir.path().join("clips"), &sample_context())
        .expect("csv export");
    assert_eq!(written, dir.path().join("clips.csv"));

    let bytes = fs::read(&written).expect("read csv");
    assert!(bytes.starts_with(UTF8_BOM));

    let mut reader = csv::Reader::from_reader(&bytes[UTF8_BOM.len()..]);
    let headers = reader.headers().expect("headers").clone();
    assert_eq!(
        headers.iter().collect::<Vec<&str>>(),
        vec!["book_title", "author", "content", "type", "date_time", "page", "location", "tags"]
    );

    let row = reader
        .records()
        .next()
        .expect("one row")
        .expect("valid row");
    assert_eq!(&row[0], "The Way of Kings");
    assert_eq!(&row[3], "highlight");
    assert_eq!(&row[4], "2023-10-27T12:00:00");
    assert_eq!(&row[7], "fantasy, epic");
}

#[test]
fn json_export_includes_meta_and_duplicate_flags() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut duplicate = sample_clipping();
    duplicate.is_duplicate = true;
    duplicate.date_time = None;

    let written = JsonExporter
        .export(
            &[sample_clipping(), duplicate],
            &dir.path().join("backup.json"),
            &sample_context(),
        )
        .expect("json export");

    let raw = fs::read(&written).expect("read json");
    let document: serde_json::Value = serde_json::from_slice(&raw).expect("valid json");
    assert_eq!(document["meta"]["count"], 2);
    assert_eq!(document["meta"]["creator"], "Reader");
    assert_eq!(document["meta"]["root_notebook"], "Kindle Imports");
    assert_eq!(document["clippings"][0]["type"], "highlight");
    assert_eq!(document["clippings"][0]["uid"], sample_clipping().uid);
    assert_eq!(document["clippings"][0]["tags"][1], "epic");
    assert_eq!(document["clippings"][1]["is_duplicate"], true);
    assert!(document["clippings"][1]["date_time"].is_null());
}

#[test]
fn markdown_export_builds_author_and_book_folders() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().join("vault");
    let clipping = sample_clipping();

    let written = MarkdownExporter
        .export(&[clipping.clone()], &root, &sample_context())
        .expect("markdown export");
    assert_eq!(written, root);

    let expected = root
        .join("BRANDON SANDERSON")
        .join("The Way of Kings")
        .join(format!("Page 42 - 20231027120000_{}.md", &clipping.uid[..8]));
    let content = fs::read_to_string(&expected).expect("markdown file");

    assert!(content.starts_with("---\n"));
    assert!(content.contains("book: \"The Way of Kings\"\n"));
    assert!(content.contains("author: \"Brandon Sanderson\"\n"));
    assert!(content.contains("date: 2023-10-27T12:00:00\n"));
    assert!(content.contains("source: \"kindle\"\n"));
    assert!(content.contains(&format!("generator: \"{}\"\n", generator_string())));
    assert!(content.ends_with("---\n\nThis is the quote content.\n"));
    assert!(!content.contains("location:"));
    assert!(!content.contains("creator:"));
}

#[test]
fn markdown_filenames_fall_back_and_stay_unique() {
    let mut clipping = sample_clipping();
    clipping.page.clear();
    clipping.date_time = None;
    assert!(markdown_filename(&clipping).starts_with("Loc 100-200 - 000000_"));

    clipping.location.clear();
    assert!(markdown_filename(&clipping).starts_with("Note - 000000_"));

    assert_eq!(sanitize_filename(" Title: Sub? <1> "), "Title Sub 1");

    let dir = tempfile::tempdir().expect("tempdir");
    MarkdownExporter
        .export(
            &[sample_clipping(), sample_clipping()],
            dir.path(),
            &sample_context(),
        )
        .expect("markdown export");
    let book = dir.path().join("BRANDON SANDERSON").join("The Way of Kings");
    let files = fs::read_dir(&book).expect("book folder").count();
    assert_eq!(files, 2);
}

#[test]
fn markdown_escapes_yaml_and_neutralizes_dot_folders() {
    assert_eq!(yaml_quote(r#"Foo\Bar "x""#), r#""Foo\\Bar \"x\"""#);

    let mut clipping = sample_clipping();
    clipping.book_title = "..".to_string();
    clipping.author = ".".to_string();

    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().join("vault");
    MarkdownExporter
        .export(&[clipping.clone()], &root, &sample_context())
        .expect("markdown export");

    let folder = root.join("_").join("_");
    let files = fs::read_dir(&folder).expect("placeholder folder").count();
    assert_eq!(files, 1);
    assert!(!dir.path().join(markdown_filename(&clipping)).exists());
    assert!(!root.join(markdown_filename(&clipping)).exists());
}

#[test]
fn export_command_skips_duplicates_and_writes_stats() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("My Clippings.txt");
    fs::write(
        &input,
        "Book (Author)\n- Your Highlight on Location 100-150 | Added on Monday, January 1, 2024 10:00:00 AM\n\nThe quick brown fox jumps.\n==========\n\
         Book (Author)\n- Your Highlight on Location 100-200 | Added on Tuesday, January 2, 2024 10:00:00 AM\n\nThe quick brown fox jumps. Over the lazy dog it goes.\n==========\n",
    )
    .expect("write clippings");

    let output = dir.path().join("out");
    let stats_path = dir.path().join("reports").join("stats.json");
    let args = ExportArgs {
        source: SourceArgs {
            input: Some(input),
            language: Some("en".to_string()),
            ..SourceArgs::default()
        },
        output: Some(output.clone()),
        format: Some(ExportFormat::Json),
        notebook: None,
        creator: Some("Tester".to_string()),
        location: None,
        no_dedup: false,
        include_duplicates: false,
        latest_notes_only: false,
        stats_path: Some(stats_path.clone()),
    };

    run(args, &AppConfig::default()).expect("export command");

    let exported: serde_json::Value =
        serde_json::from_slice(&fs::read(output.with_extension("json")).expect("read export"))
            .expect("valid export");
    assert_eq!(exported["meta"]["count"], 1);
    assert_eq!(exported["meta"]["creator"], "Tester");
    assert!(
        exported["clippings"][0]["content"]
            .as_str()
            .expect("content")
            .ends_with("it goes.")
    );

    let stats: serde_json::Value =
        serde_json::from_slice(&fs::read(&stats_path).expect("read stats")).expect("valid stats");
    assert_eq!(stats["exported"], 1);
    assert_eq!(stats["duplicates_skipped"], 1);
    assert_eq!(stats["language"], "en");
    assert_eq!(stats["stats"]["parsed"], 2);
}
