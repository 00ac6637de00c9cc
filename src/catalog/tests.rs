use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use super::*;

const SAMPLE: &str = r#"[
  {
    "userId": "u-1",
    "username": "alice",
    "profileImage": "https://img.test/alice.jpg",
    "postedAt": "2026-03-01T10:00:00Z",
    "stories": [{ "image": "https://img.test/a1.jpg" }, { "image": "https://img.test/a2.jpg" }]
  },
  {
    "userId": 42,
    "username": "bob",
    "stories": [{ "image": "https://img.test/b1.jpg" }]
  }
]"#;

fn story(image: &str) -> Story {
    Story::new(image)
}

#[test]
fn parse_catalog_reads_authors_in_order() {
    let parsed = parse_catalog(SAMPLE).expect("sample should parse");
    assert_eq!(parsed.skipped, 0);

    let authors = parsed.catalog.authors();
    assert_eq!(authors.len(), 2);
    assert_eq!(authors[0].id.as_str(), "u-1");
    assert_eq!(authors[0].display_name, "alice");
    assert_eq!(
        authors[0].avatar_image.as_deref(),
        Some("https://img.test/alice.jpg")
    );
    assert_eq!(authors[0].stories.len(), 2);
    assert!(authors[0].posted_at.is_some());
    assert_eq!(authors[1].id.as_str(), "42");
    assert_eq!(authors[1].avatar_image, None);
}

#[test]
fn parse_catalog_filters_authors_without_stories() {
    let raw = r#"[
      { "userId": "a", "username": "a", "stories": [] },
      { "userId": "b", "username": "b", "stories": [{ "image": "" }, { "nope": 1 }] },
      { "userId": "c", "username": "c", "stories": [{ "image": "c.jpg" }] },
      "garbage"
    ]"#;
    let parsed = parse_catalog(raw).expect("one valid author remains");
    assert_eq!(parsed.skipped, 3);
    assert_eq!(parsed.catalog.len(), 1);
    assert_eq!(parsed.catalog.authors()[0].id.as_str(), "c");
}

#[test]
fn parse_catalog_skips_duplicate_ids_keeping_first() {
    let raw = r#"[
      { "userId": "a", "username": "first", "stories": [{ "image": "1.jpg" }] },
      { "userId": "a", "username": "second", "stories": [{ "image": "2.jpg" }] }
    ]"#;
    let parsed = parse_catalog(raw).expect("duplicate is filtered");
    assert_eq!(parsed.skipped, 1);
    assert_eq!(parsed.catalog.authors()[0].display_name, "first");
}

#[test]
fn parse_catalog_falls_back_to_id_for_missing_username() {
    let raw = r#"[{ "userId": "anon-7", "stories": [{ "image": "x.jpg" }] }]"#;
    let parsed = parse_catalog(raw).expect("should parse");
    assert_eq!(parsed.catalog.authors()[0].display_name, "anon-7");
}

#[test]
fn parse_catalog_ignores_invalid_timestamps() {
    let raw = r#"[{ "userId": "a", "postedAt": "yesterday", "stories": [{ "image": "x.jpg" }] }]"#;
    let parsed = parse_catalog(raw).expect("should parse");
    assert_eq!(parsed.catalog.authors()[0].posted_at, None);
}

#[test]
fn parse_catalog_rejects_non_array_documents() {
    let err = parse_catalog(r#"{ "users": [] }"#).expect_err("object is not accepted");
    assert!(matches!(err, CatalogError::Document(_)));

    let err = parse_catalog("not json").expect_err("invalid JSON");
    assert!(err.to_string().contains("not valid JSON"));
}

#[test]
fn parse_catalog_rejects_documents_without_usable_authors() {
    let err = parse_catalog(r#"[{ "userId": "a", "stories": [] }]"#).expect_err("nothing left");
    assert!(matches!(err, CatalogError::Empty));
}

#[test]
fn catalog_new_validates_invariants() {
    assert!(matches!(Catalog::new(Vec::new()), Err(CatalogError::Empty)));

    let err = Catalog::new(vec![Author::new("a", "a", Vec::new())]).expect_err("no stories");
    assert!(matches!(err, CatalogError::NoStories(id) if id.as_str() == "a"));

    let err = Catalog::new(vec![
        Author::new("a", "a", vec![story("1")]),
        Author::new("a", "again", vec![story("2")]),
    ])
    .expect_err("duplicate");
    assert!(matches!(err, CatalogError::DuplicateAuthor(_)));
}

#[test]
fn positions_are_only_built_in_range() {
    let catalog = Catalog::new(vec![
        Author::new("a", "a", vec![story("1"), story("2")]),
        Author::new("b", "b", vec![story("3")]),
    ])
    .expect("valid catalog");

    assert!(catalog.position(0, 1).is_some());
    assert!(catalog.position(0, 2).is_none());
    assert!(catalog.position(2, 0).is_none());

    let last_of_a = catalog.position(0, 1).expect("in range");
    assert!(catalog.is_last_story(last_of_a));
    assert!(!catalog.is_last_author(last_of_a));
    assert_eq!(catalog.story_at(last_of_a).image, "2");

    let only_of_b = catalog.position(1, 0).expect("in range");
    assert!(catalog.is_last_story(only_of_b));
    assert!(catalog.is_last_author(only_of_b));
}

#[test]
fn first_story_of_checks_author_bounds() {
    let catalog = Catalog::new(vec![
        Author::new("a", "a", vec![story("1"), story("2")]),
        Author::new("b", "b", vec![story("3")]),
    ])
    .expect("valid catalog");

    let start = catalog.first_story_of(1).expect("author b exists");
    assert_eq!((start.author_index(), start.story_index()), (1, 0));
    assert!(matches!(
        catalog.first_story_of(2),
        Err(CatalogError::AuthorOutOfRange { index: 2, len: 2 })
    ));
}

#[test]
fn thumbnail_prefers_avatar_then_first_story() {
    let mut author = Author::new("a", "a", vec![story("first.jpg"), story("second.jpg")]);
    assert_eq!(author.thumbnail_image(), Some("first.jpg"));
    author.avatar_image = Some("avatar.jpg".to_string());
    assert_eq!(author.thumbnail_image(), Some("avatar.jpg"));
}

#[test]
fn every_story_uses_the_fixed_duration() {
    assert_eq!(story("x").display_duration(), STORY_DURATION);
    assert_eq!(STORY_DURATION.as_millis(), 5000);
}

#[test]
fn catalog_source_detects_urls() {
    assert_eq!(
        CatalogSource::from_arg(" https://cdn.test/stories.json "),
        CatalogSource::Url("https://cdn.test/stories.json".to_string())
    );
    assert_eq!(
        CatalogSource::from_arg("HTTP://cdn.test/s.json"),
        CatalogSource::Url("HTTP://cdn.test/s.json".to_string())
    );
    assert_eq!(
        CatalogSource::from_arg("./stories.json"),
        CatalogSource::File(PathBuf::from("./stories.json"))
    );
}

#[test]
fn load_catalog_reads_local_files() {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock after epoch")
        .as_nanos();
    let path = std::env::temp_dir().join(format!("storyreel-catalog-{nanos}.json"));
    std::fs::write(&path, SAMPLE).expect("write sample catalog");

    let parsed = load_catalog(&CatalogSource::File(path.clone())).expect("load from file");
    let _ = std::fs::remove_file(&path);

    assert_eq!(parsed.catalog.len(), 2);
}

#[test]
fn load_catalog_reports_missing_files() {
    let path = std::env::temp_dir().join("storyreel-definitely-missing/stories.json");
    let err = load_catalog(&CatalogSource::File(path)).expect_err("missing file");
    assert!(matches!(err, CatalogError::Io(_)));
}
