use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::warn;

use super::{Author, AuthorId, Catalog, CatalogError, Story};

#[derive(Debug)]
pub(crate) struct ParsedCatalog {
    pub(crate) catalog: Catalog,
    /// Entries dropped because they were malformed, duplicated or had no stories.
    pub(crate) skipped: usize,
}

/// Parses a stories document: a JSON array of
/// `{ userId, username, profileImage?, postedAt?, stories: [{ image }] }`.
pub(crate) fn parse_catalog(raw: &str) -> Result<ParsedCatalog, CatalogError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|err| CatalogError::Document(format!("not valid JSON: {err}")))?;
    let Some(entries) = value.as_array() else {
        return Err(CatalogError::Document(
            "expected a top-level array of authors".to_string(),
        ));
    };

    let mut authors = Vec::with_capacity(entries.len());
    let mut seen_ids = HashSet::new();
    let mut skipped = 0;
    for (idx, entry) in entries.iter().enumerate() {
        let Some(author) = parse_author(entry) else {
            warn!(entry = idx, "skipping malformed or empty author entry");
            skipped += 1;
            continue;
        };
        if !seen_ids.insert(author.id.clone()) {
            warn!(entry = idx, author = %author.id, "skipping duplicate author id");
            skipped += 1;
            continue;
        }
        authors.push(author);
    }

    let catalog = Catalog::new(authors)?;
    Ok(ParsedCatalog { catalog, skipped })
}

fn parse_author(entry: &Value) -> Option<Author> {
    let id = parse_author_id(entry.get("userId")?)?;
    let display_name = non_empty_str(entry.get("username"))
        .unwrap_or(id.as_str())
        .to_string();
    let avatar_image = non_empty_str(entry.get("profileImage")).map(str::to_string);
    let posted_at = non_empty_str(entry.get("postedAt")).and_then(parse_posted_at);

    let stories: Vec<Story> = entry
        .get("stories")?
        .as_array()?
        .iter()
        .filter_map(|story| non_empty_str(story.get("image")).map(Story::new))
        .collect();
    if stories.is_empty() {
        return None;
    }

    Some(Author {
        id,
        display_name,
        avatar_image,
        posted_at,
        stories,
    })
}

fn parse_author_id(value: &Value) -> Option<AuthorId> {
    let raw = match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    (!raw.is_empty()).then(|| AuthorId::from(raw))
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

fn parse_posted_at(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
