use std::fmt;
use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use super::{CatalogError, ParsedCatalog, parse_catalog};
use crate::http::{FetchPolicy, get_text_with_retries};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CatalogSource {
    File(PathBuf),
    Url(String),
}

impl CatalogSource {
    pub(crate) fn from_arg(raw: &str) -> Self {
        let trimmed = raw.trim();
        if is_http_url(trimmed) {
            Self::Url(trimmed.to_string())
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

pub(crate) fn is_http_url(raw: &str) -> bool {
    let lower = raw.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Reads the stories document once for the session and validates it.
pub(crate) fn load_catalog(source: &CatalogSource) -> Result<ParsedCatalog, CatalogError> {
    let raw = match source {
        CatalogSource::File(path) => fs::read_to_string(path)?,
        CatalogSource::Url(url) => get_text_with_retries(url, &FetchPolicy::catalog())?,
    };
    let parsed = parse_catalog(&raw)?;
    if parsed.skipped > 0 {
        warn!(%source, skipped = parsed.skipped, "catalog entries were skipped");
    }
    info!(%source, authors = parsed.catalog.len(), "catalog loaded");
    Ok(parsed)
}
