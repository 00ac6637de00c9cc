mod parse;
mod source;

#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

pub(crate) use parse::{ParsedCatalog, parse_catalog};
pub(crate) use source::{CatalogSource, is_http_url, load_catalog};

/// Every story is shown for the same fixed time.
pub(crate) const STORY_DURATION: Duration = Duration::from_millis(5000);

#[derive(Debug, Error)]
pub(crate) enum CatalogError {
    #[error("catalog contains no authors")]
    Empty,

    #[error("author {0} has no stories")]
    NoStories(AuthorId),

    #[error("author id {0} appears more than once")]
    DuplicateAuthor(AuthorId),

    #[error("author index {index} is out of range for a catalog of {len} author(s)")]
    AuthorOutOfRange { index: usize, len: usize },

    #[error("invalid catalog document: {0}")]
    Document(String),

    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to fetch catalog: {0}")]
    Fetch(#[from] crate::http::HttpError),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct AuthorId(String);

impl AuthorId {
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AuthorId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for AuthorId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Story {
    pub(crate) image: String,
}

impl Story {
    pub(crate) fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
        }
    }

    pub(crate) fn display_duration(&self) -> Duration {
        STORY_DURATION
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Author {
    pub(crate) id: AuthorId,
    pub(crate) display_name: String,
    pub(crate) avatar_image: Option<String>,
    pub(crate) posted_at: Option<DateTime<Utc>>,
    pub(crate) stories: Vec<Story>,
}

impl Author {
    #[cfg(test)]
    pub(crate) fn new(id: impl Into<AuthorId>, display_name: &str, stories: Vec<Story>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.to_string(),
            avatar_image: None,
            posted_at: None,
            stories,
        }
    }

    /// Image shown for the author's thumbnail: the avatar, else the first story.
    pub(crate) fn thumbnail_image(&self) -> Option<&str> {
        self.avatar_image
            .as_deref()
            .or_else(|| self.stories.first().map(|story| story.image.as_str()))
    }

    pub(crate) fn last_story_index(&self) -> usize {
        self.stories.len().saturating_sub(1)
    }
}

/// A (author, story) pair that is known to exist in the catalog it came from.
///
/// Only [`Catalog`] can construct one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct PlaybackPosition {
    author_index: usize,
    story_index: usize,
}

impl PlaybackPosition {
    pub(crate) fn author_index(self) -> usize {
        self.author_index
    }

    pub(crate) fn story_index(self) -> usize {
        self.story_index
    }
}

impl fmt::Display for PlaybackPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.author_index, self.story_index)
    }
}

/// Ordered, validated, read-only list of authors for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Catalog {
    authors: Vec<Author>,
}

impl Catalog {
    pub(crate) fn new(authors: Vec<Author>) -> Result<Self, CatalogError> {
        if authors.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for author in &authors {
            if author.stories.is_empty() {
                return Err(CatalogError::NoStories(author.id.clone()));
            }
            if !seen.insert(&author.id) {
                return Err(CatalogError::DuplicateAuthor(author.id.clone()));
            }
        }
        Ok(Self { authors })
    }

    pub(crate) fn authors(&self) -> &[Author] {
        &self.authors
    }

    pub(crate) fn len(&self) -> usize {
        self.authors.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&Author> {
        self.authors.get(index)
    }

    pub(crate) fn position(&self, author_index: usize, story_index: usize) -> Option<PlaybackPosition> {
        let author = self.authors.get(author_index)?;
        (story_index < author.stories.len()).then_some(PlaybackPosition {
            author_index,
            story_index,
        })
    }

    pub(crate) fn first_story_of(&self, author_index: usize) -> Result<PlaybackPosition, CatalogError> {
        self.position(author_index, 0).ok_or(CatalogError::AuthorOutOfRange {
            index: author_index,
            len: self.authors.len(),
        })
    }

    pub(crate) fn author_at(&self, position: PlaybackPosition) -> &Author {
        &self.authors[position.author_index]
    }

    pub(crate) fn story_at(&self, position: PlaybackPosition) -> &Story {
        &self.author_at(position).stories[position.story_index]
    }

    pub(crate) fn is_last_story(&self, position: PlaybackPosition) -> bool {
        position.story_index == self.author_at(position).last_story_index()
    }

    pub(crate) fn is_last_author(&self, position: PlaybackPosition) -> bool {
        position.author_index + 1 == self.authors.len()
    }
}
