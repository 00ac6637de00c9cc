use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum EngineError {
    #[error("story catalog is empty")]
    EmptyCatalog,

    #[error("author index {index} is out of range for a catalog of {len} author(s)")]
    AuthorOutOfRange { index: usize, len: usize },
}
