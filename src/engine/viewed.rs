use std::collections::HashSet;

use crate::catalog::AuthorId;

/// Authors whose stories were fully consumed during this session.
///
/// Grows only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ViewedSet {
    ids: HashSet<AuthorId>,
}

impl ViewedSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when `id` was not already present.
    pub(crate) fn insert(&mut self, id: AuthorId) -> bool {
        self.ids.insert(id)
    }

    pub(crate) fn contains(&self, id: &AuthorId) -> bool {
        self.ids.contains(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
