//! Per-subject record storage.
//!
//! Records are keyed by subject id in an ordered map, so iteration is always
//! in ascending id order and arbitrary ids cost one entry each. Records are
//! never created implicitly: callers go through `ensure` (or `ensure_with`)
//! before mutating a subject.

use crate::event::SubjectId;
use std::collections::BTreeMap;

/// Arena of per-subject records keyed by subject id
#[derive(Debug, Clone)]
pub struct SubjectArena<T> {
    records: BTreeMap<SubjectId, T>,
}

impl<T> Default for SubjectArena<T> {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }
}

impl<T> SubjectArena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the record for `id`, creating it with `init` on first reference
    pub fn ensure_with(&mut self, id: SubjectId, init: impl FnOnce() -> T) -> &mut T {
        self.records.entry(id).or_insert_with(init)
    }

    /// Get the record for `id`, creating a default one on first reference
    pub fn ensure(&mut self, id: SubjectId) -> &mut T
    where
        T: Default,
    {
        self.ensure_with(id, T::default)
    }

    pub fn get(&self, id: SubjectId) -> Option<&T> {
        self.records.get(&id)
    }

    /// Drop a subject's record
    pub fn remove(&mut self, id: SubjectId) -> Option<T> {
        self.records.remove(&id)
    }

    /// Number of live records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Live records in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = (SubjectId, &T)> {
        self.records.iter().map(|(id, record)| (*id, record))
    }

    /// Live records in ascending id order, mutably
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SubjectId, &mut T)> {
        self.records.iter_mut().map(|(id, record)| (*id, record))
    }

    /// Consume the arena, yielding live records in ascending id order
    pub fn into_iter_ordered(self) -> impl Iterator<Item = (SubjectId, T)> {
        self.records.into_iter()
    }
}
