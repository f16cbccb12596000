//! Tag-to-label mapping.

use crate::error::{ModelError, ModelResult};
use crate::LabelId;

/// Bidirectional mapping between tag bytes, dense ids, and display names.
///
/// The tag direction is a dense 256-slot table, so lookups are a single
/// index. Ids are assigned in insertion order; re-inserting an existing tag
/// is a no-op that returns the original id.
#[derive(Debug, Clone)]
pub struct LabelTable {
    tag_to_id: [Option<LabelId>; 256],
    names: Vec<String>,
    tags: Vec<u8>,
}

impl LabelTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tag_to_id: [None; 256],
            names: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Inserts a tag with its display name, returning the assigned id.
    ///
    /// First definition wins: inserting a tag that is already present
    /// returns the existing id and leaves the stored name unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::TooManyLabels`] past 256 distinct tags; this
    /// is unreachable through insertion since every byte has a slot, but
    /// the guard keeps the invariant explicit.
    pub fn insert(&mut self, tag: u8, name: &str) -> ModelResult<LabelId> {
        if let Some(id) = self.tag_to_id[tag as usize] {
            return Ok(id);
        }
        if self.names.len() >= 256 {
            return Err(ModelError::TooManyLabels);
        }
        let id = LabelId::new(self.names.len() as u32);
        self.tag_to_id[tag as usize] = Some(id);
        self.names.push(name.to_owned());
        self.tags.push(tag);
        Ok(id)
    }

    /// Looks up the id for a tag byte.
    #[must_use]
    pub fn id_of(&self, tag: u8) -> Option<LabelId> {
        self.tag_to_id[tag as usize]
    }

    /// Looks up the display name for an id.
    #[must_use]
    pub fn name_of(&self, id: LabelId) -> Option<&str> {
        self.names.get(id.index()).map(String::as_str)
    }

    /// Looks up the original tag byte for an id.
    #[must_use]
    pub fn tag_of(&self, id: LabelId) -> Option<u8> {
        self.tags.get(id.index()).copied()
    }

    /// Number of distinct labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no labels have been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates all ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = LabelId> + '_ {
        (0..self.names.len() as u32).map(LabelId::new)
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_assigns_dense_ids() {
        let mut table = LabelTable::new();
        let a = table.insert(b'a', "rock").unwrap();
        let b = table.insert(b'b', "ore").unwrap();
        assert_eq!(a, LabelId::new(0));
        assert_eq!(b, LabelId::new(1));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn reinsert_is_idempotent() {
        let mut table = LabelTable::new();
        let first = table.insert(b'a', "rock").unwrap();
        let second = table.insert(b'a', "granite").unwrap();
        assert_eq!(first, second);
        assert_eq!(table.len(), 1);
        // First definition wins.
        assert_eq!(table.name_of(first), Some("rock"));
    }

    #[test]
    fn id_of_unknown_tag() {
        let table = LabelTable::new();
        assert_eq!(table.id_of(b'x'), None);
    }

    #[test]
    fn name_of_out_of_range() {
        let mut table = LabelTable::new();
        table.insert(b'a', "rock").unwrap();
        assert_eq!(table.name_of(LabelId::new(1)), None);
    }

    #[test]
    fn tag_of_roundtrip() {
        let mut table = LabelTable::new();
        let id = table.insert(b'z', "zinc").unwrap();
        assert_eq!(table.tag_of(id), Some(b'z'));
    }

    #[test]
    fn ids_iterate_in_insertion_order() {
        let mut table = LabelTable::new();
        table.insert(b'c', "c").unwrap();
        table.insert(b'a', "a").unwrap();
        let ids: Vec<u32> = table.ids().map(LabelId::raw).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn all_256_tags_fit() {
        let mut table = LabelTable::new();
        for tag in 0..=255u8 {
            table.insert(tag, "t").unwrap();
        }
        assert_eq!(table.len(), 256);
    }

    #[test]
    fn empty_and_default() {
        let table = LabelTable::default();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
    }
}
