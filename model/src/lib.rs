//! Data model for the voxpack compressor.
//!
//! This crate defines the shared vocabulary of the pipeline:
//! - Grid and parent-block dimensions with divisibility validation
//! - The tag-to-label table built from the input preamble
//! - The emitted cuboid record
//! - The reusable chunk buffer and borrowed parent-block views
//!
//! # Design Principles
//!
//! - **Validate at construction** - A `GridDims` or `LabelTable` that exists
//!   is well-formed; downstream code never re-checks.
//! - **Views, not copies** - Strategies read parent blocks through borrowed
//!   views into one reusable chunk buffer.
//! - **Deterministic** - Label ids are dense and assigned in insertion order.

mod chunk;
mod cuboid;
mod dims;
mod error;
mod label;

pub use chunk::{ChunkGrid, ParentView};
pub use cuboid::Cuboid;
pub use dims::{GridDims, DEPTH_SENTINEL_MAX};
pub use error::{ModelError, ModelResult};
pub use label::LabelTable;

/// A dense label identifier assigned by the [`LabelTable`].
///
/// Ids start at 0 and follow insertion order, so they index directly into
/// per-label bookkeeping arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LabelId(u32);

impl LabelId {
    /// Creates a label id from its raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw id value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns the id as an index into per-label arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for LabelId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<LabelId> for u32 {
    fn from(id: LabelId) -> Self {
        id.0
    }
}

// Serializes as the bare raw id.
impl serde::Serialize for LabelId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for LabelId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <u32 as serde::Deserialize>::deserialize(deserializer).map(LabelId::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_id_roundtrip() {
        let id = LabelId::new(7);
        assert_eq!(id.raw(), 7);
        assert_eq!(id.index(), 7);
        let via: LabelId = 7u32.into();
        assert_eq!(via, id);
        let back: u32 = id.into();
        assert_eq!(back, 7);
    }

    #[test]
    fn label_id_ordering() {
        assert!(LabelId::new(1) < LabelId::new(2));
        assert_eq!(LabelId::default(), LabelId::new(0));
    }

    #[test]
    fn label_id_const() {
        const ID: LabelId = LabelId::new(3);
        assert_eq!(ID.raw(), 3);
    }
}
