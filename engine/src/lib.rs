//! Grouping engine for the voxpack compressor.
//!
//! A family of interchangeable strategies turns a parent-block view and a
//! label into a batch of uniform cuboids. All strategies guarantee:
//!
//! - **Conservation** - emitted volume equals the matching-cell count.
//! - **Boundedness** - every cuboid lies inside the parent block.
//! - **Determinism** - identical input produces identical output,
//!   including order.
//!
//! Per-parent strategies share the [`cover`] entry point; the streaming
//! strategy ([`StreamRleXy`]) consumes rows directly and never
//! materializes a chunk.

mod default;
mod ensemble;
mod error;
mod greedy;
mod maxrect;
mod rlexy;
mod smart;
mod stream;
mod verify;

pub use ensemble::cover_ensemble;
pub use error::{EngineError, EngineResult};
pub use smart::merge_adjacent;
pub use stream::StreamRleXy;
pub use verify::verify_cover;

use model::{Cuboid, LabelId, ParentView};

/// The grouping strategy to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// One `1x1x1` cuboid per cell; the reference oracle.
    Default,
    /// Row runs merged vertically, `dz = 1`.
    Greedy,
    /// Maximum-area rectangles per slice, stacked across `z`.
    MaxRect,
    /// Greedy semantics with a linear two-pointer row merge.
    RleXy,
    /// Ensemble of MaxRect, Greedy, and RLE-XY plus an adjacency
    /// merge post-pass.
    Smart,
    /// All labels in one row-streaming pass, `dz = 1`.
    StreamRleXy,
}

impl Strategy {
    /// Every strategy, in CLI listing order.
    pub const ALL: [Self; 6] = [
        Self::Default,
        Self::Greedy,
        Self::MaxRect,
        Self::RleXy,
        Self::Smart,
        Self::StreamRleXy,
    ];

    /// The configuration name of this strategy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Greedy => "greedy",
            Self::MaxRect => "maxrect",
            Self::RleXy => "rlexy",
            Self::Smart => "smart",
            Self::StreamRleXy => "stream-rlexy",
        }
    }

    /// Returns `true` for strategies that consume rows instead of parent
    /// blocks.
    #[must_use]
    pub const fn is_streaming(self) -> bool {
        matches!(self, Self::StreamRleXy)
    }
}

impl std::str::FromStr for Strategy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Self::Default),
            "greedy" => Ok(Self::Greedy),
            "maxrect" => Ok(Self::MaxRect),
            "rlexy" => Ok(Self::RleXy),
            "smart" => Ok(Self::Smart),
            "stream-rlexy" => Ok(Self::StreamRleXy),
            _ => Err(EngineError::UnknownStrategy {
                name: s.to_owned(),
            }),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Covers every `label` cell of the parent view with cuboids, appending
/// to `out` in the strategy's deterministic order.
///
/// [`Strategy::StreamRleXy`] has no per-parent form; when asked for one it
/// falls back to [`Strategy::RleXy`], which shares its merge semantics.
pub fn cover(strategy: Strategy, view: &ParentView<'_>, label: LabelId, out: &mut Vec<Cuboid>) {
    match strategy {
        Strategy::Default => default::cover(view, label, out),
        Strategy::Greedy => greedy::cover(view, label, out),
        Strategy::MaxRect => maxrect::cover(view, label, out),
        Strategy::RleXy | Strategy::StreamRleXy => rlexy::cover(view, label, out),
        Strategy::Smart => smart::cover(view, label, out),
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use model::{ChunkGrid, GridDims, LabelId, LabelTable};

    /// Builds a chunk from slice rows of tag bytes, plus the matching
    /// label table (tags assigned ids in first-seen order).
    pub fn chunk_from_rows(dims: &GridDims, z0: u32, slices: &[&[&str]]) -> (ChunkGrid, LabelTable) {
        assert_eq!(slices.len(), dims.parent_z() as usize);
        let mut table = LabelTable::new();
        let mut chunk = ChunkGrid::new(dims);
        chunk.reset(z0);
        for (lz, rows) in slices.iter().enumerate() {
            assert_eq!(rows.len(), dims.y() as usize);
            for (y, row) in rows.iter().enumerate() {
                assert_eq!(row.len(), dims.x() as usize);
                for (x, tag) in row.bytes().enumerate() {
                    let id = table.insert(tag, &char::from(tag).to_string()).unwrap();
                    chunk.set(x as u32, y as u32, lz as u32, id);
                }
            }
        }
        (chunk, table)
    }

    pub fn label(table: &LabelTable, tag: u8) -> LabelId {
        table.id_of(tag).unwrap()
    }
}
