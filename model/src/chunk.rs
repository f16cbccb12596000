//! Reusable chunk buffer and borrowed parent-block views.

use crate::{GridDims, LabelId};

/// One Z-chunk of the model: `parent_z` consecutive slices of label ids.
///
/// The buffer is owned by the tiler and reused across chunk loads; parent
/// blocks are read through [`ParentView`]s borrowing it.
#[derive(Debug)]
pub struct ChunkGrid {
    x: u32,
    y: u32,
    slices: u32,
    /// First global slice of this chunk.
    z0: u32,
    cells: Vec<LabelId>,
}

impl ChunkGrid {
    /// Creates a chunk buffer sized for `dims` (one `parent_z` slab).
    #[must_use]
    pub fn new(dims: &GridDims) -> Self {
        let len = dims.cells_per_chunk() as usize;
        Self {
            x: dims.x(),
            y: dims.y(),
            slices: dims.parent_z(),
            z0: 0,
            cells: vec![LabelId::default(); len],
        }
    }

    /// Re-targets the buffer at a new global slice origin, keeping capacity.
    pub fn reset(&mut self, z0: u32) {
        self.z0 = z0;
    }

    /// Global slice index of the chunk's first slice.
    #[must_use]
    pub const fn z0(&self) -> u32 {
        self.z0
    }

    /// Number of slices held (`parent_z`).
    #[must_use]
    pub const fn slices(&self) -> u32 {
        self.slices
    }

    /// Reads the cell at full-grid `(x, y)` and chunk-local slice `lz`.
    #[must_use]
    pub fn get(&self, x: u32, y: u32, lz: u32) -> LabelId {
        self.cells[self.index(x, y, lz)]
    }

    /// Writes the cell at full-grid `(x, y)` and chunk-local slice `lz`.
    pub fn set(&mut self, x: u32, y: u32, lz: u32, label: LabelId) {
        let idx = self.index(x, y, lz);
        self.cells[idx] = label;
    }

    /// Mutable access to one full row, for bulk fills during chunk loads.
    pub fn row_mut(&mut self, y: u32, lz: u32) -> &mut [LabelId] {
        let start = self.index(0, y, lz);
        let x = self.x as usize;
        &mut self.cells[start..start + x]
    }

    fn index(&self, x: u32, y: u32, lz: u32) -> usize {
        debug_assert!(x < self.x && y < self.y && lz < self.slices);
        (lz as usize * self.y as usize + y as usize) * self.x as usize + x as usize
    }
}

/// A borrowed view of one parent block inside a [`ChunkGrid`].
///
/// Cell access is in local coordinates `[0, size_*)`; the view carries the
/// global origin for emitting cuboids. The view is valid only while the
/// chunk it borrows stays loaded, which the borrow checker enforces.
#[derive(Debug, Clone, Copy)]
pub struct ParentView<'a> {
    chunk: &'a ChunkGrid,
    origin_x: u32,
    origin_y: u32,
    size_x: u32,
    size_y: u32,
}

impl<'a> ParentView<'a> {
    /// Creates a view over the parent block at stripe `(nx, ny)` of `chunk`.
    #[must_use]
    pub fn new(chunk: &'a ChunkGrid, dims: &GridDims, nx: u32, ny: u32) -> Self {
        debug_assert!(nx < dims.stripes_x() && ny < dims.stripes_y());
        Self {
            chunk,
            origin_x: nx * dims.parent_x(),
            origin_y: ny * dims.parent_y(),
            size_x: dims.parent_x(),
            size_y: dims.parent_y(),
        }
    }

    /// Global origin along X.
    #[must_use]
    pub const fn origin_x(&self) -> u32 {
        self.origin_x
    }

    /// Global origin along Y.
    #[must_use]
    pub const fn origin_y(&self) -> u32 {
        self.origin_y
    }

    /// Global origin along Z (the chunk's first slice).
    #[must_use]
    pub const fn origin_z(&self) -> u32 {
        self.chunk.z0()
    }

    /// Parent extent along X.
    #[must_use]
    pub const fn size_x(&self) -> u32 {
        self.size_x
    }

    /// Parent extent along Y.
    #[must_use]
    pub const fn size_y(&self) -> u32 {
        self.size_y
    }

    /// Parent extent along Z.
    #[must_use]
    pub const fn size_z(&self) -> u32 {
        self.chunk.slices()
    }

    /// Reads the cell at local `(lx, ly, lz)`.
    #[must_use]
    pub fn get(&self, lx: u32, ly: u32, lz: u32) -> LabelId {
        debug_assert!(lx < self.size_x && ly < self.size_y && lz < self.size_z());
        self.chunk.get(self.origin_x + lx, self.origin_y + ly, lz)
    }

    /// Counts cells carrying `label` in this parent block.
    #[must_use]
    pub fn count_label(&self, label: LabelId) -> u64 {
        let mut count = 0;
        for lz in 0..self.size_z() {
            for ly in 0..self.size_y {
                for lx in 0..self.size_x {
                    if self.get(lx, ly, lz) == label {
                        count += 1;
                    }
                }
            }
        }
        count
    }
}
