//! Shared fixtures for engine integration tests.
#![allow(dead_code)]

use model::{ChunkGrid, GridDims, LabelId, LabelTable, ParentView};

/// Builds a chunk at `z0` from slice rows of tag bytes, assigning label
/// ids in first-seen order.
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

/// Every parent view of a single-chunk grid, in `(ny, nx)` order.
pub fn all_views<'a>(chunk: &'a ChunkGrid, dims: &GridDims) -> Vec<ParentView<'a>> {
    let mut views = Vec::new();
    for ny in 0..dims.stripes_y() {
        for nx in 0..dims.stripes_x() {
            views.push(ParentView::new(chunk, dims, nx, ny));
        }
    }
    views
}
