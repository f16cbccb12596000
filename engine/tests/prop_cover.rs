//! Property tests: random grids, every strategy, full invariant checks.

mod common;

use common::{all_views, chunk_from_rows};
use engine::{cover, verify_cover, Strategy as Grouping, StreamRleXy};
use model::{Cuboid, GridDims, LabelId, LabelTable};
use proptest::prelude::*;

const TAGS: &[u8] = b"abc";

#[derive(Clone, Debug)]
struct GridCase {
    dims: GridDims,
    /// Row strings per slice, tag bytes drawn from `TAGS`.
    slices: Vec<Vec<String>>,
}

fn grid_case() -> impl Strategy<Value = GridCase> {
    // Parent extents 1..=3, 1..=2 parents per axis.
    let axes = (1u32..=3, 1u32..=2, 1u32..=3, 1u32..=2, 1u32..=2, 1u32..=2);
    axes.prop_flat_map(|(px, nx, py, ny, pz, nz)| {
        let x = px * nx;
        let y = py * ny;
        let z = pz * nz;
        let dims = GridDims::finite(x, y, z, px, py, pz).unwrap();
        let row = prop::collection::vec(prop::sample::select(TAGS.to_vec()), x as usize)
            .prop_map(|bytes| String::from_utf8(bytes).unwrap());
        let slice = prop::collection::vec(row, y as usize);
        prop::collection::vec(slice, z as usize).prop_map(move |slices| GridCase { dims, slices })
    })
}

fn build(case: &GridCase) -> Vec<(model::ChunkGrid, LabelTable)> {
    // One chunk per parent-Z slab.
    let dims = &case.dims;
    let mut table_rows: Vec<Vec<&str>> = Vec::new();
    for slice in &case.slices {
        table_rows.push(slice.iter().map(String::as_str).collect());
    }

    let chunks_z = dims.chunks_z().unwrap();
    let mut chunks = Vec::new();
    for nz in 0..chunks_z {
        let start = (nz * dims.parent_z()) as usize;
        let end = start + dims.parent_z() as usize;
        let slab: Vec<&[&str]> = table_rows[start..end]
            .iter()
            .map(Vec::as_slice)
            .collect();
        chunks.push(chunk_from_rows(dims, nz * dims.parent_z(), &slab));
    }
    chunks
}

/// A shared table covering every tag, so ids agree across chunks.
fn full_table() -> LabelTable {
    let mut table = LabelTable::new();
    for &tag in TAGS {
        table.insert(tag, &char::from(tag).to_string()).unwrap();
    }
    table
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn per_parent_strategies_always_verify(case in grid_case()) {
        let chunks = build(&case);
        for strategy in [
            Grouping::Default,
            Grouping::Greedy,
            Grouping::MaxRect,
            Grouping::RleXy,
            Grouping::Smart,
        ] {
            for (chunk, table) in &chunks {
                for view in all_views(chunk, &case.dims) {
                    for id in table.ids() {
                        let mut out = Vec::new();
                        cover(strategy, &view, id, &mut out);
                        verify_cover(strategy, &view, id, &out).unwrap();
                    }
                }
            }
        }
    }

    #[test]
    fn streaming_covers_whole_grid(case in grid_case()) {
        let dims = &case.dims;
        let table = full_table();
        let mut stream = StreamRleXy::new(dims);
        let mut out = Vec::new();
        for (z, slice) in case.slices.iter().enumerate() {
            for (y, row) in slice.iter().enumerate() {
                stream.on_row(z as u32, y as u32, row.as_bytes(), &table, &mut out).unwrap();
            }
            stream.on_slice_end(z as u32, &mut out);
        }

        // Repaint and compare cell-for-cell.
        let (x, y) = (dims.x() as usize, dims.y() as usize);
        let z = dims.depth().unwrap() as usize;
        let mut painted: Vec<Option<LabelId>> = vec![None; x * y * z];
        for c in &out {
            prop_assert!(c.within_one_parent(dims), "{c:?}");
            for cz in c.z..c.z + c.dz {
                for cy in c.y..c.y + c.dy {
                    for cx in c.x..c.x + c.dx {
                        let idx = (cz as usize * y + cy as usize) * x + cx as usize;
                        prop_assert!(painted[idx].is_none(), "overlap at ({cx}, {cy}, {cz})");
                        painted[idx] = Some(c.label);
                    }
                }
            }
        }
        for (cz, slice) in case.slices.iter().enumerate() {
            for (cy, row) in slice.iter().enumerate() {
                for (cx, tag) in row.bytes().enumerate() {
                    let idx = (cz * y + cy) * x + cx;
                    let expected = table.id_of(tag).unwrap();
                    prop_assert_eq!(painted[idx], Some(expected));
                }
            }
        }
    }

    #[test]
    fn rlexy_matches_stream_on_single_stripe(case in grid_case()) {
        // Restrict to grids that are exactly one parent wide and tall so
        // the per-parent and streaming variants see identical geometry.
        prop_assume!(case.dims.stripes_x() == 1 && case.dims.stripes_y() == 1);
        prop_assume!(case.dims.chunks_z() == Some(1));

        let dims = &case.dims;
        let chunks = build(&case);
        let (chunk, table) = &chunks[0];

        let mut streamed = Vec::new();
        let mut stream = StreamRleXy::new(dims);
        for (z, slice) in case.slices.iter().enumerate() {
            for (y, row) in slice.iter().enumerate() {
                stream.on_row(z as u32, y as u32, row.as_bytes(), table, &mut streamed).unwrap();
            }
            stream.on_slice_end(z as u32, &mut streamed);
        }

        let mut per_parent = Vec::new();
        for view in all_views(chunk, dims) {
            for id in table.ids() {
                cover(Grouping::RleXy, &view, id, &mut per_parent);
            }
        }

        // Same multiset of cuboids; the passes order labels differently
        // (streaming interleaves labels row by row).
        let mut a: Vec<Cuboid> = streamed;
        let mut b: Vec<Cuboid> = per_parent;
        a.sort_by_key(|c| (c.z, c.y, c.x, c.label));
        b.sort_by_key(|c| (c.z, c.y, c.x, c.label));
        prop_assert_eq!(a, b);
    }

    #[test]
    fn greedy_never_beaten_by_default(case in grid_case()) {
        let chunks = build(&case);
        for (chunk, table) in &chunks {
            for view in all_views(chunk, &case.dims) {
                for id in table.ids() {
                    let mut greedy = Vec::new();
                    cover(Grouping::Greedy, &view, id, &mut greedy);
                    let mut default = Vec::new();
                    cover(Grouping::Default, &view, id, &mut default);
                    prop_assert!(greedy.len() <= default.len());
                }
            }
        }
    }
}
