//! Parallel fan-out of the Smart ensemble candidates.

use std::thread;

use model::{Cuboid, LabelId, ParentView};

use crate::smart::{self, CANDIDATES};

/// Runs the Smart ensemble with its candidates fanned out over scoped
/// threads, bounded by `pool_size` (0 = one thread per candidate).
///
/// Every candidate is a pure function of `(view, label)`: it holds no
/// shared mutable state and only reads the borrowed chunk, so the
/// threads need no ordering among themselves. The reduction (and any
/// writing) happens on the calling thread, and the borrow on `view`
/// keeps the tiler parked until the scope ends.
///
/// Output is byte-identical to [`Strategy::Smart`](crate::Strategy::Smart)
/// run sequentially.
pub fn cover_ensemble(
    view: &ParentView<'_>,
    label: LabelId,
    pool_size: usize,
    out: &mut Vec<Cuboid>,
) {
    let pool = if pool_size == 0 {
        CANDIDATES.len()
    } else {
        pool_size.min(CANDIDATES.len())
    };

    let mut results: Vec<Vec<Cuboid>> = Vec::with_capacity(CANDIDATES.len());
    for wave in CANDIDATES.chunks(pool) {
        let mut wave_results: Vec<Vec<Cuboid>> = Vec::with_capacity(wave.len());
        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(wave.len());
            for &strategy in wave {
                handles.push(scope.spawn(move || {
                    let mut cuboids = Vec::new();
                    crate::cover(strategy, view, label, &mut cuboids);
                    cuboids
                }));
            }
            for handle in handles {
                match handle.join() {
                    Ok(cuboids) => wave_results.push(cuboids),
                    Err(payload) => std::panic::resume_unwind(payload),
                }
            }
        });
        results.append(&mut wave_results);
    }

    let winner = smart::pick_best(results);
    let merged = smart::merge_adjacent(winner, view.size_x(), view.size_y(), view.size_z());
    out.extend(merged);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{chunk_from_rows, label};
    use crate::Strategy;
    use model::GridDims;

    fn sample_view() -> (model::ChunkGrid, model::LabelTable, GridDims) {
        let dims = GridDims::finite(4, 4, 2, 4, 4, 2).unwrap();
        let (chunk, table) = chunk_from_rows(
            &dims,
            0,
            &[
                &["aabb", "aabb", "bbaa", "bbaa"],
                &["aabb", "aabb", "aabb", "aabb"],
            ],
        );
        (chunk, table, dims)
    }

    #[test]
    fn matches_sequential_smart() {
        let (chunk, table, dims) = sample_view();
        let view = ParentView::new(&chunk, &dims, 0, 0);

        for tag in [b'a', b'b'] {
            let id = label(&table, tag);
            let mut sequential = Vec::new();
            crate::cover(Strategy::Smart, &view, id, &mut sequential);

            for pool_size in [0, 1, 2, 8] {
                let mut parallel = Vec::new();
                cover_ensemble(&view, id, pool_size, &mut parallel);
                assert_eq!(parallel, sequential, "pool_size={pool_size}");
            }
        }
    }

    #[test]
    fn empty_label_produces_empty_cover() {
        let (chunk, _table, dims) = sample_view();
        let view = ParentView::new(&chunk, &dims, 0, 0);
        let mut out = Vec::new();
        cover_ensemble(&view, model::LabelId::new(42), 0, &mut out);
        assert!(out.is_empty());
    }
}
