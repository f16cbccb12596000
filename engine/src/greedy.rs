//! Row-run extraction with vertical merging, one slice at a time.

use model::{Cuboid, LabelId, ParentView};

#[derive(Debug, Clone, Copy)]
struct Group {
    x0: u32,
    x1: u32,
    start_y: u32,
    height: u32,
}

/// Covers the label with `dz = 1` rectangles: maximal horizontal runs per
/// row, extended downward while the run interval repeats exactly.
///
/// A run extends the first active group with an identical `[x0, x1)`;
/// groups not extended by any run of the current row are emitted.
pub fn cover(view: &ParentView<'_>, label: LabelId, out: &mut Vec<Cuboid>) {
    let w = view.size_x();
    let h = view.size_y();
    let mut mask = vec![false; (w as usize) * (h as usize)];
    let mut active: Vec<Group> = Vec::new();
    let mut next: Vec<Group> = Vec::new();
    let mut runs: Vec<(u32, u32)> = Vec::new();

    for lz in 0..view.size_z() {
        build_mask(view, label, lz, &mut mask);
        active.clear();

        for ly in 0..h {
            let row = &mask[(ly as usize) * (w as usize)..][..w as usize];
            find_runs(row, &mut runs);

            next.clear();
            for &(x0, x1) in &runs {
                match active.iter().position(|g| g.x0 == x0 && g.x1 == x1) {
                    Some(pos) => {
                        let g = active.remove(pos);
                        next.push(Group {
                            height: g.height + 1,
                            ..g
                        });
                    }
                    None => next.push(Group {
                        x0,
                        x1,
                        start_y: ly,
                        height: 1,
                    }),
                }
            }
            // Whatever was not extended closes at this row.
            for g in active.drain(..) {
                emit(view, lz, &g, label, out);
            }
            std::mem::swap(&mut active, &mut next);
        }

        for g in active.drain(..) {
            emit(view, lz, &g, label, out);
        }
    }
}

fn build_mask(view: &ParentView<'_>, label: LabelId, lz: u32, mask: &mut [bool]) {
    let w = view.size_x() as usize;
    for ly in 0..view.size_y() {
        for lx in 0..view.size_x() {
            mask[(ly as usize) * w + lx as usize] = view.get(lx, ly, lz) == label;
        }
    }
}

/// Maximal `[x0, x1)` intervals of set bits, in scan order.
fn find_runs(row: &[bool], runs: &mut Vec<(u32, u32)>) {
    runs.clear();
    let mut x = 0;
    while x < row.len() {
        while x < row.len() && !row[x] {
            x += 1;
        }
        if x == row.len() {
            break;
        }
        let start = x;
        while x < row.len() && row[x] {
            x += 1;
        }
        runs.push((start as u32, x as u32));
    }
}

fn emit(view: &ParentView<'_>, lz: u32, g: &Group, label: LabelId, out: &mut Vec<Cuboid>) {
    out.push(Cuboid::new(
        view.origin_x() + g.x0,
        view.origin_y() + g.start_y,
        view.origin_z() + lz,
        g.x1 - g.x0,
        g.height,
        1,
        label,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{chunk_from_rows, label};
    use model::GridDims;

    #[test]
    fn merges_identical_runs_vertically() {
        let dims = GridDims::finite(4, 3, 1, 4, 3, 1).unwrap();
        let (chunk, table) = chunk_from_rows(&dims, 0, &[&["aabb", "aabb", "aabb"]]);
        let view = ParentView::new(&chunk, &dims, 0, 0);

        let mut out = Vec::new();
        cover(&view, label(&table, b'a'), &mut out);
        assert_eq!(out, vec![Cuboid::new(0, 0, 0, 2, 3, 1, label(&table, b'a'))]);

        out.clear();
        cover(&view, label(&table, b'b'), &mut out);
        assert_eq!(out, vec![Cuboid::new(2, 0, 0, 2, 3, 1, label(&table, b'b'))]);
    }

    #[test]
    fn shifted_run_closes_group() {
        let dims = GridDims::finite(4, 2, 1, 4, 2, 1).unwrap();
        let (chunk, table) = chunk_from_rows(&dims, 0, &[&["aabb", "baab"]]);
        let view = ParentView::new(&chunk, &dims, 0, 0);

        let mut out = Vec::new();
        cover(&view, label(&table, b'a'), &mut out);
        assert_eq!(
            out,
            vec![
                Cuboid::new(0, 0, 0, 2, 1, 1, label(&table, b'a')),
                Cuboid::new(1, 1, 0, 2, 1, 1, label(&table, b'a')),
            ]
        );
    }

    #[test]
    fn multiple_runs_per_row() {
        let dims = GridDims::finite(5, 2, 1, 5, 2, 1).unwrap();
        let (chunk, table) = chunk_from_rows(&dims, 0, &[&["ababa", "ababa"]]);
        let view = ParentView::new(&chunk, &dims, 0, 0);

        let mut out = Vec::new();
        cover(&view, label(&table, b'a'), &mut out);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|c| c.dy == 2 && c.dx == 1));
    }

    #[test]
    fn slices_are_independent() {
        let dims = GridDims::finite(2, 1, 2, 2, 1, 2).unwrap();
        let (chunk, table) = chunk_from_rows(&dims, 0, &[&["aa"], &["aa"]]);
        let view = ParentView::new(&chunk, &dims, 0, 0);

        let mut out = Vec::new();
        cover(&view, label(&table, b'a'), &mut out);
        // dz stays 1; one rectangle per slice.
        assert_eq!(
            out,
            vec![
                Cuboid::new(0, 0, 0, 2, 1, 1, label(&table, b'a')),
                Cuboid::new(0, 0, 1, 2, 1, 1, label(&table, b'a')),
            ]
        );
    }

    #[test]
    fn hole_splits_runs() {
        let dims = GridDims::finite(3, 3, 1, 3, 3, 1).unwrap();
        let (chunk, table) = chunk_from_rows(&dims, 0, &[&["aaa", "aba", "aaa"]]);
        let view = ParentView::new(&chunk, &dims, 0, 0);

        let mut out = Vec::new();
        cover(&view, label(&table, b'a'), &mut out);
        let volume: u64 = out.iter().map(Cuboid::volume).sum();
        assert_eq!(volume, 8);
        // Top row closes when the hole appears, sides extend, bottom reopens.
        assert_eq!(out.len(), 4);
    }
}
