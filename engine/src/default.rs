//! One cuboid per cell; the reference oracle.

use model::{Cuboid, LabelId, ParentView};

/// Emits a `1x1x1` cuboid for every matching cell, scanning `z`, then
/// `y`, then `x`.
pub fn cover(view: &ParentView<'_>, label: LabelId, out: &mut Vec<Cuboid>) {
    let (ox, oy, oz) = (view.origin_x(), view.origin_y(), view.origin_z());
    for lz in 0..view.size_z() {
        for ly in 0..view.size_y() {
            for lx in 0..view.size_x() {
                if view.get(lx, ly, lz) == label {
                    out.push(Cuboid::unit(ox + lx, oy + ly, oz + lz, label));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{chunk_from_rows, label};
    use model::GridDims;

    #[test]
    fn one_cuboid_per_cell() {
        let dims = GridDims::finite(2, 2, 1, 2, 2, 1).unwrap();
        let (chunk, table) = chunk_from_rows(&dims, 0, &[&["ab", "ba"]]);
        let view = ParentView::new(&chunk, &dims, 0, 0);

        let mut out = Vec::new();
        cover(&view, label(&table, b'a'), &mut out);
        assert_eq!(
            out,
            vec![
                Cuboid::unit(0, 0, 0, label(&table, b'a')),
                Cuboid::unit(1, 1, 0, label(&table, b'a')),
            ]
        );
    }

    #[test]
    fn scan_order_is_z_y_x() {
        let dims = GridDims::finite(2, 1, 2, 2, 1, 2).unwrap();
        let (chunk, table) = chunk_from_rows(&dims, 0, &[&["aa"], &["aa"]]);
        let view = ParentView::new(&chunk, &dims, 0, 0);

        let mut out = Vec::new();
        cover(&view, label(&table, b'a'), &mut out);
        let coords: Vec<(u32, u32, u32)> = out.iter().map(|c| (c.x, c.y, c.z)).collect();
        assert_eq!(coords, vec![(0, 0, 0), (1, 0, 0), (0, 0, 1), (1, 0, 1)]);
    }

    #[test]
    fn respects_view_origin() {
        let dims = GridDims::finite(4, 2, 1, 2, 2, 1).unwrap();
        let (chunk, table) = chunk_from_rows(&dims, 0, &[&["bbaa", "bbaa"]]);
        let view = ParentView::new(&chunk, &dims, 1, 0);

        let mut out = Vec::new();
        cover(&view, label(&table, b'a'), &mut out);
        assert_eq!(out.len(), 4);
        assert!(out.iter().all(|c| c.x >= 2));
    }

    #[test]
    fn no_matching_cells() {
        let dims = GridDims::finite(2, 1, 1, 2, 1, 1).unwrap();
        let (chunk, _table) = chunk_from_rows(&dims, 0, &[&["aa"]]);
        let view = ParentView::new(&chunk, &dims, 0, 0);

        let mut out = Vec::new();
        cover(&view, model::LabelId::new(99), &mut out);
        assert!(out.is_empty());
    }
}
