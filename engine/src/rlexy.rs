//! Greedy semantics with a linear two-pointer row merge.

use model::{Cuboid, LabelId, ParentView};

#[derive(Debug, Clone, Copy)]
struct Group {
    x0: u32,
    x1: u32,
    start_y: u32,
    height: u32,
}

/// Covers the label with `dz = 1` rectangles, walking runs directly off
/// the cells and merging rows with a two-pointer sweep.
///
/// Both `prev` and the current runs are sorted by `x0` with disjoint
/// intervals by construction, so each row merges in linear time. On a
/// partial overlap the previous group closes and the run is retried
/// against the next group.
pub fn cover(view: &ParentView<'_>, label: LabelId, out: &mut Vec<Cuboid>) {
    let w = view.size_x();
    let h = view.size_y();
    let mut prev: Vec<Group> = Vec::new();
    let mut next: Vec<Group> = Vec::new();
    let mut runs: Vec<(u32, u32)> = Vec::with_capacity(w as usize);

    for lz in 0..view.size_z() {
        prev.clear();
        for ly in 0..h {
            runs.clear();
            let mut x = 0;
            while x < w {
                while x < w && view.get(x, ly, lz) != label {
                    x += 1;
                }
                if x == w {
                    break;
                }
                let x0 = x;
                while x < w && view.get(x, ly, lz) == label {
                    x += 1;
                }
                runs.push((x0, x));
            }

            next.clear();
            let mut i = 0;
            let mut j = 0;
            while i < prev.len() && j < runs.len() {
                let pg = prev[i];
                let (rx0, rx1) = runs[j];
                if pg.x1 <= rx0 {
                    emit(view, lz, &pg, label, out);
                    i += 1;
                } else if rx1 <= pg.x0 {
                    next.push(Group {
                        x0: rx0,
                        x1: rx1,
                        start_y: ly,
                        height: 1,
                    });
                    j += 1;
                } else if pg.x0 == rx0 && pg.x1 == rx1 {
                    next.push(Group {
                        height: pg.height + 1,
                        ..pg
                    });
                    i += 1;
                    j += 1;
                } else {
                    emit(view, lz, &pg, label, out);
                    i += 1;
                }
            }
            while i < prev.len() {
                emit(view, lz, &prev[i], label, out);
                i += 1;
            }
            while j < runs.len() {
                let (rx0, rx1) = runs[j];
                next.push(Group {
                    x0: rx0,
                    x1: rx1,
                    start_y: ly,
                    height: 1,
                });
                j += 1;
            }
            std::mem::swap(&mut prev, &mut next);
        }
        for g in &prev {
            emit(view, lz, g, label, out);
        }
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
