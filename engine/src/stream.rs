//! Row-streaming RLE-XY over all labels in one pass.

use model::{Cuboid, GridDims, LabelId, LabelTable};

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy)]
struct Run {
    x0: u32,
    x1: u32,
    label: LabelId,
}

#[derive(Debug, Clone, Copy)]
struct Group {
    x0: u32,
    x1: u32,
    start_y: u32,
    height: u32,
    label: LabelId,
}

/// Streaming carry-merge state: one `active` group list and one
/// `current` run list per parent-X stripe.
///
/// Rows arrive in `(z, y)` order; each row's runs are sliced at every
/// `parent_x` boundary before the per-stripe two-pointer merge. Groups
/// flush at the end of every parent-Y stripe, so emitted cuboids
/// (`dz = 1`) never cross a parent boundary. State is `O(x)` per stripe;
/// no slice or chunk is ever materialized, which is what lets this
/// strategy run on unbounded depths.
#[derive(Debug)]
pub struct StreamRleXy {
    dims: GridDims,
    active: Vec<Vec<Group>>,
    next: Vec<Vec<Group>>,
    runs: Vec<Vec<Run>>,
}

impl StreamRleXy {
    /// Creates streaming state for a grid.
    #[must_use]
    pub fn new(dims: &GridDims) -> Self {
        let stripes = dims.stripes_x() as usize;
        Self {
            dims: *dims,
            active: vec![Vec::new(); stripes],
            next: vec![Vec::new(); stripes],
            runs: vec![Vec::new(); stripes],
        }
    }

    /// Consumes one row of tag bytes at `(z, y)`, appending any cuboids
    /// that close at this row.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownTag`] when the row contains a byte absent
    /// from the label table.
    pub fn on_row(
        &mut self,
        z: u32,
        y: u32,
        row: &[u8],
        labels: &LabelTable,
        out: &mut Vec<Cuboid>,
    ) -> EngineResult<()> {
        debug_assert_eq!(row.len(), self.dims.x() as usize);
        self.build_runs(z, y, row, labels)?;
        self.merge_row(z, y, out);
        if y % self.dims.parent_y() == self.dims.parent_y() - 1 {
            self.flush_stripes(z, out);
        }
        Ok(())
    }

    /// Flushes any groups still active at the end of slice `z`.
    ///
    /// A no-op after the stripe flush of the slice's last row; kept as a
    /// defensive barrier so no group can survive into the next slice.
    pub fn on_slice_end(&mut self, z: u32, out: &mut Vec<Cuboid>) {
        self.flush_stripes(z, out);
    }

    /// Splits the row into maximal same-tag runs, sliced at parent-X
    /// boundaries into per-stripe lists.
    fn build_runs(&mut self, z: u32, y: u32, row: &[u8], labels: &LabelTable) -> EngineResult<()> {
        for runs in &mut self.runs {
            runs.clear();
        }

        let px = self.dims.parent_x();
        let width = self.dims.x();
        let mut x = 0u32;
        while x < width {
            let tag = row[x as usize];
            let Some(label) = labels.id_of(tag) else {
                return Err(EngineError::UnknownTag { tag, x, y, z });
            };
            let x0 = x;
            x += 1;
            while x < width && row[x as usize] == tag {
                x += 1;
            }

            // Slice [x0, x) at every parent-X boundary.
            let mut s = x0;
            while s < x {
                let stripe = s / px;
                let boundary = (stripe + 1) * px;
                let end = x.min(boundary);
                self.runs[stripe as usize].push(Run {
                    x0: s,
                    x1: end,
                    label,
                });
                s = end;
            }
        }
        Ok(())
    }

    /// Two-pointer carry-merge of each stripe's active groups against the
    /// current row's runs.
    fn merge_row(&mut self, z: u32, y: u32, out: &mut Vec<Cuboid>) {
        for stripe in 0..self.active.len() {
            let prev = &mut self.active[stripe];
            let next = &mut self.next[stripe];
            let runs = &self.runs[stripe];
            next.clear();

            let mut i = 0;
            let mut j = 0;
            while i < prev.len() && j < runs.len() {
                let pg = prev[i];
                let cr = runs[j];
                if pg.x1 <= cr.x0 {
                    out.push(to_cuboid(z, &pg));
                    i += 1;
                } else if cr.x1 <= pg.x0 {
                    next.push(Group {
                        x0: cr.x0,
                        x1: cr.x1,
                        start_y: y,
                        height: 1,
                        label: cr.label,
                    });
                    j += 1;
                } else if pg.label == cr.label && pg.x0 == cr.x0 && pg.x1 == cr.x1 {
                    next.push(Group {
                        height: pg.height + 1,
                        ..pg
                    });
                    i += 1;
                    j += 1;
                } else {
                    // Overlap without an exact match: the group closes and
                    // the run is retried against the next group or tail.
                    out.push(to_cuboid(z, &pg));
                    i += 1;
                }
            }
            while i < prev.len() {
                out.push(to_cuboid(z, &prev[i]));
                i += 1;
            }
            while j < runs.len() {
                let cr = runs[j];
                next.push(Group {
                    x0: cr.x0,
                    x1: cr.x1,
                    start_y: y,
                    height: 1,
                    label: cr.label,
                });
                j += 1;
            }
            std::mem::swap(prev, next);
        }
    }

    fn flush_stripes(&mut self, z: u32, out: &mut Vec<Cuboid>) {
        for stripe in &mut self.active {
            for g in stripe.drain(..) {
                out.push(to_cuboid(z, &g));
            }
        }
    }
}

fn to_cuboid(z: u32, g: &Group) -> Cuboid {
    Cuboid::new(g.x0, g.start_y, z, g.x1 - g.x0, g.height, 1, g.label)
}
