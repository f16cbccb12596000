//! Cover invariant checking.

use model::{Cuboid, LabelId, ParentView};

use crate::error::{EngineError, EngineResult};
use crate::Strategy;

/// Checks a cover batch against the parent view it was produced from:
/// every cuboid in-bounds and uniform, interiors disjoint, and total
/// volume equal to the matching-cell count.
///
/// Release pipelines skip this; debug builds run it after every batch so
/// a misbehaving strategy fails loudly at the parent where it broke.
///
/// # Errors
///
/// [`EngineError::InvariantViolation`] naming the strategy and the first
/// violated invariant.
pub fn verify_cover(
    strategy: Strategy,
    view: &ParentView<'_>,
    label: LabelId,
    cuboids: &[Cuboid],
) -> EngineResult<()> {
    let name = strategy.as_str();
    let (ox, oy, oz) = (view.origin_x(), view.origin_y(), view.origin_z());
    let (sx, sy, sz) = (view.size_x(), view.size_y(), view.size_z());

    let mut covered = vec![0u8; (sx as usize) * (sy as usize) * (sz as usize)];
    let mut painted: u64 = 0;

    for c in cuboids {
        if c.label != label {
            return Err(violation(
                name,
                format!("cuboid {c:?} carries a foreign label (expected {label:?})"),
            ));
        }
        if c.dx == 0 || c.dy == 0 || c.dz == 0 {
            return Err(violation(name, format!("cuboid {c:?} has a zero extent")));
        }
        let inside = c.x >= ox
            && c.y >= oy
            && c.z >= oz
            && c.x + c.dx <= ox + sx
            && c.y + c.dy <= oy + sy
            && c.z + c.dz <= oz + sz;
        if !inside {
            return Err(violation(
                name,
                format!("cuboid {c:?} leaves the parent block at ({ox}, {oy}, {oz})"),
            ));
        }

        for z in c.z - oz..c.z - oz + c.dz {
            for y in c.y - oy..c.y - oy + c.dy {
                for x in c.x - ox..c.x - ox + c.dx {
                    if view.get(x, y, z) != label {
                        return Err(violation(
                            name,
                            format!(
                                "cuboid {c:?} covers a non-matching cell at ({}, {}, {})",
                                ox + x,
                                oy + y,
                                oz + z
                            ),
                        ));
                    }
                    let slot = &mut covered
                        [(z as usize * sy as usize + y as usize) * sx as usize + x as usize];
                    if *slot != 0 {
                        return Err(violation(
                            name,
                            format!(
                                "cuboids overlap at ({}, {}, {})",
                                ox + x,
                                oy + y,
                                oz + z
                            ),
                        ));
                    }
                    *slot = 1;
                    painted += 1;
                }
            }
        }
    }

    let expected = view.count_label(label);
    if painted != expected {
        return Err(violation(
            name,
            format!("covered {painted} cells, parent holds {expected}"),
        ));
    }
    Ok(())
}

fn violation(strategy: &'static str, detail: String) -> EngineError {
    EngineError::InvariantViolation { strategy, detail }
}
