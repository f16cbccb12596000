//! Ensemble of MaxRect, Greedy, and RLE-XY with an adjacency merge.

use model::{Cuboid, LabelId, ParentView};

use crate::{greedy, maxrect, rlexy};

/// The candidate strategies an ensemble compares, in tie-break order.
pub(crate) const CANDIDATES: [crate::Strategy; 3] = [
    crate::Strategy::MaxRect,
    crate::Strategy::Greedy,
    crate::Strategy::RleXy,
];

/// Runs every candidate strategy, keeps the smallest cover, then merges
/// face-adjacent cuboids with identical cross-sections.
pub fn cover(view: &ParentView<'_>, label: LabelId, out: &mut Vec<Cuboid>) {
    let mut results: Vec<Vec<Cuboid>> = Vec::with_capacity(CANDIDATES.len());
    for strategy in CANDIDATES {
        let mut cuboids = Vec::new();
        match strategy {
            crate::Strategy::MaxRect => maxrect::cover(view, label, &mut cuboids),
            crate::Strategy::Greedy => greedy::cover(view, label, &mut cuboids),
            _ => rlexy::cover(view, label, &mut cuboids),
        }
        results.push(cuboids);
    }
    let winner = pick_best(results);
    let merged = merge_adjacent(winner, view.size_x(), view.size_y(), view.size_z());
    out.extend(merged);
}

/// The first result with the minimum cuboid count, honoring candidate
/// order for ties.
pub(crate) fn pick_best(results: Vec<Vec<Cuboid>>) -> Vec<Cuboid> {
    let mut best: Option<Vec<Cuboid>> = None;
    for result in results {
        match &best {
            Some(current) if result.len() >= current.len() => {}
            _ => best = Some(result),
        }
    }
    best.unwrap_or_default()
}

/// Greedily merges pairs of cuboids sharing a full face with identical
/// label and cross-section, without crossing parent boundaries.
///
/// Merged-away cuboids are tracked in a separate consumed set; their
/// dimensions are never mutated as markers.
#[must_use]
pub fn merge_adjacent(mut blocks: Vec<Cuboid>, px: u32, py: u32, pz: u32) -> Vec<Cuboid> {
    blocks.sort_by_key(|c| (c.z, c.y, c.x));
    let mut consumed = vec![false; blocks.len()];

    let mut changed = true;
    while changed {
        changed = false;
        for i in 0..blocks.len() {
            if consumed[i] {
                continue;
            }
            for j in (i + 1)..blocks.len() {
                if consumed[j] {
                    continue;
                }
                if let Some(merged) = try_merge(&blocks[i], &blocks[j], px, py, pz) {
                    blocks[i] = merged;
                    consumed[j] = true;
                    changed = true;
                }
            }
        }
    }

    blocks
        .into_iter()
        .zip(consumed)
        .filter(|&(_, eaten)| !eaten)
        .map(|(block, _)| block)
        .collect()
}

/// Merges `a` and `b` when they share a face with identical
/// cross-section, in either direction along one axis.
fn try_merge(a: &Cuboid, b: &Cuboid, px: u32, py: u32, pz: u32) -> Option<Cuboid> {
    if a.label != b.label {
        return None;
    }

    let same_yz = a.y == b.y && a.dy == b.dy && a.z == b.z && a.dz == b.dz;
    let same_xz = a.x == b.x && a.dx == b.dx && a.z == b.z && a.dz == b.dz;
    let same_xy = a.x == b.x && a.dx == b.dx && a.y == b.y && a.dy == b.dy;

    let merged = if same_yz && a.x + a.dx == b.x {
        Cuboid { dx: a.dx + b.dx, ..*a }
    } else if same_yz && b.x + b.dx == a.x {
        Cuboid { x: b.x, dx: a.dx + b.dx, ..*a }
    } else if same_xz && a.y + a.dy == b.y {
        Cuboid { dy: a.dy + b.dy, ..*a }
    } else if same_xz && b.y + b.dy == a.y {
        Cuboid { y: b.y, dy: a.dy + b.dy, ..*a }
    } else if same_xy && a.z + a.dz == b.z {
        Cuboid { dz: a.dz + b.dz, ..*a }
    } else if same_xy && b.z + b.dz == a.z {
        Cuboid { z: b.z, dz: a.dz + b.dz, ..*a }
    } else {
        return None;
    };

    let within = merged.x / px == (merged.x + merged.dx - 1) / px
        && merged.y / py == (merged.y + merged.dy - 1) / py
        && merged.z / pz == (merged.z + merged.dz - 1) / pz;
    within.then_some(merged)
}
