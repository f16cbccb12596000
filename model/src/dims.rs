//! Grid and parent-block dimensions.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Depth values above this are treated as the unbounded-stream sentinel.
pub const DEPTH_SENTINEL_MAX: i64 = 100_000_000;

/// Validated grid dimensions and parent-block tiling.
///
/// `x` and `y` are always finite and divisible by their parent extents.
/// `depth` is `None` for an unbounded slice stream; when finite it is
/// divisible by `parent_z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDims {
    x: u32,
    y: u32,
    depth: Option<u32>,
    parent_x: u32,
    parent_y: u32,
    parent_z: u32,
}

impl GridDims {
    /// Creates dimensions from raw header values.
    ///
    /// A raw depth of zero, a negative depth, or a depth above
    /// [`DEPTH_SENTINEL_MAX`] selects the unbounded stream mode.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NonPositiveExtent`] for non-positive extents
    /// and [`ModelError::ExtentNotDivisible`] for violated divisibility.
    pub fn from_header(raw: [i64; 6]) -> ModelResult<Self> {
        let [x, y, z, px, py, pz] = raw;
        let x = positive("x", x)?;
        let y = positive("y", y)?;
        let parent_x = positive("parent_x", px)?;
        let parent_y = positive("parent_y", py)?;
        let parent_z = positive("parent_z", pz)?;

        let depth = if z <= 0 || z > DEPTH_SENTINEL_MAX {
            None
        } else {
            Some(z as u32)
        };

        divisible("x", x, parent_x)?;
        divisible("y", y, parent_y)?;
        if let Some(depth) = depth {
            divisible("z", depth, parent_z)?;
        }

        Ok(Self {
            x,
            y,
            depth,
            parent_x,
            parent_y,
            parent_z,
        })
    }

    /// Creates finite dimensions directly. Convenience for tests and
    /// generators.
    ///
    /// # Errors
    ///
    /// Same validation as [`GridDims::from_header`].
    pub fn finite(x: u32, y: u32, z: u32, px: u32, py: u32, pz: u32) -> ModelResult<Self> {
        Self::from_header([
            i64::from(x),
            i64::from(y),
            i64::from(z),
            i64::from(px),
            i64::from(py),
            i64::from(pz),
        ])
    }

    /// Grid extent along X.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Grid extent along Y.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Finite depth, or `None` for an unbounded stream.
    #[must_use]
    pub const fn depth(&self) -> Option<u32> {
        self.depth
    }

    /// Parent-block extent along X.
    #[must_use]
    pub const fn parent_x(&self) -> u32 {
        self.parent_x
    }

    /// Parent-block extent along Y.
    #[must_use]
    pub const fn parent_y(&self) -> u32 {
        self.parent_y
    }

    /// Parent-block extent along Z.
    #[must_use]
    pub const fn parent_z(&self) -> u32 {
        self.parent_z
    }

    /// Returns `true` if the depth is unbounded.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.depth.is_none()
    }

    /// Number of parent-X stripes (`x / parent_x`).
    #[must_use]
    pub const fn stripes_x(&self) -> u32 {
        self.x / self.parent_x
    }

    /// Number of parent-Y stripes (`y / parent_y`).
    #[must_use]
    pub const fn stripes_y(&self) -> u32 {
        self.y / self.parent_y
    }

    /// Number of Z chunks for a finite depth, `None` when unbounded.
    #[must_use]
    pub fn chunks_z(&self) -> Option<u32> {
        self.depth.map(|d| d / self.parent_z)
    }

    /// Cells in one full `z` slice.
    #[must_use]
    pub const fn cells_per_slice(&self) -> u64 {
        self.x as u64 * self.y as u64
    }

    /// Cells in one chunk (`parent_z` slices).
    #[must_use]
    pub const fn cells_per_chunk(&self) -> u64 {
        self.cells_per_slice() * self.parent_z as u64
    }
}

fn positive(name: &'static str, value: i64) -> ModelResult<u32> {
    if value <= 0 || value > i64::from(u32::MAX) {
        return Err(ModelError::NonPositiveExtent { name, value });
    }
    Ok(value as u32)
}

fn divisible(name: &'static str, extent: u32, parent: u32) -> ModelResult<()> {
    if extent % parent != 0 {
        return Err(ModelError::ExtentNotDivisible {
            name,
            extent,
            parent,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_dims() {
        let dims = GridDims::finite(8, 6, 4, 4, 3, 2).unwrap();
        assert_eq!(dims.x(), 8);
        assert_eq!(dims.y(), 6);
        assert_eq!(dims.depth(), Some(4));
        assert_eq!(dims.stripes_x(), 2);
        assert_eq!(dims.stripes_y(), 2);
        assert_eq!(dims.chunks_z(), Some(2));
        assert!(!dims.is_unbounded());
        assert_eq!(dims.cells_per_slice(), 48);
        assert_eq!(dims.cells_per_chunk(), 96);
    }

    #[test]
    fn zero_depth_is_unbounded() {
        let dims = GridDims::from_header([4, 4, 0, 2, 2, 2]).unwrap();
        assert!(dims.is_unbounded());
        assert_eq!(dims.chunks_z(), None);
    }

    #[test]
    fn huge_depth_is_unbounded() {
        let dims = GridDims::from_header([4, 4, DEPTH_SENTINEL_MAX + 1, 2, 2, 2]).unwrap();
        assert!(dims.is_unbounded());
    }

    #[test]
    fn negative_depth_is_unbounded() {
        let dims = GridDims::from_header([4, 4, -1, 2, 2, 2]).unwrap();
        assert!(dims.is_unbounded());
    }

    #[test]
    fn sentinel_boundary_is_finite() {
        // Exactly at the threshold stays finite (and must divide).
        let dims = GridDims::from_header([4, 4, 100_000_000, 2, 2, 2]).unwrap();
        assert_eq!(dims.depth(), Some(100_000_000));
    }

    #[test]
    fn rejects_zero_x() {
        let err = GridDims::from_header([0, 4, 4, 2, 2, 2]).unwrap_err();
        assert!(matches!(
            err,
            ModelError::NonPositiveExtent { name: "x", value: 0 }
        ));
    }

    #[test]
    fn rejects_zero_parent() {
        let err = GridDims::from_header([4, 4, 4, 2, 0, 2]).unwrap_err();
        assert!(matches!(
            err,
            ModelError::NonPositiveExtent {
                name: "parent_y",
                ..
            }
        ));
    }

    #[test]
    fn rejects_indivisible_x() {
        let err = GridDims::from_header([5, 4, 4, 2, 2, 2]).unwrap_err();
        assert!(matches!(
            err,
            ModelError::ExtentNotDivisible { name: "x", .. }
        ));
    }

    #[test]
    fn rejects_indivisible_finite_depth() {
        let err = GridDims::from_header([4, 4, 5, 2, 2, 2]).unwrap_err();
        assert!(matches!(
            err,
            ModelError::ExtentNotDivisible { name: "z", .. }
        ));
    }

    #[test]
    fn unbounded_depth_skips_z_divisibility() {
        // Depth 0 never checks Z divisibility.
        let dims = GridDims::from_header([4, 4, 0, 2, 2, 3]).unwrap();
        assert!(dims.is_unbounded());
        assert_eq!(dims.parent_z(), 3);
    }
}
