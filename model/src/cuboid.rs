//! The emitted cuboid record.

use serde::{Deserialize, Serialize};

use crate::{GridDims, LabelId};

/// An axis-aligned uniform-label box covering
/// `[x, x+dx) x [y, y+dy) x [z, z+dz)`.
///
/// All extents are at least 1 and the box never crosses a parent-block
/// boundary on any axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cuboid {
    pub x: u32,
    pub y: u32,
    pub z: u32,
    pub dx: u32,
    pub dy: u32,
    pub dz: u32,
    pub label: LabelId,
}

impl Cuboid {
    /// Creates a cuboid.
    #[must_use]
    pub const fn new(x: u32, y: u32, z: u32, dx: u32, dy: u32, dz: u32, label: LabelId) -> Self {
        Self {
            x,
            y,
            z,
            dx,
            dy,
            dz,
            label,
        }
    }

    /// Creates a unit cuboid at a cell.
    #[must_use]
    pub const fn unit(x: u32, y: u32, z: u32, label: LabelId) -> Self {
        Self::new(x, y, z, 1, 1, 1, label)
    }

    /// Number of cells covered.
    #[must_use]
    pub const fn volume(&self) -> u64 {
        self.dx as u64 * self.dy as u64 * self.dz as u64
    }

    /// Returns `true` if the cell lies inside this cuboid.
    #[must_use]
    pub const fn contains(&self, x: u32, y: u32, z: u32) -> bool {
        x >= self.x
            && x < self.x + self.dx
            && y >= self.y
            && y < self.y + self.dy
            && z >= self.z
            && z < self.z + self.dz
    }

    /// Returns `true` if the cuboid stays within one parent block on every
    /// axis of `dims`.
    #[must_use]
    pub fn within_one_parent(&self, dims: &GridDims) -> bool {
        self.dx >= 1
            && self.dy >= 1
            && self.dz >= 1
            && self.x / dims.parent_x() == (self.x + self.dx - 1) / dims.parent_x()
            && self.y / dims.parent_y() == (self.y + self.dy - 1) / dims.parent_y()
            && self.z / dims.parent_z() == (self.z + self.dz - 1) / dims.parent_z()
    }
}
