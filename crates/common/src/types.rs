use glam::IVec3;
use serde::{Deserialize, Serialize};

use crate::WORLD_SIZE;

/// Errors from checked coordinate conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CoordError {
    #[error("coordinate ({x}, {y}, {z}) is outside the {size}^3 world")]
    OutOfBounds { x: i32, y: i32, z: i32, size: i32 },
}

/// Integer voxel coordinate.
///
/// Components are signed so that speculative probes (a neighbor of an edge
/// cell, a repeater pointing off the map) can be expressed; whether the
/// position is inside the world is a separate question answered by
/// [`VoxelPos::in_bounds`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct VoxelPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl VoxelPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// True if every component lies in `0..WORLD_SIZE`.
    #[inline]
    pub const fn in_bounds(self) -> bool {
        self.x >= 0
            && self.x < WORLD_SIZE
            && self.y >= 0
            && self.y < WORLD_SIZE
            && self.z >= 0
            && self.z < WORLD_SIZE
    }

    /// Dense array index `x + y*W + z*W*W`, or `None` when out of bounds.
    #[inline]
    pub const fn index(self) -> Option<usize> {
        if !self.in_bounds() {
            return None;
        }
        Some((self.x + self.y * WORLD_SIZE + self.z * WORLD_SIZE * WORLD_SIZE) as usize)
    }

    /// Inverse of [`VoxelPos::index`].
    #[inline]
    pub const fn from_index(index: usize) -> Self {
        let w = WORLD_SIZE as usize;
        Self {
            x: (index % w) as i32,
            y: ((index / w) % w) as i32,
            z: (index / (w * w)) as i32,
        }
    }

    /// The adjacent position across the given face.
    #[inline]
    pub fn offset(self, dir: Direction) -> Self {
        // Saturates so neighbors of positions at the i32 extremes stay out of bounds.
        Self::from(self.to_ivec3().saturating_add(dir.vector()))
    }

    /// The six face neighbors in [`Direction::ALL`] order. May be out of bounds.
    pub fn neighbors(self) -> [VoxelPos; 6] {
        Direction::ALL.map(|d| self.offset(d))
    }

    pub fn to_ivec3(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }
}

impl From<IVec3> for VoxelPos {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl TryFrom<IVec3> for VoxelPos {
    type Error = CoordError;

    /// Checked construction that rejects positions outside the world.
    fn try_from(v: IVec3) -> Result<Self, Self::Error> {
        let pos = Self::from(v);
        if pos.in_bounds() {
            Ok(pos)
        } else {
            Err(CoordError::OutOfBounds {
                x: v.x,
                y: v.y,
                z: v.z,
                size: WORLD_SIZE,
            })
        }
    }
}

impl TryFrom<(i32, i32, i32)> for VoxelPos {
    type Error = CoordError;

    fn try_from((x, y, z): (i32, i32, i32)) -> Result<Self, Self::Error> {
        Self::try_from(IVec3::new(x, y, z))
    }
}

impl std::fmt::Display for VoxelPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// One of the six cube faces. Used as the facing of directional blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    West,
    East,
    Down,
    Up,
    South,
    #[default]
    North,
}

impl Direction {
    /// Canonical neighbor order: -X, +X, -Y, +Y, -Z, +Z.
    pub const ALL: [Direction; 6] = [
        Direction::West,
        Direction::East,
        Direction::Down,
        Direction::Up,
        Direction::South,
        Direction::North,
    ];

    /// Unit vector pointing across this face.
    pub const fn vector(self) -> IVec3 {
        match self {
            Direction::West => IVec3::new(-1, 0, 0),
            Direction::East => IVec3::new(1, 0, 0),
            Direction::Down => IVec3::new(0, -1, 0),
            Direction::Up => IVec3::new(0, 1, 0),
            Direction::South => IVec3::new(0, 0, -1),
            Direction::North => IVec3::new(0, 0, 1),
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Direction::West => Direction::East,
            Direction::East => Direction::West,
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
            Direction::South => Direction::North,
            Direction::North => Direction::South,
        }
    }

    /// The two side faces a comparator samples when facing this way.
    ///
    /// Horizontal facings use the horizontal perpendiculars; vertical facings
    /// fall back to the X axis.
    pub const fn sides(self) -> [Direction; 2] {
        match self {
            Direction::North | Direction::South => [Direction::West, Direction::East],
            Direction::East | Direction::West => [Direction::South, Direction::North],
            Direction::Up | Direction::Down => [Direction::West, Direction::East],
        }
    }

    pub const fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }
}
