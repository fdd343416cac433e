//! Shared types for the circuitspace voxel signal simulator.
//!
//! # Invariants
//! - `Block::powered()` is always derived from `power_level`; it is never stored.
//! - Every power level produced by these types is clamped to `0..=MAX_POWER`.

mod block;
mod layer;
mod types;

pub use block::{
    Block, BlockKind, BlockState, ComparatorMode, ComparatorState, RepeaterState, clamp_power,
};
pub use layer::{Layer, LayerCell};
pub use types::{CoordError, Direction, VoxelPos};

/// Edge length of the cubic world, in voxels.
pub const WORLD_SIZE: i32 = 16;

/// Total number of cells in the world cube.
pub const CELL_COUNT: usize = (WORLD_SIZE * WORLD_SIZE * WORLD_SIZE) as usize;

/// Strongest signal a block can carry.
pub const MAX_POWER: u8 = 15;
