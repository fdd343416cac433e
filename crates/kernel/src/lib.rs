//! Simulation kernel: authoritative voxel world, dust power solver,
//! per-kind component evaluation, and deterministic tick stepping.
//!
//! # Invariants
//! - Every stored block satisfies `power_level <= MAX_POWER`; air is never stored.
//! - A tick is a pure function of the pre-tick snapshot (including carried state).
//! - The tick orchestrator is the only caller of the bulk replace path.
//! - Callers only ever receive copies of blocks, never references into storage.

pub mod components;
pub mod config;
pub mod dust;
pub mod grid;
pub mod import;
pub mod metrics;
pub mod simulation;
pub mod world;

pub use components::ComponentOutput;
pub use config::SimConfig;
pub use dust::DustLevels;
pub use grid::{BlockView, VoxelGrid};
pub use import::ImportError;
pub use metrics::{MetricsSample, MetricsSink};
pub use simulation::Simulation;
pub use world::{PlaceOptions, SubscriptionId, World};
