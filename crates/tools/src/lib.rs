//! Developer tooling: world inspector, text layer rendering, metrics history.
//!
//! # Invariants
//! - Tools only read through the kernel's public, copy-returning surface.

mod inspector;
mod recorder;

pub use inspector::{BlockInfo, WorldInspector, WorldSummary};
pub use recorder::MetricsRecorder;
