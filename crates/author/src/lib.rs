//! In-world authoring: block placement, palette cycling, undo/redo.
//!
//! # Invariants
//! - All authoring ops are reversible.
//! - Every edit goes through `World::set`, so subscribers see it like any
//!   other interactive write.

mod editor;

pub use editor::{EditCommand, EditError, Editor};
