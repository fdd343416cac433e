use circuitspace_common::{Block, BlockKind, VoxelPos};
use circuitspace_kernel::{PlaceOptions, World};

/// A single-cell edit that can be applied to the world and reversed.
///
/// `None` on either side means air.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditCommand {
    pub pos: VoxelPos,
    pub old: Option<Block>,
    pub new: Option<Block>,
}

impl EditCommand {
    /// Produce the inverse command (for undo).
    pub fn inverse(&self) -> Self {
        Self {
            pos: self.pos,
            old: self.new,
            new: self.old,
        }
    }
}

/// Errors from edit operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("{0} is outside the world")]
    OutOfBounds(VoxelPos),
    #[error("no block at {0}")]
    Empty(VoxelPos),
}

/// Editor with undo/redo support for block authoring.
///
/// Tracks every edit in undo/redo stacks; the world itself holds no history.
pub struct Editor {
    undo_stack: Vec<EditCommand>,
    redo_stack: Vec<EditCommand>,
}

impl Editor {
    /// Create a new editor.
    pub fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Place a block (or air) and push to the undo stack.
    pub fn place(
        &mut self,
        world: &mut World,
        pos: VoxelPos,
        kind: BlockKind,
        powered: bool,
        options: PlaceOptions,
    ) -> Result<(), EditError> {
        if !pos.in_bounds() {
            return Err(EditError::OutOfBounds(pos));
        }
        let old = world.get(pos);
        world.set(pos, kind, powered, options);
        self.record(EditCommand {
            pos,
            old,
            new: world.get(pos),
        });
        Ok(())
    }

    /// Erase the block at `pos`.
    pub fn erase(&mut self, world: &mut World, pos: VoxelPos) -> Result<Block, EditError> {
        let old = self.existing(world, pos)?;
        world.set(pos, BlockKind::Air, false, PlaceOptions::default());
        self.record(EditCommand {
            pos,
            old: Some(old),
            new: None,
        });
        Ok(old)
    }

    /// Replace the cell with the next kind in the palette cycle, keeping its
    /// orientation. Returns the new kind.
    pub fn cycle(&mut self, world: &mut World, pos: VoxelPos) -> Result<BlockKind, EditError> {
        if !pos.in_bounds() {
            return Err(EditError::OutOfBounds(pos));
        }
        let old = world.get(pos);
        let kind = old.map(|b| b.kind).unwrap_or_default().next_in_cycle();
        let options = PlaceOptions {
            orientation: old.map(|b| b.orientation),
            ..PlaceOptions::default()
        };
        self.place(world, pos, kind, kind == BlockKind::Source, options)?;
        Ok(kind)
    }

    /// Flip a block between fully powered and unpowered, e.g. a source switch.
    pub fn toggle_power(&mut self, world: &mut World, pos: VoxelPos) -> Result<bool, EditError> {
        let old = self.existing(world, pos)?;
        let powered = !old.powered();
        let options = PlaceOptions {
            power_level: None,
            ..restore_options(&old)
        };
        world.set(pos, old.kind, powered, options);
        self.record(EditCommand {
            pos,
            old: Some(old),
            new: world.get(pos),
        });
        Ok(powered)
    }

    /// Undo the last edit. Returns true if an operation was undone.
    pub fn undo(&mut self, world: &mut World) -> bool {
        let Some(cmd) = self.undo_stack.pop() else {
            return false;
        };
        apply_command(world, &cmd.inverse());
        self.redo_stack.push(cmd);
        true
    }

    /// Redo the last undone edit. Returns true if an operation was redone.
    pub fn redo(&mut self, world: &mut World) -> bool {
        let Some(cmd) = self.redo_stack.pop() else {
            return false;
        };
        apply_command(world, &cmd);
        self.undo_stack.push(cmd);
        true
    }

    /// Number of operations on the undo stack.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of operations on the redo stack.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn existing(&self, world: &World, pos: VoxelPos) -> Result<Block, EditError> {
        if !pos.in_bounds() {
            return Err(EditError::OutOfBounds(pos));
        }
        world.get(pos).ok_or(EditError::Empty(pos))
    }

    fn record(&mut self, cmd: EditCommand) {
        tracing::debug!(pos = %cmd.pos, "edit recorded");
        self.undo_stack.push(cmd);
        self.redo_stack.clear();
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

/// Options that reproduce `block` exactly when passed to `World::set`.
fn restore_options(block: &Block) -> PlaceOptions {
    PlaceOptions {
        power_level: Some(block.power_level as i32),
        orientation: Some(block.orientation),
        state: Some(block.state),
    }
}

fn apply_command(world: &mut World, cmd: &EditCommand) {
    match cmd.new {
        Some(block) => world.set(cmd.pos, block.kind, block.powered(), restore_options(&block)),
        None => world.set(cmd.pos, BlockKind::Air, false, PlaceOptions::default()),
    }
}
