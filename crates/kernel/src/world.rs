use std::panic::{self, AssertUnwindSafe};

use circuitspace_common::{
    Block, BlockKind, BlockState, Direction, Layer, LayerCell, MAX_POWER, VoxelPos, WORLD_SIZE,
    clamp_power,
};

use crate::grid::VoxelGrid;

/// Observer callback. Receives a copy of every block after each mutation.
pub type Listener = Box<dyn FnMut(&[Block])>;

/// Handle returned by [`World::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Optional overrides for [`World::set`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaceOptions {
    /// Explicit level; wins over the `powered` flag. Clamped to `0..=15`.
    pub power_level: Option<i32>,
    pub orientation: Option<Direction>,
    /// Normalized against the placed kind; a mismatched variant is replaced
    /// by the kind's default.
    pub state: Option<BlockState>,
}

impl PlaceOptions {
    pub fn level(level: i32) -> Self {
        Self {
            power_level: Some(level),
            ..Self::default()
        }
    }

    pub fn facing(orientation: Direction) -> Self {
        Self {
            orientation: Some(orientation),
            ..Self::default()
        }
    }

    pub fn with_state(mut self, state: BlockState) -> Self {
        self.state = Some(state);
        self
    }
}

/// The authoritative voxel world.
///
/// Owns all block storage. Every read hands out a copy; every mutation is
/// followed by a synchronous notification to subscribers. Coordinates outside
/// the world are ignored on write and read as air.
pub struct World {
    grid: VoxelGrid,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("blocks", &self.grid.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl World {
    /// Create an empty world with no subscribers.
    pub fn new() -> Self {
        Self {
            grid: VoxelGrid::new(),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Create a world pre-populated with `blocks` (same filtering as `replace_all`).
    pub fn from_blocks(blocks: impl IntoIterator<Item = Block>) -> Self {
        Self {
            grid: VoxelGrid::from_blocks(blocks),
            ..Self::new()
        }
    }

    /// Number of non-air blocks.
    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Place, overwrite, or erase a single cell.
    ///
    /// `kind == Air` erases; erasing an empty cell changes nothing and does
    /// not notify. Otherwise the level is `options.power_level` if
    /// given, else 15/0 from `powered`, clamped either way.
    pub fn set(&mut self, pos: VoxelPos, kind: BlockKind, powered: bool, options: PlaceOptions) {
        if !pos.in_bounds() {
            tracing::trace!(%pos, %kind, "ignoring write outside the world");
            return;
        }
        if kind == BlockKind::Air {
            if self.grid.remove(pos).is_none() {
                return;
            }
        } else {
            let level = options
                .power_level
                .map(clamp_power)
                .unwrap_or(if powered { MAX_POWER } else { 0 });
            let mut block = Block::new(pos, kind).with_power(level as i32);
            if let Some(orientation) = options.orientation {
                block = block.with_orientation(orientation);
            }
            if let Some(state) = options.state {
                block = block.with_state(state);
            }
            self.grid.insert(block);
        }
        self.notify();
    }

    /// Shorthand for placing an unpowered block with default options.
    pub fn place(&mut self, pos: VoxelPos, kind: BlockKind) {
        self.set(pos, kind, false, PlaceOptions::default());
    }

    /// Copy of the block at `pos`, or `None` for air and out-of-bounds.
    pub fn get(&self, pos: VoxelPos) -> Option<Block> {
        self.grid.get(pos).copied()
    }

    /// Copy of every stored block, in canonical order.
    pub fn get_all(&self) -> Vec<Block> {
        self.grid.to_vec()
    }

    /// A frozen copy of the storage, suitable as a tick's read-only view.
    pub fn snapshot(&self) -> VoxelGrid {
        self.grid.clone()
    }

    /// Atomically replace the entire world.
    ///
    /// Out-of-bounds and air entries are discarded and levels clamped. Reserved
    /// for the tick orchestrator and full-world loads.
    pub fn replace_all(&mut self, blocks: impl IntoIterator<Item = Block>) {
        self.grid = VoxelGrid::from_blocks(blocks);
        self.notify();
    }

    /// Remove every block.
    pub fn clear(&mut self) {
        self.grid.clear();
        self.notify();
    }

    /// Register an observer. It is called immediately with the current
    /// blocks, then after every mutation until unsubscribed.
    ///
    /// A listener cannot reach the world from inside its callback, so
    /// re-entrant mutation is ruled out by the borrow.
    pub fn subscribe(&mut self, listener: impl FnMut(&[Block]) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        let mut listener: Listener = Box::new(listener);
        let blocks = self.grid.to_vec();
        deliver(id, &mut listener, &blocks);
        self.listeners.push((id, listener));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    /// Project the layer at `y` into a 2D grid. Out-of-range `y` gives an all-air layer.
    pub fn get_slice(&self, y: i32) -> Layer {
        let mut layer = Layer::empty(y);
        for z in 0..WORLD_SIZE {
            for x in 0..WORLD_SIZE {
                if let Some(block) = self.grid.get(VoxelPos::new(x, y, z)) {
                    layer.set(
                        x,
                        z,
                        LayerCell {
                            kind: block.kind,
                            powered: block.powered(),
                        },
                    );
                }
            }
        }
        layer
    }

    /// Write a layer back cell by cell through [`World::set`], so imported
    /// layers behave exactly like interactive edits. Air cells erase.
    pub fn apply_layer(&mut self, layer: &Layer) {
        if !(0..WORLD_SIZE).contains(&layer.y) {
            tracing::trace!(y = layer.y, "ignoring layer outside the world");
            return;
        }
        for (x, z, cell) in layer.cells() {
            let pos = VoxelPos::new(x, layer.y, z);
            let existing = self.grid.get(pos).map(|b| b.kind).unwrap_or_default();
            if cell.kind == BlockKind::Air && existing == BlockKind::Air {
                continue;
            }
            self.set(pos, cell.kind, cell.powered, PlaceOptions::default());
        }
    }

    /// Deterministic FNV-1a hash over the canonical block order.
    pub fn state_hash(&self) -> u64 {
        grid_hash(&self.grid)
    }

    fn notify(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let blocks = self.grid.to_vec();
        for (id, listener) in &mut self.listeners {
            deliver(*id, listener, &blocks);
        }
    }
}

/// Call one listener, containing any panic so the remaining listeners and the
/// mutation that triggered delivery are unaffected.
fn deliver(id: SubscriptionId, listener: &mut Listener, blocks: &[Block]) {
    if panic::catch_unwind(AssertUnwindSafe(|| listener(blocks))).is_err() {
        tracing::warn!(?id, "world listener panicked; continuing delivery");
    }
}

/// FNV-1a over every stored block in index order.
pub fn grid_hash(grid: &VoxelGrid) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    let mut mix = |bytes: &[u8]| {
        for &b in bytes {
            h ^= b as u64;
            h = h.wrapping_mul(0x0100_0000_01b3);
        }
    };
    for block in grid.iter() {
        let idx = block.pos.index().unwrap_or_default() as u32;
        mix(&idx.to_le_bytes());
        mix(&[block.kind as u8, block.power_level, block.orientation as u8]);
        match block.state {
            BlockState::None => mix(&[0]),
            BlockState::Repeater(r) => mix(&[1, r.delay, r.timer, r.target_powered as u8]),
            BlockState::Comparator(c) => mix(&[2, c.mode as u8]),
        }
    }
    h
}
