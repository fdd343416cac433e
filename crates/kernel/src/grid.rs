use circuitspace_common::{Block, BlockKind, CELL_COUNT, VoxelPos};

/// Read-only access to blocks by position.
///
/// This is the only thing a component sees while it is evaluated. Lookups
/// outside the world or on air return `None` and read as unpowered.
pub trait BlockView {
    fn block(&self, pos: VoxelPos) -> Option<&Block>;

    /// The six face neighbors in `Direction::ALL` order.
    fn neighbors6(&self, pos: VoxelPos) -> [Option<&Block>; 6] {
        pos.neighbors().map(|n| self.block(n))
    }

    fn power_at(&self, pos: VoxelPos) -> u8 {
        self.block(pos).map_or(0, |b| b.power_level)
    }

    fn is_powered(&self, pos: VoxelPos) -> bool {
        self.power_at(pos) > 0
    }

    /// How many of the six face neighbors are powered.
    fn powered_neighbor_count(&self, pos: VoxelPos) -> usize {
        self.neighbors6(pos)
            .into_iter()
            .flatten()
            .filter(|b| b.powered())
            .count()
    }
}

/// Dense storage for every cell of the world, `None` meaning air.
///
/// Indexed by `VoxelPos::index`, so iteration order is canonical and does not
/// depend on insertion history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxelGrid {
    cells: Vec<Option<Block>>,
    len: usize,
}

impl Default for VoxelGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl VoxelGrid {
    pub fn new() -> Self {
        Self {
            cells: vec![None; CELL_COUNT],
            len: 0,
        }
    }

    /// Build a grid from arbitrary blocks, dropping out-of-bounds and air
    /// entries and normalizing the rest. Later duplicates win.
    pub fn from_blocks(blocks: impl IntoIterator<Item = Block>) -> Self {
        let mut grid = Self::new();
        for block in blocks.into_iter().filter(|b| b.kind != BlockKind::Air) {
            grid.insert(block);
        }
        grid
    }

    pub fn get(&self, pos: VoxelPos) -> Option<&Block> {
        self.cells.get(pos.index()?)?.as_ref()
    }

    /// Store a normalized copy of `block`. Returns `false` (and stores
    /// nothing) when the block is air or out of bounds.
    pub fn insert(&mut self, block: Block) -> bool {
        let Some(idx) = block.pos.index() else {
            return false;
        };
        if block.kind == BlockKind::Air {
            self.remove(block.pos);
            return false;
        }
        let slot = &mut self.cells[idx];
        if slot.is_none() {
            self.len += 1;
        }
        *slot = Some(block.normalized());
        true
    }

    pub fn remove(&mut self, pos: VoxelPos) -> Option<Block> {
        let removed = self.cells.get_mut(pos.index()?)?.take();
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    pub fn clear(&mut self) {
        self.cells.fill(None);
        self.len = 0;
    }

    /// Occupied cells in canonical index order.
    pub fn iter(&self) -> impl Iterator<Item = &Block> + '_ {
        self.cells.iter().flatten()
    }

    pub fn to_vec(&self) -> Vec<Block> {
        self.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl BlockView for VoxelGrid {
    fn block(&self, pos: VoxelPos) -> Option<&Block> {
        self.get(pos)
    }
}
