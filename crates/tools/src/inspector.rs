use std::collections::BTreeMap;

use circuitspace_common::{Block, BlockKind, BlockState, Direction, VoxelPos, WORLD_SIZE};
use circuitspace_kernel::{Simulation, World};

/// World inspector for developer tooling.
///
/// Provides read-only queries against the world state for debugging,
/// profiling, and development UI.
pub struct WorldInspector;

impl WorldInspector {
    /// Produce a summary of the simulation state.
    pub fn summary(sim: &Simulation) -> WorldSummary {
        let world = sim.world();
        let blocks = world.get_all();
        WorldSummary {
            tick: sim.tick(),
            block_count: blocks.len(),
            powered_count: blocks.iter().filter(|b| b.powered()).count(),
            subscribers: world.subscriber_count(),
            state_hash: world.state_hash(),
        }
    }

    /// Describe the block at `pos`, if any.
    pub fn inspect_block(world: &World, pos: VoxelPos) -> Option<BlockInfo> {
        world.get(pos).map(BlockInfo::from)
    }

    /// Count blocks by kind, in kind order.
    pub fn kind_counts(world: &World) -> BTreeMap<BlockKind, usize> {
        let mut counts = BTreeMap::new();
        for block in world.get_all() {
            *counts.entry(block.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Render the layer at `y` as text, one row per `z`, two characters per
    /// cell: the kind glyph, then the level as a hex digit or `.` when unpowered.
    pub fn render_layer(world: &World, y: i32) -> String {
        let mut out = String::new();
        for z in 0..WORLD_SIZE {
            for x in 0..WORLD_SIZE {
                match world.get(VoxelPos::new(x, y, z)) {
                    Some(block) => {
                        out.push(block.kind.glyph());
                        out.push(level_char(block.power_level));
                    }
                    None => out.push_str(". "),
                }
            }
            // Trailing spaces from air cells are noise in diffs.
            let trimmed = out.trim_end_matches(' ').len();
            out.truncate(trimmed);
            out.push('\n');
        }
        out
    }
}

fn level_char(level: u8) -> char {
    if level == 0 {
        '.'
    } else {
        char::from_digit(level as u32, 16).unwrap_or('?')
    }
}

/// Summary of world state for the inspector.
#[derive(Debug, Clone)]
pub struct WorldSummary {
    pub tick: u64,
    pub block_count: usize,
    pub powered_count: usize,
    pub subscribers: usize,
    pub state_hash: u64,
}

impl std::fmt::Display for WorldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "World: tick={} blocks={} powered={} subscribers={} hash={:#018x}",
            self.tick, self.block_count, self.powered_count, self.subscribers, self.state_hash
        )
    }
}

/// Detailed info about a single block.
#[derive(Debug, Clone)]
pub struct BlockInfo {
    pub pos: VoxelPos,
    pub kind: BlockKind,
    pub power_level: u8,
    pub orientation: Option<Direction>,
    pub state: BlockState,
}

impl From<Block> for BlockInfo {
    fn from(block: Block) -> Self {
        Self {
            pos: block.pos,
            kind: block.kind,
            power_level: block.power_level,
            orientation: block.kind.is_directional().then_some(block.orientation),
            state: block.state,
        }
    }
}

impl std::fmt::Display for BlockInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {} level={}", self.kind, self.pos, self.power_level)?;
        if let Some(orientation) = self.orientation {
            write!(f, " facing={orientation:?}")?;
        }
        match self.state {
            BlockState::None => Ok(()),
            BlockState::Repeater(r) => write!(
                f,
                " delay={} timer={} target={}",
                r.delay, r.timer, r.target_powered
            ),
            BlockState::Comparator(c) => write!(f, " mode={:?}", c.mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use circuitspace_kernel::PlaceOptions;

    #[test]
    fn summary_empty_world() {
        let sim = Simulation::default();
        let summary = WorldInspector::summary(&sim);
        assert_eq!(summary.tick, 0);
        assert_eq!(summary.block_count, 0);
    }

    #[test]
    fn summary_after_step() {
        let mut world = World::new();
        world.set(VoxelPos::new(0, 0, 0), BlockKind::Source, true, PlaceOptions::default());
        world.place(VoxelPos::new(1, 0, 0), BlockKind::Wire);
        world.place(VoxelPos::new(9, 9, 9), BlockKind::Wire);
        let mut sim = Simulation::new(world);
        sim.step();

        let summary = WorldInspector::summary(&sim);
        assert_eq!(summary.tick, 1);
        assert_eq!(summary.block_count, 3);
        assert_eq!(summary.powered_count, 2);
        assert!(format!("{summary}").contains("tick=1"));
    }

    #[test]
    fn inspect_block_found() {
        let mut world = World::new();
        world.set(
            VoxelPos::new(2, 3, 4),
            BlockKind::Repeater,
            false,
            PlaceOptions::facing(Direction::West),
        );
        let info = WorldInspector::inspect_block(&world, VoxelPos::new(2, 3, 4)).unwrap();
        assert_eq!(info.kind, BlockKind::Repeater);
        assert_eq!(info.orientation, Some(Direction::West));
        let text = info.to_string();
        assert!(text.contains("repeater at (2, 3, 4)"));
        assert!(text.contains("delay=1"));
    }

    #[test]
    fn inspect_block_not_found() {
        let world = World::new();
        assert!(WorldInspector::inspect_block(&world, VoxelPos::new(1, 1, 1)).is_none());
        assert!(WorldInspector::inspect_block(&world, VoxelPos::new(-1, 1, 1)).is_none());
    }

    #[test]
    fn non_directional_blocks_hide_orientation() {
        let mut world = World::new();
        world.place(VoxelPos::new(0, 0, 0), BlockKind::GateAnd);
        let info = WorldInspector::inspect_block(&world, VoxelPos::new(0, 0, 0)).unwrap();
        assert!(info.orientation.is_none());
    }

    #[test]
    fn kind_counts_groups_blocks() {
        let mut world = World::new();
        world.place(VoxelPos::new(0, 0, 0), BlockKind::Wire);
        world.place(VoxelPos::new(1, 0, 0), BlockKind::Wire);
        world.place(VoxelPos::new(2, 0, 0), BlockKind::Torch);
        let counts = WorldInspector::kind_counts(&world);
        assert_eq!(counts[&BlockKind::Wire], 2);
        assert_eq!(counts[&BlockKind::Torch], 1);
        assert!(!counts.contains_key(&BlockKind::Source));
    }

    #[test]
    fn render_layer_shows_glyphs_and_levels() {
        let mut world = World::new();
        world.set(VoxelPos::new(0, 1, 0), BlockKind::Source, true, PlaceOptions::default());
        world.set(VoxelPos::new(1, 1, 0), BlockKind::Wire, false, PlaceOptions::level(14));
        world.place(VoxelPos::new(0, 1, 1), BlockKind::GateNot);
        let text = WorldInspector::render_layer(&world, 1);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 16);
        assert!(lines[0].starts_with("Sf-e. . "));
        assert!(lines[1].starts_with("!.. "));
        assert_eq!(lines[2], ". ".repeat(16).trim_end());
        assert!(lines.iter().all(|l| l.len() == 31));
    }
}
