//! Per-kind component evaluation.
//!
//! [`tick`] is pure: it reads the block and a frozen [`BlockView`] and returns
//! the block's next level and carried state. Dispatch is an exhaustive match,
//! so a new `BlockKind` does not compile until it has a rule here.

use circuitspace_common::{
    Block, BlockKind, BlockState, ComparatorMode, Direction, MAX_POWER, RepeaterState,
};

use crate::grid::BlockView;

/// Result of evaluating one component for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentOutput {
    pub power_level: u8,
    pub state: BlockState,
}

impl ComponentOutput {
    pub fn new(power_level: u8, state: BlockState) -> Self {
        Self {
            power_level: power_level.min(MAX_POWER),
            state,
        }
    }

    /// Full strength when `on`, otherwise zero.
    pub fn binary(on: bool, state: BlockState) -> Self {
        Self::new(if on { MAX_POWER } else { 0 }, state)
    }

    pub fn powered(&self) -> bool {
        self.power_level > 0
    }

    /// Apply this output to a copy of `block`.
    pub fn apply(self, block: &Block) -> Block {
        Block {
            power_level: self.power_level,
            state: self.state,
            ..*block
        }
    }
}

/// Evaluate `block` against `view`.
///
/// Wires are normally driven by the dust solver; the rule here is the
/// adjacency fallback used when a component is evaluated without a solve.
pub fn tick<V: BlockView + ?Sized>(block: &Block, view: &V) -> ComponentOutput {
    let state = block.state;
    let lit_neighbors = || view.powered_neighbor_count(block.pos);
    match block.kind {
        BlockKind::Air => ComponentOutput::binary(false, BlockState::None),
        BlockKind::Source => ComponentOutput::new(block.power_level, state),
        BlockKind::Wire | BlockKind::GateOr | BlockKind::Output => {
            ComponentOutput::binary(lit_neighbors() >= 1, state)
        }
        BlockKind::GateAnd => ComponentOutput::binary(lit_neighbors() >= 2, state),
        BlockKind::GateNot => ComponentOutput::binary(lit_neighbors() == 0, state),
        BlockKind::Torch => {
            let below = block.pos.offset(Direction::Down);
            ComponentOutput::binary(!view.is_powered(below), state)
        }
        BlockKind::Repeater => tick_repeater(block, view),
        BlockKind::Comparator => tick_comparator(block, view),
    }
}

/// Edge-detecting delay line.
///
/// An input edge latches the new target and restarts the timer at `delay`;
/// otherwise a running timer counts down. The output adopts the target only
/// once the timer reads zero and holds its previous value until then.
fn tick_repeater<V: BlockView + ?Sized>(block: &Block, view: &V) -> ComponentOutput {
    let mut latch = block.state.repeater().copied().unwrap_or_default();
    let input = view.is_powered(block.behind());

    if input != latch.target_powered {
        latch.target_powered = input;
        latch.timer = latch.delay.max(RepeaterState::MIN_DELAY);
    } else if latch.timer > 0 {
        latch.timer -= 1;
    }

    let on = if latch.timer == 0 {
        latch.target_powered
    } else {
        block.powered()
    };
    ComponentOutput::binary(on, BlockState::Repeater(latch))
}

fn tick_comparator<V: BlockView + ?Sized>(block: &Block, view: &V) -> ComponentOutput {
    let mode = block.state.comparator().map(|c| c.mode).unwrap_or_default();
    let primary = view.power_at(block.behind());
    let side = block
        .orientation
        .sides()
        .into_iter()
        .map(|d| view.power_at(block.pos.offset(d)))
        .max()
        .unwrap_or(0);

    let level = match mode {
        ComparatorMode::Compare if primary > 0 && primary >= side => primary,
        ComparatorMode::Compare => 0,
        ComparatorMode::Subtract => primary.saturating_sub(side),
    };
    ComponentOutput::new(level, block.state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::VoxelGrid;
    use circuitspace_common::{ComparatorState, VoxelPos};

    const CENTER: VoxelPos = VoxelPos::new(8, 8, 8);

    fn powered_at(pos: VoxelPos, level: i32) -> Block {
        Block::new(pos, BlockKind::Source).with_power(level)
    }

    fn eval(block: Block, mut others: Vec<Block>) -> ComponentOutput {
        others.push(block);
        let grid = VoxelGrid::from_blocks(others);
        tick(&block, &grid)
    }

    fn with_powered_neighbors(kind: BlockKind, count: usize) -> ComponentOutput {
        let neighbors = CENTER
            .neighbors()
            .into_iter()
            .take(count)
            .map(|n| powered_at(n, 15))
            .collect();
        eval(Block::new(CENTER, kind), neighbors)
    }

    #[test]
    fn source_emits_configured_level() {
        let out = eval(Block::new(CENTER, BlockKind::Source).with_power(9), vec![]);
        assert_eq!(out.power_level, 9);
    }

    #[test]
    fn and_gate_needs_two_inputs() {
        assert!(!with_powered_neighbors(BlockKind::GateAnd, 1).powered());
        assert!(with_powered_neighbors(BlockKind::GateAnd, 2).powered());
        assert_eq!(with_powered_neighbors(BlockKind::GateAnd, 6).power_level, 15);
    }

    #[test]
    fn or_gate_needs_one_input() {
        assert!(!with_powered_neighbors(BlockKind::GateOr, 0).powered());
        assert!(with_powered_neighbors(BlockKind::GateOr, 1).powered());
    }

    #[test]
    fn not_gate_inverts_adjacency() {
        assert_eq!(with_powered_neighbors(BlockKind::GateNot, 0).power_level, 15);
        assert!(!with_powered_neighbors(BlockKind::GateNot, 1).powered());
        assert!(!with_powered_neighbors(BlockKind::GateNot, 3).powered());
    }

    #[test]
    fn output_mirrors_any_neighbor() {
        assert!(!with_powered_neighbors(BlockKind::Output, 0).powered());
        assert!(with_powered_neighbors(BlockKind::Output, 1).powered());
    }

    #[test]
    fn wire_fallback_is_adjacency_only() {
        assert_eq!(with_powered_neighbors(BlockKind::Wire, 1).power_level, 15);
        assert_eq!(with_powered_neighbors(BlockKind::Wire, 0).power_level, 0);
    }

    #[test]
    fn unpowered_neighbors_do_not_count() {
        let neighbors = CENTER
            .neighbors()
            .into_iter()
            .map(|n| Block::new(n, BlockKind::Wire))
            .collect();
        assert!(!eval(Block::new(CENTER, BlockKind::GateOr), neighbors).powered());
    }

    #[test]
    fn torch_reads_only_the_cell_below() {
        let below = CENTER.offset(Direction::Down);
        let above = CENTER.offset(Direction::Up);
        let torch = Block::new(CENTER, BlockKind::Torch).with_orientation(Direction::East);
        assert!(eval(torch, vec![]).powered());
        assert!(eval(torch, vec![powered_at(above, 15)]).powered());
        assert!(!eval(torch, vec![powered_at(below, 15)]).powered());
    }

    #[test]
    fn torch_at_floor_is_lit() {
        let torch = Block::new(VoxelPos::new(0, 0, 0), BlockKind::Torch);
        assert!(eval(torch, vec![]).powered());
    }

    #[test]
    fn tick_does_not_mutate_input() {
        let block = Block::new(CENTER, BlockKind::Repeater).with_orientation(Direction::East);
        let grid = VoxelGrid::from_blocks([block, powered_at(block.behind(), 15)]);
        let before = block;
        let _ = tick(&block, &grid);
        assert_eq!(block, before);
    }

    fn comparator(mode: ComparatorMode, primary: i32, side: i32) -> u8 {
        let block = Block::new(CENTER, BlockKind::Comparator)
            .with_orientation(Direction::North)
            .with_state(BlockState::Comparator(ComparatorState { mode }));
        let [left, right] = Direction::North.sides();
        let others = vec![
            powered_at(block.behind(), primary),
            powered_at(CENTER.offset(left), side),
            powered_at(CENTER.offset(right), side / 2),
        ];
        eval(block, others).power_level
    }

    #[test]
    fn comparator_compare_mode() {
        assert_eq!(comparator(ComparatorMode::Compare, 10, 6), 10);
        assert_eq!(comparator(ComparatorMode::Compare, 5, 6), 0);
        assert_eq!(comparator(ComparatorMode::Compare, 6, 6), 6);
        assert_eq!(comparator(ComparatorMode::Compare, 0, 0), 0);
    }

    #[test]
    fn comparator_subtract_mode() {
        assert_eq!(comparator(ComparatorMode::Subtract, 10, 6), 4);
        assert_eq!(comparator(ComparatorMode::Subtract, 5, 8), 0);
        assert_eq!(comparator(ComparatorMode::Subtract, 15, 0), 15);
    }

    #[test]
    fn comparator_ignores_the_cell_in_front() {
        let block = Block::new(CENTER, BlockKind::Comparator).with_orientation(Direction::East);
        let front = CENTER.offset(Direction::East);
        let others = vec![powered_at(block.behind(), 7), powered_at(front, 15)];
        assert_eq!(eval(block, others).power_level, 7);
    }

    fn repeater(delay: u8) -> Block {
        Block::new(CENTER, BlockKind::Repeater)
            .with_orientation(Direction::East)
            .with_state(BlockState::Repeater(RepeaterState {
                delay,
                timer: 0,
                target_powered: false,
            }))
    }

    /// Step a lone repeater against a fixed input level, carrying its output
    /// and state forward like the orchestrator does.
    fn run_repeater(mut block: Block, inputs: &[bool]) -> Vec<bool> {
        inputs
            .iter()
            .map(|&on| {
                let input = powered_at(block.behind(), if on { 15 } else { 0 });
                let grid = VoxelGrid::from_blocks([block, input]);
                block = tick(&block, &grid).apply(&block);
                block.powered()
            })
            .collect()
    }

    #[test]
    fn repeater_delays_rising_edge() {
        let out = run_repeater(repeater(2), &[false, true, true, true, true]);
        assert_eq!(out, vec![false, false, false, true, true]);
    }

    #[test]
    fn repeater_delays_falling_edge() {
        let out = run_repeater(repeater(1), &[true, true, true, false, false, false]);
        assert_eq!(out, vec![false, true, true, true, false, false]);
    }

    #[test]
    fn repeater_restarts_timer_on_new_edge() {
        let out = run_repeater(repeater(3), &[true, false, false, false, false]);
        // The rising edge never settles; the output stays low throughout.
        assert_eq!(out, vec![false, false, false, false, false]);
    }

    #[test]
    fn repeater_output_is_binary() {
        let block = repeater(1);
        let grid = VoxelGrid::from_blocks([block, powered_at(block.behind(), 3)]);
        let next = tick(&block, &grid).apply(&block);
        let grid = VoxelGrid::from_blocks([next, powered_at(block.behind(), 3)]);
        assert_eq!(tick(&next, &grid).power_level, 15);
    }
}
