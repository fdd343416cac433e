use circuitspace_common::{Block, BlockKind};

use crate::components;
use crate::dust::{self, DustLevels};
use crate::grid::VoxelGrid;
use crate::metrics::{MetricsSample, MetricsSink};
use crate::world::World;

/// Drives discrete ticks over a [`World`].
///
/// Each step reads one snapshot, solves dust, evaluates every other block
/// against a frozen pre-tick view, and commits the result in a single bulk
/// replace. Nothing evaluated in a tick can observe another block's next
/// value, so the result does not depend on evaluation order.
///
/// Stepping is single-threaded and synchronous; hosts serialize calls.
pub struct Simulation {
    world: World,
    tick: u64,
    sinks: Vec<Box<dyn MetricsSink>>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(World::new())
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("world", &self.world)
            .field("tick", &self.tick)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl Simulation {
    pub fn new(world: World) -> Self {
        Self {
            world,
            tick: 0,
            sinks: Vec::new(),
        }
    }

    /// Number of completed steps.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access for edits between ticks.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn into_world(self) -> World {
        self.world
    }

    /// Register a receiver for the sample published after each step.
    pub fn add_sink(&mut self, sink: impl MetricsSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    /// Advance one tick and publish its metrics.
    pub fn step(&mut self) -> MetricsSample {
        let tick = self.tick + 1;
        let _span = tracing::debug_span!("sim_step", tick).entered();

        let prev = self.world.snapshot();
        let next = compute_next(&prev);
        self.world.replace_all(next.iter().copied());
        self.tick = tick;

        let sample = MetricsSample::between(tick, &prev, &self.world.snapshot());
        tracing::debug!(
            blocks = sample.block_count,
            powered = sample.powered_count,
            changed = sample.changed_cells,
            "tick committed"
        );
        for sink in &mut self.sinks {
            sink.record(&sample);
        }
        sample
    }

    /// Step `ticks` times, returning every sample.
    pub fn run(&mut self, ticks: u64) -> Vec<MetricsSample> {
        (0..ticks).map(|_| self.step()).collect()
    }
}

/// Build the frozen view components read from: wires carry their solved
/// levels, everything else is copied unchanged.
pub fn pre_tick_view(current: &VoxelGrid, dust: &DustLevels) -> VoxelGrid {
    let mut view = current.clone();
    for wire in current.iter().filter(|b| b.kind == BlockKind::Wire) {
        let level = dust.get(&wire.pos).copied().unwrap_or(0);
        view.insert(Block {
            power_level: level,
            ..*wire
        });
    }
    view
}

/// The next state of every block, as a pure function of `current`.
pub fn compute_next(current: &VoxelGrid) -> Vec<Block> {
    let dust = dust::solve(current);
    let view = pre_tick_view(current, &dust);
    view.iter()
        .map(|block| match block.kind {
            BlockKind::Wire => *block,
            _ => components::tick(block, &view).apply(block),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::PlaceOptions;
    use circuitspace_common::{BlockState, Direction, RepeaterState, VoxelPos};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn p(x: i32, y: i32, z: i32) -> VoxelPos {
        VoxelPos::new(x, y, z)
    }

    fn source(w: &mut World, pos: VoxelPos) {
        w.set(pos, BlockKind::Source, true, PlaceOptions::default());
    }

    #[test]
    fn step_increments_tick() {
        let mut sim = Simulation::default();
        sim.step();
        sim.step();
        sim.step();
        assert_eq!(sim.tick(), 3);
    }

    #[test]
    fn wires_take_solved_levels() {
        let mut w = World::new();
        source(&mut w, p(0, 0, 0));
        for x in 1..5 {
            w.place(p(x, 0, 0), BlockKind::Wire);
        }
        let mut sim = Simulation::new(w);
        sim.step();
        for x in 1..5 {
            assert_eq!(sim.world().get(p(x, 0, 0)).unwrap().power_level, 15 - x as u8);
        }
    }

    #[test]
    fn power_invariants_hold_after_ticks() {
        let mut w = World::new();
        source(&mut w, p(0, 0, 0));
        w.place(p(1, 0, 0), BlockKind::Wire);
        w.place(p(2, 0, 0), BlockKind::GateNot);
        w.place(p(2, 1, 0), BlockKind::Torch);
        w.place(p(3, 0, 0), BlockKind::Comparator);
        w.place(p(0, 1, 0), BlockKind::Repeater);
        let mut sim = Simulation::new(w);
        for _ in 0..10 {
            sim.step();
            for b in sim.world().get_all() {
                assert!(b.power_level <= 15);
                assert_eq!(b.powered(), b.power_level > 0);
                assert_ne!(b.kind, BlockKind::Air);
            }
        }
    }

    #[test]
    fn components_read_the_pre_tick_view() {
        // Two NOT gates side by side: each sees the other's old value, so
        // they flip together instead of settling on one order's result.
        let mut w = World::new();
        w.place(p(5, 5, 5), BlockKind::GateNot);
        w.place(p(6, 5, 5), BlockKind::GateNot);
        let mut sim = Simulation::new(w);
        sim.step();
        assert!(sim.world().get(p(5, 5, 5)).unwrap().powered());
        assert!(sim.world().get(p(6, 5, 5)).unwrap().powered());
        sim.step();
        assert!(!sim.world().get(p(5, 5, 5)).unwrap().powered());
        assert!(!sim.world().get(p(6, 5, 5)).unwrap().powered());
    }

    #[test]
    fn torch_follows_cell_below_next_tick() {
        let mut w = World::new();
        w.place(p(3, 1, 3), BlockKind::Torch);
        let mut sim = Simulation::new(w);
        sim.step();
        assert!(sim.world().get(p(3, 1, 3)).unwrap().powered());

        source(sim.world_mut(), p(3, 0, 3));
        sim.step();
        assert!(!sim.world().get(p(3, 1, 3)).unwrap().powered());

        sim.world_mut().place(p(3, 0, 3), BlockKind::Air);
        sim.step();
        assert!(sim.world().get(p(3, 1, 3)).unwrap().powered());
    }

    #[test]
    fn repeater_delay_two_through_orchestrator() {
        let mut w = World::new();
        w.set(
            p(5, 0, 5),
            BlockKind::Repeater,
            false,
            PlaceOptions::facing(Direction::East).with_state(BlockState::Repeater(
                RepeaterState {
                    delay: 2,
                    timer: 0,
                    target_powered: false,
                },
            )),
        );
        let mut sim = Simulation::new(w);
        sim.step();
        assert!(!sim.world().get(p(5, 0, 5)).unwrap().powered());

        // Input flips on; it is first seen by tick T.
        source(sim.world_mut(), p(4, 0, 5));
        let mut outputs = Vec::new();
        for _ in 0..4 {
            sim.step();
            outputs.push(sim.world().get(p(5, 0, 5)).unwrap().powered());
        }
        assert_eq!(outputs, vec![false, false, true, true]);
    }

    #[test]
    fn repeater_drives_wire_after_commit() {
        let mut w = World::new();
        source(&mut w, p(0, 0, 0));
        w.set(
            p(1, 0, 0),
            BlockKind::Repeater,
            false,
            PlaceOptions::facing(Direction::East),
        );
        w.place(p(2, 0, 0), BlockKind::Wire);
        let mut sim = Simulation::new(w);
        sim.run(3);
        assert_eq!(sim.world().get(p(2, 0, 0)).unwrap().power_level, 14);
    }

    #[test]
    fn identical_snapshots_step_identically() {
        let build = || {
            let mut w = World::new();
            source(&mut w, p(0, 0, 0));
            for x in 1..8 {
                w.place(p(x, 0, 0), BlockKind::Wire);
            }
            w.place(p(8, 0, 0), BlockKind::GateOr);
            w.place(p(8, 1, 0), BlockKind::Torch);
            w.set(p(4, 1, 0), BlockKind::Repeater, false, PlaceOptions::facing(Direction::Up));
            w.place(p(9, 0, 0), BlockKind::Output);
            w
        };
        let mut a = Simulation::new(build());
        let mut b = Simulation::new(build());
        for _ in 0..12 {
            let sa = a.step();
            let sb = b.step();
            assert_eq!(sa, sb);
            assert_eq!(a.world().get_all(), b.world().get_all());
            assert_eq!(a.world().state_hash(), b.world().state_hash());
        }
    }

    #[test]
    fn compute_next_is_pure() {
        let mut w = World::new();
        source(&mut w, p(2, 2, 2));
        w.place(p(3, 2, 2), BlockKind::Wire);
        w.place(p(4, 2, 2), BlockKind::Repeater);
        let snap = w.snapshot();
        let first = compute_next(&snap);
        let second = compute_next(&snap);
        assert_eq!(first, second);
        assert_eq!(snap, w.snapshot());
    }

    #[test]
    fn sinks_receive_every_sample() {
        let shared = Rc::new(RefCell::new(Vec::<MetricsSample>::new()));
        let mut w = World::new();
        source(&mut w, p(0, 0, 0));
        w.place(p(1, 0, 0), BlockKind::Wire);
        let mut sim = Simulation::new(w);
        sim.add_sink(Rc::clone(&shared));
        let returned = sim.run(2);
        let recorded = shared.borrow();
        assert_eq!(*recorded, returned);
        assert_eq!(recorded[0].changed_cells, 1);
        assert_eq!(recorded[1].changed_cells, 0);
        assert_eq!(recorded[0].clusters, vec![2]);
    }

    #[test]
    fn subscribers_see_each_commit() {
        let commits = Rc::new(RefCell::new(0));
        let c = Rc::clone(&commits);
        let mut w = World::new();
        w.subscribe(move |_| *c.borrow_mut() += 1);
        let mut sim = Simulation::new(w);
        sim.run(4);
        assert_eq!(*commits.borrow(), 5);
    }
}
