//! Built-in circuits for trying the simulator without a world file.

use circuitspace_author::{EditError, Editor};
use circuitspace_common::{
    BlockKind, BlockState, ComparatorMode, ComparatorState, Direction, RepeaterState, VoxelPos,
};
use circuitspace_kernel::{PlaceOptions, World};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Demo {
    /// NOT gate feeding back through a delay-2 repeater: a free-running oscillator.
    Clock,
    /// Two switched sources into an AND gate driving a lamp.
    AndGate,
    /// Subtract-mode comparator with a strong main line and a weak side line.
    Comparator,
    /// A single source driving a wire run long enough to fade out.
    Line,
}

/// Build the demo through an editor so the placement history is undoable.
pub fn build(demo: Demo) -> Result<(World, Editor), EditError> {
    let mut b = Builder::default();

    match demo {
        Demo::Clock => {
            b.put(4, 0, 4, BlockKind::GateNot)?;
            let latch = BlockState::Repeater(RepeaterState {
                delay: 2,
                ..RepeaterState::default()
            });
            b.with(
                5,
                0,
                4,
                BlockKind::Repeater,
                PlaceOptions::facing(Direction::East).with_state(latch),
            )?;
            b.put(6, 0, 4, BlockKind::Output)?;
        }
        Demo::AndGate => {
            b.source(2, 0, 4)?;
            b.source(6, 0, 4)?;
            b.put(3, 0, 4, BlockKind::Wire)?;
            b.put(5, 0, 4, BlockKind::Wire)?;
            b.put(4, 0, 4, BlockKind::GateAnd)?;
            b.put(4, 0, 5, BlockKind::Wire)?;
            b.put(4, 0, 6, BlockKind::Output)?;
        }
        Demo::Comparator => {
            b.source(0, 0, 8)?;
            for x in 1..4 {
                b.put(x, 0, 8, BlockKind::Wire)?;
            }
            let subtract = BlockState::Comparator(ComparatorState {
                mode: ComparatorMode::Subtract,
            });
            b.with(
                4,
                0,
                8,
                BlockKind::Comparator,
                PlaceOptions::facing(Direction::East).with_state(subtract),
            )?;
            b.source(4, 0, 0)?;
            for z in 1..8 {
                b.put(4, 0, z, BlockKind::Wire)?;
            }
            b.put(5, 0, 8, BlockKind::Output)?;
        }
        Demo::Line => {
            b.source(0, 0, 0)?;
            for x in 1..16 {
                b.put(x, 0, 0, BlockKind::Wire)?;
            }
        }
    }

    Ok((b.world, b.editor))
}

#[derive(Default)]
struct Builder {
    world: World,
    editor: Editor,
}

impl Builder {
    fn with(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        kind: BlockKind,
        options: PlaceOptions,
    ) -> Result<(), EditError> {
        let pos = VoxelPos::new(x, y, z);
        self.editor.place(&mut self.world, pos, kind, false, options)
    }

    fn put(&mut self, x: i32, y: i32, z: i32, kind: BlockKind) -> Result<(), EditError> {
        self.with(x, y, z, kind, PlaceOptions::default())
    }

    fn source(&mut self, x: i32, y: i32, z: i32) -> Result<(), EditError> {
        let pos = VoxelPos::new(x, y, z);
        self.editor
            .place(&mut self.world, pos, BlockKind::Source, true, PlaceOptions::default())
    }
}
