use serde::{Deserialize, Serialize};

use crate::types::{Direction, VoxelPos};
use crate::MAX_POWER;

/// Clamp an arbitrary integer level into `0..=MAX_POWER`.
#[inline]
pub fn clamp_power(level: i32) -> u8 {
    level.clamp(0, MAX_POWER as i32) as u8
}

/// The closed set of cell types.
///
/// `Air` exists so that callers can express "erase this cell"; it is never
/// stored by the world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    #[default]
    Air,
    Wire,
    Source,
    GateAnd,
    GateOr,
    GateNot,
    Repeater,
    Comparator,
    Torch,
    Output,
}

impl BlockKind {
    /// Every kind, in editor cycle order.
    pub const ALL: [BlockKind; 10] = [
        BlockKind::Air,
        BlockKind::Wire,
        BlockKind::Source,
        BlockKind::GateAnd,
        BlockKind::GateOr,
        BlockKind::GateNot,
        BlockKind::Repeater,
        BlockKind::Comparator,
        BlockKind::Torch,
        BlockKind::Output,
    ];

    /// The kind that follows this one in the editor palette, wrapping back to air.
    pub fn next_in_cycle(self) -> Self {
        let i = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn name(self) -> &'static str {
        match self {
            BlockKind::Air => "air",
            BlockKind::Wire => "wire",
            BlockKind::Source => "source",
            BlockKind::GateAnd => "gate_and",
            BlockKind::GateOr => "gate_or",
            BlockKind::GateNot => "gate_not",
            BlockKind::Repeater => "repeater",
            BlockKind::Comparator => "comparator",
            BlockKind::Torch => "torch",
            BlockKind::Output => "output",
        }
    }

    /// Parse a kind by its wire name. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Single-character glyph used by text renderings of a layer.
    pub fn glyph(self) -> char {
        match self {
            BlockKind::Air => '.',
            BlockKind::Wire => '-',
            BlockKind::Source => 'S',
            BlockKind::GateAnd => '&',
            BlockKind::GateOr => '|',
            BlockKind::GateNot => '!',
            BlockKind::Repeater => '>',
            BlockKind::Comparator => 'C',
            BlockKind::Torch => 'T',
            BlockKind::Output => 'O',
        }
    }

    /// True for kinds whose behavior depends on `Block::orientation`.
    pub fn is_directional(self) -> bool {
        matches!(
            self,
            BlockKind::Repeater | BlockKind::Comparator | BlockKind::Torch
        )
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Edge-detecting delay latch carried by a repeater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeaterState {
    /// Ticks between an input edge and the output following it. `1..=4`.
    pub delay: u8,
    /// Ticks remaining before the output adopts `target_powered`.
    pub timer: u8,
    /// The input level most recently latched.
    pub target_powered: bool,
}

impl RepeaterState {
    pub const MIN_DELAY: u8 = 1;
    pub const MAX_DELAY: u8 = 4;

    pub fn with_delay(delay: i64) -> Self {
        Self {
            delay: delay.clamp(Self::MIN_DELAY as i64, Self::MAX_DELAY as i64) as u8,
            ..Self::default()
        }
    }

    fn normalized(self) -> Self {
        let delay = self.delay.clamp(Self::MIN_DELAY, Self::MAX_DELAY);
        Self {
            delay,
            timer: self.timer.min(delay),
            target_powered: self.target_powered,
        }
    }
}

impl Default for RepeaterState {
    fn default() -> Self {
        Self {
            delay: Self::MIN_DELAY,
            timer: 0,
            target_powered: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparatorMode {
    #[default]
    Compare,
    Subtract,
}

impl ComparatorMode {
    /// Lenient parse: anything other than `"subtract"` is `Compare`.
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("subtract") {
            ComparatorMode::Subtract
        } else {
            ComparatorMode::Compare
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComparatorState {
    pub mode: ComparatorMode,
}

/// Per-kind state carried across ticks. Only repeaters and comparators have any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockState {
    #[default]
    None,
    Repeater(RepeaterState),
    Comparator(ComparatorState),
}

impl BlockState {
    /// The state a freshly placed block of `kind` starts with.
    pub fn default_for(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Repeater => BlockState::Repeater(RepeaterState::default()),
            BlockKind::Comparator => BlockState::Comparator(ComparatorState::default()),
            _ => BlockState::None,
        }
    }

    /// Coerce this state so it fits `kind`: mismatched variants fall back to
    /// the kind's default and repeater delays are clamped.
    pub fn normalized_for(self, kind: BlockKind) -> Self {
        match (kind, self) {
            (BlockKind::Repeater, BlockState::Repeater(r)) => BlockState::Repeater(r.normalized()),
            (BlockKind::Comparator, BlockState::Comparator(c)) => BlockState::Comparator(c),
            (kind, _) => Self::default_for(kind),
        }
    }

    pub fn repeater(&self) -> Option<&RepeaterState> {
        match self {
            BlockState::Repeater(r) => Some(r),
            _ => None,
        }
    }

    pub fn comparator(&self) -> Option<&ComparatorState> {
        match self {
            BlockState::Comparator(c) => Some(c),
            _ => None,
        }
    }
}

/// A non-air cell. Values of this type are always copies; the world never
/// hands out references into its storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    pub pos: VoxelPos,
    pub kind: BlockKind,
    pub power_level: u8,
    #[serde(default)]
    pub orientation: Direction,
    #[serde(default)]
    pub state: BlockState,
}

impl Block {
    /// An unpowered block with the kind's default orientation and state.
    pub fn new(pos: VoxelPos, kind: BlockKind) -> Self {
        Self {
            pos,
            kind,
            power_level: 0,
            orientation: Direction::default(),
            state: BlockState::default_for(kind),
        }
    }

    pub fn with_power(mut self, level: i32) -> Self {
        self.power_level = clamp_power(level);
        self
    }

    pub fn with_orientation(mut self, orientation: Direction) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_state(mut self, state: BlockState) -> Self {
        self.state = state.normalized_for(self.kind);
        self
    }

    /// Derived from the level; there is no separate flag to drift out of sync.
    #[inline]
    pub fn powered(&self) -> bool {
        self.power_level > 0
    }

    /// Enforce the level clamp and state/kind agreement.
    pub fn normalized(self) -> Self {
        Self {
            power_level: self.power_level.min(MAX_POWER),
            state: self.state.normalized_for(self.kind),
            ..self
        }
    }

    /// Position of the cell feeding a directional block: one step against its facing.
    pub fn behind(&self) -> VoxelPos {
        self.pos.offset(self.orientation.opposite())
    }
}
