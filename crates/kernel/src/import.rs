//! Lenient JSON block lists for full-world loads.
//!
//! Each entry is an object `{x, y, z, type, powered?, powerLevel?,
//! orientation?, meta?}`. Only a document that is not JSON, or not an array,
//! is rejected; malformed entries are skipped and malformed meta falls back to
//! safe defaults. The result is meant for `World::replace_all`, which discards
//! anything out of bounds.

use circuitspace_common::{
    Block, BlockKind, BlockState, ComparatorMode, ComparatorState, Direction, MAX_POWER,
    RepeaterState, VoxelPos,
};
use serde_json::{Map, Value, json};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON array of blocks, found {0}")]
    NotAnArray(&'static str),
}

/// Parse a block list, skipping entries that cannot be interpreted.
pub fn blocks_from_json(text: &str) -> Result<Vec<Block>, ImportError> {
    let doc: Value = serde_json::from_str(text)?;
    let entries = match doc {
        Value::Array(entries) => entries,
        other => return Err(ImportError::NotAnArray(value_kind(&other))),
    };

    let mut blocks = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        match block_from_value(entry) {
            Some(block) => blocks.push(block),
            None => tracing::warn!(index = i, "skipping unreadable block entry"),
        }
    }
    Ok(blocks)
}

/// Interpret one entry. Returns `None` for non-objects, missing or
/// non-numeric coordinates, unknown types, and air.
pub fn block_from_value(value: &Value) -> Option<Block> {
    let obj = value.as_object()?;
    let pos = VoxelPos::new(coord(obj, "x")?, coord(obj, "y")?, coord(obj, "z")?);
    let kind = BlockKind::from_name(obj.get("type")?.as_str()?)?;
    if kind == BlockKind::Air {
        return None;
    }

    let explicit = obj.get("powerLevel").and_then(number);
    let powered = obj.get("powered").and_then(Value::as_bool);
    let level = match (explicit, powered) {
        (Some(level), _) => level,
        (None, Some(true)) => MAX_POWER as i64,
        (None, Some(false)) => 0,
        // An emitter with nothing configured runs at full strength.
        (None, None) if kind == BlockKind::Source => MAX_POWER as i64,
        (None, None) => 0,
    };

    let orientation = obj
        .get("orientation")
        .and_then(Value::as_str)
        .and_then(direction_from_name)
        .unwrap_or_default();

    let meta = obj.get("meta").and_then(Value::as_object);
    let state = match kind {
        BlockKind::Repeater => BlockState::Repeater(repeater_meta(meta)),
        BlockKind::Comparator => BlockState::Comparator(comparator_meta(meta)),
        _ => BlockState::None,
    };

    Some(
        Block::new(pos, kind)
            .with_power(level.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
            .with_orientation(orientation)
            .with_state(state),
    )
}

/// Serialize blocks in the same shape [`blocks_from_json`] reads.
pub fn blocks_to_json(blocks: &[Block]) -> Result<String, ImportError> {
    let entries: Vec<Value> = blocks.iter().map(block_to_value).collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

pub fn block_to_value(block: &Block) -> Value {
    let mut value = json!({
        "x": block.pos.x,
        "y": block.pos.y,
        "z": block.pos.z,
        "type": block.kind.name(),
        "powered": block.powered(),
        "powerLevel": block.power_level,
        "orientation": direction_name(block.orientation),
    });
    let meta = match block.state {
        BlockState::None => None,
        BlockState::Repeater(r) => Some(json!({
            "delay": r.delay,
            "timer": r.timer,
            "targetPowered": r.target_powered,
        })),
        BlockState::Comparator(c) => Some(json!({
            "mode": match c.mode {
                ComparatorMode::Compare => "compare",
                ComparatorMode::Subtract => "subtract",
            },
        })),
    };
    if let (Some(meta), Some(obj)) = (meta, value.as_object_mut()) {
        obj.insert("meta".to_owned(), meta);
    }
    value
}

fn repeater_meta(meta: Option<&Map<String, Value>>) -> RepeaterState {
    let Some(meta) = meta else {
        return RepeaterState::default();
    };
    let mut state = RepeaterState::with_delay(
        meta.get("delay")
            .and_then(number)
            .unwrap_or(RepeaterState::MIN_DELAY as i64),
    );
    state.timer = meta
        .get("timer")
        .and_then(number)
        .unwrap_or(0)
        .clamp(0, state.delay as i64) as u8;
    state.target_powered = meta
        .get("targetPowered")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    state
}

fn comparator_meta(meta: Option<&Map<String, Value>>) -> ComparatorState {
    let mode = meta
        .and_then(|m| m.get("mode"))
        .and_then(Value::as_str)
        .map(ComparatorMode::from_name)
        .unwrap_or_default();
    ComparatorState { mode }
}

/// Accept integers, floats (truncated), and numeric strings.
fn number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coord(obj: &Map<String, Value>, key: &str) -> Option<i32> {
    i32::try_from(number(obj.get(key)?)?).ok()
}

fn direction_from_name(name: &str) -> Option<Direction> {
    Direction::ALL
        .into_iter()
        .find(|d| direction_name(*d).eq_ignore_ascii_case(name))
}

fn direction_name(dir: Direction) -> &'static str {
    match dir {
        Direction::West => "west",
        Direction::East => "east",
        Direction::Down => "down",
        Direction::Up => "up",
        Direction::South => "south",
        Direction::North => "north",
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
