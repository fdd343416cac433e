//! Dust power solver.
//!
//! Wire levels are the maximum over every strong source of
//! `source_level - hop_distance`, found with a relaxed multi-source BFS: a
//! cell is re-expanded whenever a strictly stronger proposal reaches it, so
//! the result does not depend on the order sources are visited.

use std::collections::{BTreeMap, VecDeque};

use circuitspace_common::{BlockKind, CELL_COUNT, VoxelPos};

use crate::grid::VoxelGrid;

/// Solved wire levels. Wires absent from the map are at level 0.
pub type DustLevels = BTreeMap<VoxelPos, u8>;

/// Compute the level of every wire in `grid`.
///
/// Every non-wire block with a non-zero level seeds its adjacent wires at
/// `level - 1`. Levels drop by one per hop and proposals at 0 are discarded,
/// so the loop always terminates.
pub fn solve(grid: &VoxelGrid) -> DustLevels {
    let mut best = vec![0u8; CELL_COUNT];
    let mut queue = VecDeque::new();

    for source in grid
        .iter()
        .filter(|b| b.kind != BlockKind::Wire && b.powered())
    {
        propose(grid, &best, &mut queue, source.pos, source.power_level);
    }

    while let Some((pos, level)) = queue.pop_front() {
        let Some(idx) = pos.index() else {
            continue;
        };
        if level <= best[idx] {
            continue;
        }
        best[idx] = level;
        propose(grid, &best, &mut queue, pos, level);
    }

    let levels: DustLevels = best
        .iter()
        .enumerate()
        .filter(|&(_, &level)| level > 0)
        .map(|(idx, &level)| (VoxelPos::from_index(idx), level))
        .collect();
    tracing::trace!(lit_wires = levels.len(), "dust solved");
    levels
}

/// Queue `level - 1` for every wire adjacent to `from` that could improve.
fn propose(
    grid: &VoxelGrid,
    best: &[u8],
    queue: &mut VecDeque<(VoxelPos, u8)>,
    from: VoxelPos,
    level: u8,
) {
    let next = level.saturating_sub(1);
    if next == 0 {
        return;
    }
    for n in from.neighbors() {
        let Some(idx) = n.index() else {
            continue;
        };
        if best[idx] >= next {
            continue;
        }
        if grid.get(n).is_some_and(|b| b.kind == BlockKind::Wire) {
            queue.push_back((n, next));
        }
    }
}
