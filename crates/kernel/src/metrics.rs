use std::cell::RefCell;
use std::rc::Rc;

use circuitspace_common::{BlockKind, CELL_COUNT, VoxelPos};
use serde::Serialize;

use crate::grid::VoxelGrid;

/// Per-tick statistics derived from the pre- and post-tick snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSample {
    /// Tick number this sample describes (1 for the first step).
    pub tick: u64,
    pub block_count: usize,
    pub powered_count: usize,
    pub wire_count: usize,
    /// Cells whose kind, level, or carried state differ from the previous tick.
    pub changed_cells: usize,
    /// Sizes of 6-connected groups of powered cells, largest first.
    pub clusters: Vec<usize>,
}

impl MetricsSample {
    pub fn between(tick: u64, prev: &VoxelGrid, next: &VoxelGrid) -> Self {
        let changed_cells = (0..CELL_COUNT)
            .map(VoxelPos::from_index)
            .filter(|&pos| {
                let (a, b) = (prev.get(pos), next.get(pos));
                match (a, b) {
                    (None, None) => false,
                    (Some(a), Some(b)) => {
                        a.kind != b.kind || a.power_level != b.power_level || a.state != b.state
                    }
                    _ => true,
                }
            })
            .count();

        Self {
            tick,
            block_count: next.len(),
            powered_count: next.iter().filter(|b| b.powered()).count(),
            wire_count: next.iter().filter(|b| b.kind == BlockKind::Wire).count(),
            changed_cells,
            clusters: powered_clusters(next),
        }
    }

    pub fn largest_cluster(&self) -> usize {
        self.clusters.first().copied().unwrap_or(0)
    }
}

impl std::fmt::Display for MetricsSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "tick={} blocks={} powered={} wires={} changed={} clusters={} largest={}",
            self.tick,
            self.block_count,
            self.powered_count,
            self.wire_count,
            self.changed_cells,
            self.clusters.len(),
            self.largest_cluster()
        )
    }
}

/// Flood-fill powered cells into face-connected clusters; sizes sorted descending.
pub fn powered_clusters(grid: &VoxelGrid) -> Vec<usize> {
    let mut visited = vec![false; CELL_COUNT];
    let mut sizes = Vec::new();
    let mut stack = Vec::new();

    for start in grid.iter().filter(|b| b.powered()) {
        let Some(idx) = start.pos.index() else {
            continue;
        };
        if visited[idx] {
            continue;
        }
        visited[idx] = true;
        stack.push(start.pos);
        let mut size = 0;
        while let Some(pos) = stack.pop() {
            size += 1;
            for n in pos.neighbors() {
                let Some(nidx) = n.index() else {
                    continue;
                };
                if !visited[nidx] && grid.get(n).is_some_and(|b| b.powered()) {
                    visited[nidx] = true;
                    stack.push(n);
                }
            }
        }
        sizes.push(size);
    }

    sizes.sort_unstable_by(|a, b| b.cmp(a));
    sizes
}

/// Receiver for the sample published at the end of every tick.
pub trait MetricsSink {
    fn record(&mut self, sample: &MetricsSample);
}

/// Lets a host keep a handle to a sink it has registered with a simulation.
impl<S: MetricsSink> MetricsSink for Rc<RefCell<S>> {
    fn record(&mut self, sample: &MetricsSample) {
        self.borrow_mut().record(sample);
    }
}

impl MetricsSink for Vec<MetricsSample> {
    fn record(&mut self, sample: &MetricsSample) {
        self.push(sample.clone());
    }
}
