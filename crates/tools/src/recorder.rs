use std::collections::VecDeque;

use circuitspace_kernel::{MetricsSample, MetricsSink};

/// Keeps the most recent metrics samples up to a fixed capacity, plus
/// running totals over everything ever recorded.
#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    capacity: usize,
    samples: VecDeque<MetricsSample>,
    recorded: u64,
    total_changed: u64,
    peak_powered: usize,
}

impl MetricsRecorder {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
            recorded: 0,
            total_changed: 0,
            peak_powered: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Retained samples, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = &MetricsSample> + '_ {
        self.samples.iter()
    }

    pub fn latest(&self) -> Option<&MetricsSample> {
        self.samples.back()
    }

    /// Number of samples ever recorded, including evicted ones.
    pub fn recorded(&self) -> u64 {
        self.recorded
    }

    pub fn total_changed(&self) -> u64 {
        self.total_changed
    }

    pub fn peak_powered(&self) -> usize {
        self.peak_powered
    }

    /// True once a retained sample reports no changed cells, i.e. the circuit
    /// reached a fixed point (clocks and pending repeaters never do).
    pub fn settled(&self) -> bool {
        self.latest().is_some_and(|s| s.changed_cells == 0)
    }

    /// Drop retained samples and reset the running totals.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.recorded = 0;
        self.total_changed = 0;
        self.peak_powered = 0;
    }
}

impl MetricsSink for MetricsRecorder {
    fn record(&mut self, sample: &MetricsSample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample.clone());
        self.recorded += 1;
        self.total_changed += sample.changed_cells as u64;
        self.peak_powered = self.peak_powered.max(sample.powered_count);
        tracing::trace!(tick = sample.tick, retained = self.samples.len(), "metrics recorded");
    }
}

impl std::fmt::Display for MetricsRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Metrics: samples={} retained={} changed_total={} peak_powered={} settled={}",
            self.recorded,
            self.samples.len(),
            self.total_changed,
            self.peak_powered,
            self.settled()
        )
    }
}
