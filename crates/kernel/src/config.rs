use serde::{Deserialize, Serialize};

/// Host-side simulation settings: driver pacing and metrics retention.
///
/// Every field has a default, so a partial JSON document is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Wall-clock interval between ticks for a fixed-rate driver, in milliseconds.
    pub tick_interval_ms: u64,
    /// Number of ticks a driver runs before stopping.
    pub max_ticks: u64,
    /// How many recent metrics samples a recorder keeps.
    pub metrics_history: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            max_ticks: 20,
            metrics_history: 256,
        }
    }
}

impl SimConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_keeps_defaults() {
        let cfg = SimConfig::from_json(r#"{ "max_ticks": 5 }"#).unwrap();
        assert_eq!(cfg.max_ticks, 5);
        assert_eq!(cfg.tick_interval_ms, 100);
        assert_eq!(cfg.metrics_history, 256);
    }

    #[test]
    fn interval_converts_to_duration() {
        let cfg = SimConfig {
            tick_interval_ms: 250,
            ..SimConfig::default()
        };
        assert_eq!(cfg.tick_interval().as_millis(), 250);
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(SimConfig::from_json("{ max_ticks: }").is_err());
    }
}
