//! Propagation settings.

use h2v_core::PropagationMode;
use serde::{Deserialize, Serialize};

/// Default number of propagation rounds.
const fn default_rounds() -> usize {
    5
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelConfig {
    /// Number of full parent/child aggregation passes.
    #[serde(default = "default_rounds")]
    pub rounds: usize,

    /// Whether later nodes in a round see earlier nodes' updates.
    #[serde(default)]
    pub mode: PropagationMode,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            rounds: default_rounds(),
            mode: PropagationMode::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = ModelConfig::default();
        assert_eq!(config.rounds, 5);
        assert_eq!(config.mode, PropagationMode::Cascading);
    }
}
