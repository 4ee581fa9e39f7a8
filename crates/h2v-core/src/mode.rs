//! Neighbor-propagation update order.

use serde::{Deserialize, Serialize};

/// How a propagation round reads neighbor vectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropagationMode {
    /// Update nodes in place, in document order. A node visited later in a
    /// round reads vectors already updated earlier in the same round.
    #[default]
    Cascading,
    /// Read every vector as it stood at the start of the round, then write all
    /// updates at once. After one round a node holds exactly its own vector
    /// plus its direct neighbors' own vectors.
    Synchronous,
}

impl std::fmt::Display for PropagationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Cascading => "cascading",
            Self::Synchronous => "synchronous",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for PropagationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cascading" => Ok(Self::Cascading),
            "synchronous" => Ok(Self::Synchronous),
            other => Err(format!("unknown propagation mode '{other}'")),
        }
    }
}
