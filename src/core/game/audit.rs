use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{Display, EnumString, IntoStaticStr};
use tracing::warn;

use super::state::Role;
use crate::runtime::observability::{Observer, ObserverEvent};

/// A vertex of the game graph.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Node {
    Host,
    Player,
    CallTool,
}

impl From<Role> for Node {
    fn from(role: Role) -> Self {
        match role {
            Role::Host => Self::Host,
            Role::Player => Self::Player,
        }
    }
}

impl Node {
    pub fn role(self) -> Option<Role> {
        match self {
            Self::Host => Some(Role::Host),
            Self::Player => Some(Role::Player),
            Self::CallTool => None,
        }
    }
}

/// One question round after the topic is set: the host answers through a
/// tool, hands over, and the player asks through a tool.
pub const EXPECTED_NODE_CYCLE: [Node; 6] = [
    Node::Host,
    Node::CallTool,
    Node::Host,
    Node::Player,
    Node::CallTool,
    Node::Player,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeOrderAnomaly {
    pub step: usize,
    pub expected: Node,
    pub observed: Node,
}

/// Compares visited nodes against [`EXPECTED_NODE_CYCLE`].
///
/// Mismatches are diagnostics only. After one, the validator realigns on the
/// next cycle position that matches the observed node so a single skipped
/// visit does not flag every step after it.
pub struct NodeOrderValidator {
    position: usize,
    step: usize,
    anomalies: Vec<NodeOrderAnomaly>,
    observer: Option<Arc<dyn Observer>>,
}

impl NodeOrderValidator {
    pub fn new() -> Self {
        Self {
            position: 0,
            step: 0,
            anomalies: Vec::new(),
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn observe(&mut self, node: Node) -> Option<NodeOrderAnomaly> {
        let step = self.step;
        self.step += 1;

        let expected = EXPECTED_NODE_CYCLE[self.position];
        if expected == node {
            self.position = (self.position + 1) % EXPECTED_NODE_CYCLE.len();
            return None;
        }

        let anomaly = NodeOrderAnomaly {
            step,
            expected,
            observed: node,
        };
        warn!(step, expected = %expected, observed = %node, "node order anomaly");
        if let Some(observer) = &self.observer {
            observer.record_event(&ObserverEvent::NodeOrderAnomaly {
                step,
                expected,
                observed: node,
            });
        }

        let len = EXPECTED_NODE_CYCLE.len();
        if let Some(offset) =
            (1..len).find(|offset| EXPECTED_NODE_CYCLE[(self.position + offset) % len] == node)
        {
            self.position = (self.position + offset + 1) % len;
        }
        self.anomalies.push(anomaly.clone());
        Some(anomaly)
    }

    pub fn anomalies(&self) -> &[NodeOrderAnomaly] {
        &self.anomalies
    }

    pub fn into_anomalies(self) -> Vec<NodeOrderAnomaly> {
        self.anomalies
    }

    /// Replay a complete node sequence and return every mismatch.
    pub fn validate(nodes: &[Node]) -> Vec<NodeOrderAnomaly> {
        let mut validator = Self::new();
        for node in nodes {
            validator.observe(*node);
        }
        validator.into_anomalies()
    }
}

impl Default for NodeOrderValidator {
    fn default() -> Self {
        Self::new()
    }
}
