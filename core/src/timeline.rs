use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A discrete event in one flow execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TimelineEvent {
    NodeEnter {
        node_id: String,
        node_label: String,
        at: DateTime<Utc>,
    },
    NodeExit {
        node_id: String,
        outcome_type: String, // "Next", "Branch", "Fault"
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    BranchTaken {
        node_id: String,
        branch_id: String,
        at: DateTime<Utc>,
    },
}

/// Sequential record of one execution, kept on the flow's `Bus`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timeline {
    pub events: Vec<TimelineEvent>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: TimelineEvent) {
        self.events.push(event);
    }

    /// Labels of entered nodes, in order.
    pub fn visited(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TimelineEvent::NodeEnter { node_label, .. } => Some(node_label.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn branches(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TimelineEvent::BranchTaken { branch_id, .. } => Some(branch_id.as_str()),
                _ => None,
            })
            .collect()
    }
}
