use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::AlertGroup;
use crate::upstreams::UpstreamStatus;

/// Errors raised while accepting a snapshot from the merge stage.
#[derive(thiserror::Error, Debug)]
pub enum SnapshotError {
    #[error("duplicate alert group id: {0}")]
    DuplicateGroup(String),
    #[error("alert group {0} has no alerts")]
    EmptyGroup(String),
    #[error("alert {index} in group {group} has no upstream")]
    NoUpstream { group: String, index: usize },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Immutable, deduplicated view of every upstream's alerts. Requests only
/// ever read it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    #[serde(default)]
    pub groups: Vec<AlertGroup>,
    #[serde(default)]
    pub upstreams: Vec<UpstreamStatus>,
}

impl Snapshot {
    pub fn from_json(raw: &str) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot = serde_json::from_str(raw)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn validate(&self) -> Result<(), SnapshotError> {
        let mut seen = HashSet::new();
        for group in &self.groups {
            if !seen.insert(group.id.as_str()) {
                return Err(SnapshotError::DuplicateGroup(group.id.clone()));
            }
            if group.alerts.is_empty() {
                return Err(SnapshotError::EmptyGroup(group.id.clone()));
            }
            if let Some(index) = group.alerts.iter().position(|a| a.upstreams.is_empty()) {
                return Err(SnapshotError::NoUpstream {
                    group: group.id.clone(),
                    index,
                });
            }
        }
        Ok(())
    }

    pub fn alert_count(&self) -> usize {
        self.groups.iter().map(|g| g.alerts.len()).sum()
    }
}
