use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label name to label value. Ordered so that iteration never depends on
/// insertion or hashing order.
pub type LabelSet = BTreeMap<String, String>;

/// Number of alerts per state. Always carries an entry for every state.
pub type StateCount = BTreeMap<AlertState, usize>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlertState {
    Active,
    Suppressed,
    Unprocessed,
}

impl AlertState {
    pub const ALL: [AlertState; 3] = [
        AlertState::Active,
        AlertState::Suppressed,
        AlertState::Unprocessed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertState::Active => "active",
            AlertState::Suppressed => "suppressed",
            AlertState::Unprocessed => "unprocessed",
        }
    }
}

/// Zero-initialised state counter covering every [`AlertState`].
pub fn new_state_count() -> StateCount {
    AlertState::ALL.iter().map(|s| (*s, 0)).collect()
}

/// One upstream instance reporting an alert occurrence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpstreamRef {
    pub name: String,
    #[serde(default)]
    pub cluster: String,
}

impl UpstreamRef {
    pub fn new(name: impl Into<String>, cluster: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cluster: cluster.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Alert {
    #[serde(default)]
    pub labels: LabelSet,
    pub state: AlertState,
    /// Every upstream the alert is currently visible from.
    #[serde(default)]
    pub upstreams: Vec<UpstreamRef>,
}

impl Alert {
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels.get(name).map(String::as_str)
    }
}

/// A deduplicated group of related alerts as handed over by the merge stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertGroup {
    pub id: String,
    #[serde(default)]
    pub receiver: String,
    /// Grouping labels.
    #[serde(default)]
    pub labels: LabelSet,
    /// Labels carried with the same value by every alert in the group.
    #[serde(default)]
    pub shared_labels: LabelSet,
    pub latest_starts_at: DateTime<Utc>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
    #[serde(default)]
    pub upstream_count: BTreeMap<String, usize>,
    #[serde(default = "new_state_count")]
    pub state_count: StateCount,
}

impl AlertGroup {
    /// Copy of this group's identity with no alerts and zeroed counters.
    /// The source group is left untouched.
    pub fn derive_empty(&self) -> AlertGroup {
        AlertGroup {
            id: self.id.clone(),
            receiver: self.receiver.clone(),
            labels: self.labels.clone(),
            shared_labels: self.shared_labels.clone(),
            latest_starts_at: self.latest_starts_at,
            alerts: Vec::new(),
            upstream_count: BTreeMap::new(),
            state_count: new_state_count(),
        }
    }

    /// Appends an alert and updates the state and upstream counters.
    pub fn push_alert(&mut self, alert: Alert) {
        *self.state_count.entry(alert.state).or_insert(0) += 1;
        for upstream in &alert.upstreams {
            *self.upstream_count.entry(upstream.name.clone()).or_insert(0) += 1;
        }
        self.alerts.push(alert);
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.len()
    }

    /// Dominant state of the group: active wins over suppressed, which
    /// wins over unprocessed.
    pub fn state(&self) -> AlertState {
        let count = |s: AlertState| self.state_count.get(&s).copied().unwrap_or(0);
        if count(AlertState::Active) > 0 {
            AlertState::Active
        } else if count(AlertState::Suppressed) > 0 {
            AlertState::Suppressed
        } else {
            AlertState::Unprocessed
        }
    }

    /// Raw value of `name` from the first of the group labels, the shared
    /// labels and the first alert's labels that carries it. A label that is
    /// present with an empty value ends the lookup.
    pub fn label_value(&self, name: &str) -> Option<&str> {
        self.labels
            .get(name)
            .or_else(|| self.shared_labels.get(name))
            .or_else(|| self.alerts.first().and_then(|a| a.labels.get(name)))
            .map(String::as_str)
    }

    /// First non-empty value of `name`, searched in the same order as
    /// [`AlertGroup::label_value`]. Grids are keyed on it.
    pub fn grid_value(&self, name: &str) -> Option<&str> {
        [
            Some(&self.labels),
            Some(&self.shared_labels),
            self.alerts.first().map(|a| &a.labels),
        ]
        .into_iter()
        .flatten()
        .filter_map(|set| set.get(name))
        .map(String::as_str)
        .find(|v| !v.is_empty())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::TimeZone;

    pub fn labels(pairs: &[(&str, &str)]) -> LabelSet {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    pub fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    pub fn alert(pairs: &[(&str, &str)], upstreams: &[&str]) -> Alert {
        Alert {
            labels: labels(pairs),
            state: AlertState::Active,
            upstreams: upstreams
                .iter()
                .map(|name| UpstreamRef::new(*name, "default"))
                .collect(),
        }
    }

    pub fn group(id: &str, starts_at: i64, alerts: Vec<Alert>) -> AlertGroup {
        let mut g = AlertGroup {
            id: id.to_string(),
            receiver: "default".to_string(),
            labels: LabelSet::new(),
            shared_labels: LabelSet::new(),
            latest_starts_at: ts(starts_at),
            alerts: Vec::new(),
            upstream_count: BTreeMap::new(),
            state_count: new_state_count(),
        };
        for a in alerts {
            g.push_alert(a);
        }
        g
    }
}
