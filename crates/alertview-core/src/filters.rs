//! Alert filtering.
//!
//! Filters arrive pre-compiled; this module only evaluates them. A filter
//! can reject a whole alert and, when it is upstream-scoped, can also strip
//! individual upstream occurrences from an alert it otherwise keeps.

use std::fmt;

use tracing::debug;

use crate::models::{Alert, AlertGroup, AlertState, UpstreamRef};

/// A compiled alert predicate.
pub trait Filter: fmt::Debug + Send + Sync {
    /// Invalid filters are skipped by the filter pass.
    fn is_valid(&self) -> bool;

    /// Whether [`Filter::matches_upstream`] should be consulted for every
    /// upstream occurrence of an alert.
    fn is_upstream_filter(&self) -> bool {
        false
    }

    /// `matches` is the number of alerts accepted so far in the current pass,
    /// not counting the alert being evaluated.
    fn matches(&self, alert: &Alert, matches: usize) -> bool;

    fn matches_upstream(&self, _upstream: &UpstreamRef) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    NotEqual,
}

impl Comparison {
    fn compare<T: PartialEq + ?Sized>(&self, left: &T, right: &T) -> bool {
        match self {
            Comparison::Equal => left == right,
            Comparison::NotEqual => left != right,
        }
    }
}

/// Filter kinds shipped with the crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertFilter {
    /// Label comparison; a missing label compares as the empty string.
    Label {
        name: String,
        value: String,
        op: Comparison,
    },
    /// Upstream instance name, scoped to upstream occurrences.
    Upstream { name: String, op: Comparison },
    /// Upstream cluster name, scoped to upstream occurrences.
    Cluster { name: String, op: Comparison },
    State { state: AlertState, op: Comparison },
    /// Accepts alerts while fewer than `limit` have been accepted.
    Limit { limit: usize },
    /// An expression that failed to compile.
    Invalid { expression: String },
}

impl AlertFilter {
    pub fn label(name: impl Into<String>, op: Comparison, value: impl Into<String>) -> Self {
        AlertFilter::Label {
            name: name.into(),
            value: value.into(),
            op,
        }
    }

    pub fn upstream(op: Comparison, name: impl Into<String>) -> Self {
        AlertFilter::Upstream {
            name: name.into(),
            op,
        }
    }

    pub fn cluster(op: Comparison, name: impl Into<String>) -> Self {
        AlertFilter::Cluster {
            name: name.into(),
            op,
        }
    }

    pub fn state(op: Comparison, state: AlertState) -> Self {
        AlertFilter::State { state, op }
    }

    pub fn limit(limit: usize) -> Self {
        AlertFilter::Limit { limit }
    }

    pub fn invalid(expression: impl Into<String>) -> Self {
        AlertFilter::Invalid {
            expression: expression.into(),
        }
    }
}

impl Filter for AlertFilter {
    fn is_valid(&self) -> bool {
        match self {
            AlertFilter::Label { name, .. } => !name.is_empty(),
            AlertFilter::Upstream { name, .. } | AlertFilter::Cluster { name, .. } => {
                !name.is_empty()
            }
            AlertFilter::State { .. } => true,
            AlertFilter::Limit { limit } => *limit > 0,
            AlertFilter::Invalid { .. } => false,
        }
    }

    fn is_upstream_filter(&self) -> bool {
        matches!(
            self,
            AlertFilter::Upstream { .. } | AlertFilter::Cluster { .. }
        )
    }

    fn matches(&self, alert: &Alert, matches: usize) -> bool {
        match self {
            AlertFilter::Label { name, value, op } => {
                op.compare(alert.label(name).unwrap_or(""), value.as_str())
            }
            AlertFilter::Upstream { .. } | AlertFilter::Cluster { .. } => {
                alert.upstreams.iter().any(|u| self.matches_upstream(u))
            }
            AlertFilter::State { state, op } => op.compare(&alert.state, state),
            AlertFilter::Limit { limit } => matches < *limit,
            AlertFilter::Invalid { .. } => false,
        }
    }

    fn matches_upstream(&self, upstream: &UpstreamRef) -> bool {
        match self {
            AlertFilter::Upstream { name, op } => {
                op.compare(upstream.name.as_str(), name.as_str())
            }
            AlertFilter::Cluster { name, op } => {
                op.compare(upstream.cluster.as_str(), name.as_str())
            }
            _ => true,
        }
    }
}

/// One evaluation pass over a snapshot. Holds the running match counter,
/// so a fresh pass must be created for every request.
pub struct FilterPass<'f> {
    filters: &'f [Box<dyn Filter>],
    matches: usize,
}

impl<'f> FilterPass<'f> {
    pub fn new(filters: &'f [Box<dyn Filter>]) -> Self {
        for f in filters.iter().filter(|f| !f.is_valid()) {
            debug!(filter = ?f, "skipping invalid filter");
        }
        Self {
            filters,
            matches: 0,
        }
    }

    /// Number of alerts accepted so far.
    pub fn matches(&self) -> usize {
        self.matches
    }

    /// Builds filtered copies of `groups`, dropping groups left without
    /// alerts. Input order is preserved.
    pub fn apply(&mut self, groups: &[AlertGroup]) -> Vec<AlertGroup> {
        let mut out = Vec::new();
        for group in groups {
            let mut derived = group.derive_empty();
            for alert in &group.alerts {
                if let Some(kept) = self.admit(alert) {
                    self.matches += 1;
                    derived.push_alert(kept);
                }
            }
            if derived.alert_count() > 0 {
                out.push(derived);
            }
        }
        out
    }

    fn admit(&self, alert: &Alert) -> Option<Alert> {
        // every valid filter sees the alert, even after a mismatch
        let mismatch = self
            .filters
            .iter()
            .filter(|f| f.is_valid())
            .fold(false, |mismatch, f| !f.matches(alert, self.matches) || mismatch);
        if mismatch {
            return None;
        }

        let blocked: Vec<&str> = alert
            .upstreams
            .iter()
            .filter(|u| {
                self.filters.iter().any(|f| {
                    f.is_valid() && f.is_upstream_filter() && !f.matches_upstream(u)
                })
            })
            .map(|u| u.name.as_str())
            .collect();

        let upstreams: Vec<UpstreamRef> = alert
            .upstreams
            .iter()
            .filter(|u| !blocked.contains(&u.name.as_str()))
            .cloned()
            .collect();
        if upstreams.is_empty() {
            return None;
        }

        Some(Alert {
            labels: alert.labels.clone(),
            state: alert.state,
            upstreams,
        })
    }
}

/// Runs a single filter pass over `groups`.
pub fn apply_filters(groups: &[AlertGroup], filters: &[Box<dyn Filter>]) -> Vec<AlertGroup> {
    FilterPass::new(filters).apply(groups)
}
