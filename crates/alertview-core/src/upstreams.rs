use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Status of one configured upstream as last observed by the poller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpstreamStatus {
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub public_uri: String,
    #[serde(default)]
    pub read_only: bool,
    /// Last polling error, `None` when healthy.
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub cluster: String,
    #[serde(default)]
    pub cluster_members: Vec<String>,
}

impl UpstreamStatus {
    pub fn is_healthy(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct UpstreamCounters {
    pub total: usize,
    pub healthy: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct UpstreamSummary {
    pub counters: UpstreamCounters,
    pub instances: Vec<UpstreamStatus>,
    /// Cluster name -> member upstream names.
    pub clusters: BTreeMap<String, Vec<String>>,
}

/// Summarises upstream health. Instances are listed by name; the first
/// instance of a cluster in that order supplies the member list.
pub fn summarize_upstreams(statuses: &[UpstreamStatus]) -> UpstreamSummary {
    let mut instances = statuses.to_vec();
    instances.sort_by(|a, b| a.name.cmp(&b.name));

    let mut summary = UpstreamSummary::default();
    for upstream in &instances {
        summary
            .clusters
            .entry(upstream.cluster.clone())
            .or_insert_with(|| {
                let mut members = upstream.cluster_members.clone();
                if members.is_empty() {
                    members.push(upstream.name.clone());
                }
                members.sort();
                members
            });

        summary.counters.total += 1;
        if upstream.is_healthy() {
            summary.counters.healthy += 1;
        } else {
            summary.counters.failed += 1;
        }
    }
    summary.instances = instances;
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(name: &str, cluster: &str, members: &[&str], error: Option<&str>) -> UpstreamStatus {
        UpstreamStatus {
            name: name.to_string(),
            uri: format!("http://{name}:9093"),
            public_uri: String::new(),
            read_only: false,
            error: error.map(str::to_string),
            version: "0.27.0".to_string(),
            cluster: cluster.to_string(),
            cluster_members: members.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn counts_healthy_and_failed() {
        let summary = summarize_upstreams(&[
            status("am2", "ha", &["am2", "am1"], Some("connection refused")),
            status("am1", "ha", &["am1", "am2"], None),
            status("solo", "solo", &[], None),
        ]);
        assert_eq!(
            summary.counters,
            UpstreamCounters {
                total: 3,
                healthy: 2,
                failed: 1
            }
        );
        let names: Vec<&str> = summary.instances.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["am1", "am2", "solo"]);
    }

    #[test]
    fn maps_clusters_to_sorted_members() {
        let summary = summarize_upstreams(&[
            status("am2", "ha", &["am2", "am1"], None),
            status("am1", "ha", &["am2", "am1"], None),
            status("solo", "solo", &[], None),
        ]);
        assert_eq!(summary.clusters["ha"], vec!["am1", "am2"]);
        assert_eq!(summary.clusters["solo"], vec!["solo"]);
    }

    #[test]
    fn empty_input_gives_empty_summary() {
        assert_eq!(summarize_upstreams(&[]), UpstreamSummary::default());
    }
}
