use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::filters::{Filter, FilterPass};
use crate::grid::{Grid, GridLabel, GridPartitioner};
use crate::snapshot::Snapshot;
use crate::sorting::{SortConfig, SortOrder};
use crate::stats::{LabelCounter, LabelNameStatsList};
use crate::upstreams::{summarize_upstreams, UpstreamSummary};

/// Per-request view parameters. Unset fields fall back to [`Config`].
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ViewRequest {
    #[serde(default)]
    pub sort_order: Option<SortOrder>,
    #[serde(default)]
    pub sort_reverse: Option<bool>,
    #[serde(default)]
    pub sort_label: Option<String>,
    #[serde(default)]
    pub grid_label: Option<String>,
    #[serde(default)]
    pub grid_reverse: Option<bool>,
}

impl ViewRequest {
    pub fn sort_config(&self, config: &Config) -> SortConfig {
        let sorting = &config.grid.sorting;
        SortConfig {
            order: self.sort_order.unwrap_or(sorting.order),
            reverse: self.sort_reverse.unwrap_or(sorting.reverse),
            label: self
                .sort_label
                .as_deref()
                .filter(|l| !l.is_empty())
                .unwrap_or(sorting.label.as_str())
                .to_string(),
        }
    }

    pub fn grid_label(&self, config: &Config) -> GridLabel {
        GridLabel::parse(self.grid_label.as_deref().unwrap_or(config.grid.label.as_str()))
    }

    pub fn grid_reverse(&self, config: &Config) -> bool {
        self.grid_reverse.unwrap_or(config.grid.reverse)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct View {
    pub total_groups: usize,
    pub total_alerts: usize,
    pub grids: Vec<Grid>,
    /// Label distribution over the filtered alerts.
    pub labels: LabelNameStatsList,
    pub upstreams: UpstreamSummary,
}

/// Runs filtering, grid partitioning, sorting and label statistics for one
/// request. The snapshot is only read.
pub fn render_view(
    snapshot: &Snapshot,
    request: &ViewRequest,
    config: &Config,
    filters: &[Box<dyn Filter>],
) -> View {
    let filtered = FilterPass::new(filters).apply(&snapshot.groups);
    let total_groups = filtered.len();
    let total_alerts: usize = filtered.iter().map(|g| g.alerts.len()).sum();
    let labels = LabelCounter::from_groups(&filtered).stats();

    let resolver = config.label_resolver();
    let partitioner = GridPartitioner::new(&resolver, &config.grid.auto);
    let grids = partitioner.partition(
        filtered,
        &request.grid_label(config),
        &request.sort_config(config),
        request.grid_reverse(config),
    );

    tracing::debug!(
        groups = total_groups,
        alerts = total_alerts,
        grids = grids.len(),
        filters = filters.len(),
        "rendered alert view"
    );

    View {
        total_groups,
        total_alerts,
        grids,
        labels,
        upstreams: summarize_upstreams(&snapshot.upstreams),
    }
}
