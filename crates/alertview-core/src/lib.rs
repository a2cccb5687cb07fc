//! Deterministic alert views over a deduplicated multi-upstream snapshot.
//!
//! A request runs filter -> grid partition -> sort, and separately label
//! statistics, as a pure function of the snapshot, the request and the
//! configuration. Identical inputs always yield identical output.

pub mod autogrid;
mod config;
pub use config::{
    config_schema_json, load_config, parse_config, AutoGridConfig, Config, CustomValues,
    GridConfig, SortingConfig,
};
pub mod filters;
pub mod grid;
pub mod labels;
pub mod models;
pub mod natural;
pub mod snapshot;
pub mod sorting;
pub mod stats;
pub mod upstreams;
pub mod view;

pub use filters::{apply_filters, AlertFilter, Comparison, Filter, FilterPass};
pub use grid::{Grid, GridLabel, GridPartitioner};
pub use labels::LabelResolver;
pub use models::{Alert, AlertGroup, AlertState, LabelSet, StateCount, UpstreamRef};
pub use snapshot::{Snapshot, SnapshotError};
pub use sorting::{sort_groups, SortConfig, SortOrder};
pub use stats::{LabelCounter, LabelNameStats, LabelNameStatsList, LabelValueStats};
pub use upstreams::{summarize_upstreams, UpstreamStatus, UpstreamSummary};
pub use view::{render_view, View, ViewRequest};
