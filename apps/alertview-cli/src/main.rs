use std::path::{Path, PathBuf};

use alertview_core::{
    config_schema_json, load_config, render_view, AlertFilter, AlertState, Comparison, Config,
    Filter, Snapshot, SortOrder, ViewRequest,
};
use anyhow::{Context, Result};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "alertview",
    version,
    about = "Render a filtered, grid-partitioned alert view from a snapshot"
)]
struct Args {
    /// Snapshot JSON produced by the merge stage
    #[arg(long, env = "ALERTVIEW_SNAPSHOT", required_unless_present = "print_schema")]
    snapshot: Option<PathBuf>,
    /// TOML configuration; built-in defaults when omitted
    #[arg(long, env = "ALERTVIEW_CONFIG")]
    config: Option<PathBuf>,
    /// startsAt, label or disabled
    #[arg(long)]
    sort_order: Option<SortOrder>,
    #[arg(long)]
    sort_reverse: Option<bool>,
    #[arg(long)]
    sort_label: Option<String>,
    /// Label name, @auto, @receiver, or an empty string to disable grids
    #[arg(long)]
    grid_label: Option<String>,
    #[arg(long)]
    grid_reverse: Option<bool>,
    /// Label filter, `name=value` or `name!=value` (repeatable)
    #[arg(long = "label", value_name = "EXPR")]
    labels: Vec<String>,
    /// Upstream name; prefix with `!` to exclude (repeatable)
    #[arg(long = "upstream", value_name = "NAME")]
    upstreams: Vec<String>,
    /// Upstream cluster; prefix with `!` to exclude (repeatable)
    #[arg(long = "cluster", value_name = "NAME")]
    clusters: Vec<String>,
    /// Alert state; prefix with `!` to exclude (repeatable)
    #[arg(long = "state", value_name = "STATE")]
    states: Vec<String>,
    /// Keep at most this many alerts
    #[arg(long)]
    limit: Option<usize>,
    /// Pretty-print the view
    #[arg(long, default_value_t = false)]
    pretty: bool,
    /// Print the configuration JSON schema and exit
    #[arg(long, default_value_t = false)]
    print_schema: bool,
}

impl Args {
    fn request(&self) -> ViewRequest {
        ViewRequest {
            sort_order: self.sort_order,
            sort_reverse: self.sort_reverse,
            sort_label: self.sort_label.clone(),
            grid_label: self.grid_label.clone(),
            grid_reverse: self.grid_reverse,
        }
    }

    fn filters(&self) -> Vec<Box<dyn Filter>> {
        let mut filters: Vec<Box<dyn Filter>> = Vec::new();
        for expr in &self.labels {
            filters.push(Box::new(label_filter(expr)));
        }
        for expr in &self.upstreams {
            let (op, name) = operand(expr);
            filters.push(Box::new(AlertFilter::upstream(op, name)));
        }
        for expr in &self.clusters {
            let (op, name) = operand(expr);
            filters.push(Box::new(AlertFilter::cluster(op, name)));
        }
        for expr in &self.states {
            filters.push(Box::new(state_filter(expr)));
        }
        if let Some(limit) = self.limit {
            filters.push(Box::new(AlertFilter::limit(limit)));
        }
        filters
    }
}

fn operand(expr: &str) -> (Comparison, &str) {
    match expr.strip_prefix('!') {
        Some(rest) => (Comparison::NotEqual, rest),
        None => (Comparison::Equal, expr),
    }
}

fn label_filter(expr: &str) -> AlertFilter {
    if let Some((name, value)) = expr.split_once("!=") {
        return AlertFilter::label(name.trim(), Comparison::NotEqual, value.trim());
    }
    match expr.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            AlertFilter::label(name.trim(), Comparison::Equal, value.trim())
        }
        _ => AlertFilter::invalid(expr),
    }
}

fn state_filter(expr: &str) -> AlertFilter {
    let (op, name) = operand(expr);
    AlertState::ALL
        .into_iter()
        .find(|s| s.as_str() == name)
        .map(|state| AlertFilter::state(op, state))
        .unwrap_or_else(|| AlertFilter::invalid(expr))
}

fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    Snapshot::from_json(&raw).with_context(|| format!("decoding snapshot {}", path.display()))
}

fn main() -> Result<()> {
    alertview_otel::init();
    let args = Args::parse();

    if args.print_schema {
        println!("{}", serde_json::to_string_pretty(&config_schema_json())?);
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => load_config(path.to_string_lossy().as_ref())?,
        None => Config::default(),
    };
    let Some(snapshot_path) = args.snapshot.as_deref() else {
        anyhow::bail!("--snapshot is required");
    };
    let snapshot = read_snapshot(snapshot_path)?;
    let filters = args.filters();
    tracing::info!(
        groups = snapshot.groups.len(),
        alerts = snapshot.alert_count(),
        filters = filters.len(),
        "rendering view"
    );

    let view = render_view(&snapshot, &args.request(), &config, &filters);
    let out = if args.pretty {
        serde_json::to_string_pretty(&view)?
    } else {
        serde_json::to_string(&view)?
    };
    println!("{out}");
    Ok(())
}
