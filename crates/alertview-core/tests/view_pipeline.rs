use alertview_core::{
    parse_config, render_view, AlertFilter, AlertState, Comparison, Config, Filter, Snapshot,
    SortOrder, ViewRequest,
};
use anyhow::Result;
use serde_json::json;

fn snapshot() -> Result<Snapshot> {
    let alert = |name: &str, env: &str, instance: &str, state: &str, ams: &[&str]| {
        json!({
            "labels": {"alertname": name, "env": env, "instance": instance},
            "state": state,
            "upstreams": ams
                .iter()
                .map(|am| json!({"name": am, "cluster": "ha"}))
                .collect::<Vec<_>>(),
        })
    };
    let raw = json!({
        "groups": [
            {
                "id": "a1",
                "receiver": "pager",
                "labels": {"alertname": "NodeDown"},
                "latest_starts_at": "2024-05-01T10:00:00Z",
                "alerts": [
                    alert("NodeDown", "prod", "node1", "active", &["am1", "am2"]),
                    alert("NodeDown", "prod", "node2", "suppressed", &["am1"]),
                ]
            },
            {
                "id": "b2",
                "receiver": "pager",
                "labels": {"alertname": "DiskFull"},
                "latest_starts_at": "2024-05-01T12:00:00Z",
                "alerts": [alert("DiskFull", "staging", "node3", "active", &["am2"])]
            },
            {
                "id": "c3",
                "receiver": "email",
                "labels": {"alertname": "HighLoad"},
                "latest_starts_at": "2024-05-01T11:00:00Z",
                "alerts": [alert("HighLoad", "prod", "node4", "unprocessed", &["am1"])]
            }
        ],
        "upstreams": [
            {"name": "am2", "uri": "http://am2:9093", "cluster": "ha",
             "cluster_members": ["am1", "am2"], "error": "timeout"},
            {"name": "am1", "uri": "http://am1:9093", "cluster": "ha",
             "cluster_members": ["am1", "am2"]}
        ]
    });
    Ok(Snapshot::from_json(&raw.to_string())?)
}

fn grid_ids(view: &alertview_core::View) -> Vec<(String, Vec<String>)> {
    view.grids
        .iter()
        .map(|g| {
            (
                g.label_value.clone(),
                g.alert_groups.iter().map(|ag| ag.id.clone()).collect(),
            )
        })
        .collect()
}

#[test]
fn auto_grid_splits_on_env_and_sorts_most_recent_first() -> Result<()> {
    let snapshot = snapshot()?;
    let view = render_view(&snapshot, &ViewRequest::default(), &Config::default(), &[]);

    assert_eq!(view.total_groups, 3);
    assert_eq!(view.total_alerts, 4);
    assert_eq!(
        grid_ids(&view),
        vec![
            ("prod".to_string(), vec!["c3".to_string(), "a1".to_string()]),
            ("staging".to_string(), vec!["b2".to_string()]),
        ]
    );
    assert!(view.grids.iter().all(|g| g.label_name == "env"));
    assert_eq!(view.grids[0].state_count[&AlertState::Suppressed], 1);

    let env = view
        .labels
        .iter()
        .find(|l| l.name == "env")
        .expect("env stats");
    assert_eq!(env.hits, 4);
    assert_eq!(env.values[0].value, "prod");
    assert_eq!(env.values[0].percent, 75);
    assert_eq!(env.values[1].offset, 75);

    assert_eq!(view.upstreams.counters.total, 2);
    assert_eq!(view.upstreams.counters.failed, 1);
    assert_eq!(view.upstreams.instances[0].name, "am1");
    Ok(())
}

#[test]
fn upstream_filter_narrows_alerts_and_counts() -> Result<()> {
    let snapshot = snapshot()?;
    let filters: Vec<Box<dyn Filter>> =
        vec![Box::new(AlertFilter::upstream(Comparison::Equal, "am1"))];
    let request = ViewRequest {
        grid_label: Some(String::new()),
        sort_order: Some(SortOrder::Disabled),
        ..ViewRequest::default()
    };
    let view = render_view(&snapshot, &request, &Config::default(), &filters);

    assert_eq!(view.grids.len(), 1);
    let groups = &view.grids[0].alert_groups;
    let ids: Vec<&str> = groups.iter().map(|g| g.id.as_str()).collect();
    // disabled order with the configured reverse flag: ascending identifiers
    assert_eq!(ids, vec!["a1", "c3"]);
    let a1 = &groups[0];
    assert_eq!(a1.upstream_count.get("am2"), None);
    assert_eq!(a1.upstream_count["am1"], 2);
    assert_eq!(view.total_alerts, 3);

    // the snapshot still carries both upstreams
    assert_eq!(snapshot.groups[0].alerts[0].upstreams.len(), 2);
    Ok(())
}

#[test]
fn label_sort_with_custom_values_and_reversed_grids() -> Result<()> {
    let config = parse_config(
        r#"
[grid]
label = "env"
reverse = true

[grid.sorting]
order = "label"
reverse = false
label = "alertname"

[grid.sorting.custom_values.labels.alertname]
NodeDown = "0"
"#,
    )?;
    let snapshot = snapshot()?;
    let view = render_view(&snapshot, &ViewRequest::default(), &config, &[]);
    assert_eq!(
        grid_ids(&view),
        vec![
            ("staging".to_string(), vec!["b2".to_string()]),
            ("prod".to_string(), vec!["a1".to_string(), "c3".to_string()]),
        ]
    );
    Ok(())
}

#[test]
fn rendering_is_deterministic_across_threads() -> Result<()> {
    let snapshot = snapshot()?;
    let config = Config::default();
    let request = ViewRequest {
        sort_order: Some(SortOrder::Label),
        sort_label: Some("instance".to_string()),
        ..ViewRequest::default()
    };
    let baseline = serde_json::to_string(&render_view(&snapshot, &request, &config, &[]))?;

    let (snapshot, request, config) = (&snapshot, &request, &config);
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(move || {
                    let filters: Vec<Box<dyn Filter>> = vec![Box::new(AlertFilter::limit(10))];
                    serde_json::to_string(&render_view(snapshot, request, config, &filters))
                })
            })
            .collect();
        for handle in handles {
            let rendered = handle.join().expect("render thread").expect("serialize view");
            assert_eq!(rendered, baseline);
        }
    });
    Ok(())
}

#[test]
fn limit_filter_keeps_the_first_accepted_alerts() -> Result<()> {
    let snapshot = snapshot()?;
    let filters: Vec<Box<dyn Filter>> = vec![
        Box::new(AlertFilter::label("env", Comparison::Equal, "prod")),
        Box::new(AlertFilter::limit(2)),
    ];
    let view = render_view(&snapshot, &ViewRequest::default(), &Config::default(), &filters);
    assert_eq!(view.total_alerts, 2);
    assert_eq!(view.total_groups, 1);
    assert_eq!(view.grids[0].alert_groups[0].id, "a1");
    Ok(())
}
