use std::collections::BTreeMap;

use tracing::debug;

use crate::config::AutoGridConfig;
use crate::models::AlertGroup;

/// Picks the label that best splits `groups` into grids, or an empty string
/// when no label qualifies.
///
/// A label qualifies when every alert carries it, it is not ignored, and the
/// number of distinct values is above one and below both the alert and the
/// group count. The label with the fewest distinct values wins; ties go to
/// the label listed first in `config.order`, then to the smaller name.
pub fn select_label(groups: &[AlertGroup], config: &AutoGridConfig) -> String {
    let group_count = groups.len();
    let mut alert_count = 0usize;
    let mut occurrences: BTreeMap<&str, BTreeMap<&str, usize>> = BTreeMap::new();
    for group in groups {
        alert_count += group.alerts.len();
        for alert in &group.alerts {
            for (name, value) in &alert.labels {
                *occurrences
                    .entry(name.as_str())
                    .or_default()
                    .entry(value.as_str())
                    .or_insert(0) += 1;
            }
        }
    }
    debug!(
        alerts = alert_count,
        groups = group_count,
        "alerts count for automatic grid label"
    );

    let mut best: Option<(&str, usize)> = None;
    for (&name, values) in &occurrences {
        if config.ignore.iter().any(|ignored| ignored == name) {
            continue;
        }
        let total: usize = values.values().sum();
        debug!(label = name, alerts = total, "number of alerts per label");
        if total < alert_count {
            continue;
        }

        let variants = values.len();
        if variants == 1 || variants >= alert_count || variants >= group_count {
            debug!(
                label = name,
                variants,
                alerts = alert_count,
                groups = group_count,
                "excluding label from automatic grid selection"
            );
            continue;
        }
        debug!(label = name, variants, "automatic grid label candidate");

        best = match best {
            Some((current, count))
                if variants > count
                    || (variants == count && !is_preferred(name, current, &config.order)) =>
            {
                Some((current, count))
            }
            _ => Some((name, variants)),
        };
    }

    best.map(|(name, _)| name.to_string()).unwrap_or_default()
}

/// Whether `label` beats `other` on a tie. Labels on the preferred list win
/// over labels that are not, earlier entries win over later ones.
fn is_preferred(label: &str, other: &str, order: &[String]) -> bool {
    let position = |name: &str| order.iter().position(|o| o == name);
    match (position(label), position(other)) {
        (Some(a), Some(b)) => a < b,
        (Some(_), None) => true,
        (None, Some(_)) => false,
        (None, None) => label < other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::*;

    fn single_alert_groups(rows: &[&[(&str, &str)]]) -> Vec<AlertGroup> {
        rows.iter()
            .enumerate()
            .map(|(i, pairs)| group(&format!("g{i}"), 0, vec![alert(pairs, &["am"])]))
            .collect()
    }

    fn cfg(ignore: &[&str], order: &[&str]) -> AutoGridConfig {
        AutoGridConfig {
            ignore: ignore.iter().map(|s| s.to_string()).collect(),
            order: order.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn selects_fully_covering_label_over_partial_one() {
        let groups = single_alert_groups(&[
            &[("alertname", "Down"), ("env", "prod"), ("team", "a"), ("instance", "1")],
            &[("alertname", "Down"), ("env", "staging"), ("team", "b"), ("instance", "2")],
            &[("alertname", "Down"), ("env", "prod"), ("instance", "3")],
            &[("alertname", "Down"), ("env", "staging"), ("instance", "4")],
        ]);
        assert_eq!(select_label(&groups, &cfg(&[], &[])), "env");
    }

    #[test]
    fn single_valued_label_is_never_selected() {
        let groups = single_alert_groups(&[
            &[("alertname", "Down")],
            &[("alertname", "Down")],
            &[("alertname", "Down")],
        ]);
        assert_eq!(select_label(&groups, &cfg(&[], &[])), "");
    }

    #[test]
    fn too_many_variants_are_excluded() {
        // three values over three groups would give one grid per group
        let groups = single_alert_groups(&[
            &[("env", "a")],
            &[("env", "b")],
            &[("env", "c")],
        ]);
        assert_eq!(select_label(&groups, &cfg(&[], &[])), "");
    }

    #[test]
    fn variants_must_stay_below_group_count() {
        // two groups, four alerts, two values: as many grids as groups
        let groups = vec![
            group(
                "g1",
                0,
                vec![alert(&[("env", "a")], &["am"]), alert(&[("env", "b")], &["am"])],
            ),
            group(
                "g2",
                0,
                vec![alert(&[("env", "a")], &["am"]), alert(&[("env", "b")], &["am"])],
            ),
        ];
        assert_eq!(select_label(&groups, &cfg(&[], &[])), "");
    }

    #[test]
    fn ties_follow_preferred_order_then_name() {
        let groups = single_alert_groups(&[
            &[("zone", "z1"), ("env", "prod")],
            &[("zone", "z2"), ("env", "dev")],
            &[("zone", "z1"), ("env", "prod")],
        ]);
        assert_eq!(select_label(&groups, &cfg(&[], &[])), "env");
        assert_eq!(select_label(&groups, &cfg(&[], &["zone"])), "zone");
        assert_eq!(select_label(&groups, &cfg(&[], &["env", "zone"])), "env");
        assert_eq!(select_label(&groups, &cfg(&["env"], &[])), "zone");
    }

    #[test]
    fn fewer_variants_win_over_preference() {
        let groups = single_alert_groups(&[
            &[("zone", "z1"), ("env", "prod")],
            &[("zone", "z2"), ("env", "dev")],
            &[("zone", "z3"), ("env", "prod")],
            &[("zone", "z1"), ("env", "dev")],
        ]);
        assert_eq!(select_label(&groups, &cfg(&[], &["zone"])), "env");
    }

    #[test]
    fn empty_snapshot_has_no_label() {
        assert_eq!(select_label(&[], &AutoGridConfig::default()), "");
    }
}
