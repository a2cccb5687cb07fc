use std::cmp::Ordering;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::labels::LabelResolver;
use crate::models::AlertGroup;
use crate::natural::natural_cmp;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "startsAt")]
    StartsAt,
    #[serde(rename = "label")]
    Label,
    /// Identifier order only.
    #[serde(rename = "disabled")]
    Disabled,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "startsAt" => Ok(SortOrder::StartsAt),
            "label" => Ok(SortOrder::Label),
            "disabled" => Ok(SortOrder::Disabled),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortConfig {
    pub order: SortOrder,
    pub reverse: bool,
    /// Label used by [`SortOrder::Label`].
    pub label: String,
}

/// Orders groups in place. The order is total: every comparison path ends
/// in an identifier comparison.
pub fn sort_groups(groups: &mut [AlertGroup], config: &SortConfig, resolver: &LabelResolver) {
    groups.sort_by(|a, b| compare_groups(a, b, config, resolver));
}

pub fn compare_groups(
    a: &AlertGroup,
    b: &AlertGroup,
    config: &SortConfig,
    resolver: &LabelResolver,
) -> Ordering {
    match config.order {
        SortOrder::StartsAt => by_starts_at(a, b, config.reverse),
        SortOrder::Label => {
            let va = resolver.group_value(a, &config.label);
            let vb = resolver.group_value(b, &config.label);
            match compare_label_values(va, vb, config.reverse) {
                // both missing or both equal: most recent first
                Ordering::Equal => by_starts_at(a, b, true),
                other => other,
            }
        }
        SortOrder::Disabled => {
            if config.reverse {
                a.id.cmp(&b.id)
            } else {
                b.id.cmp(&a.id)
            }
        }
    }
}

/// Timestamp order, ascending unless `reverse`. Identical timestamps order
/// by identifier descending whatever `reverse` says.
fn by_starts_at(a: &AlertGroup, b: &AlertGroup, reverse: bool) -> Ordering {
    if a.latest_starts_at == b.latest_starts_at {
        return b.id.cmp(&a.id);
    }
    if reverse {
        b.latest_starts_at.cmp(&a.latest_starts_at)
    } else {
        a.latest_starts_at.cmp(&b.latest_starts_at)
    }
}

/// Natural order of two resolved label values. Empty values are missing and
/// end up last in the visual order: after present values normally, before
/// them when reversed. Returns `Equal` only when both are missing or the
/// values are identical.
pub(crate) fn compare_label_values(a: &str, b: &str, reverse: bool) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => {
            if reverse {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
        (false, true) => {
            if reverse {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        (false, false) => {
            let ord = natural_cmp(a, b);
            if reverse {
                ord.reverse()
            } else {
                ord
            }
        }
    }
}
