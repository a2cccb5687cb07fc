//! Label value distribution used by display legends.
//!
//! Percentages are integers that always add up to exactly 100 for a label,
//! and offsets place every value on a single 0..100 bar without gaps.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::AlertGroup;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LabelValueStats {
    pub value: String,
    /// `name=value`
    pub raw: String,
    pub hits: usize,
    pub percent: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LabelNameStats {
    pub name: String,
    pub hits: usize,
    pub values: Vec<LabelValueStats>,
}

pub type LabelNameStatsList = Vec<LabelNameStats>;

/// Occurrence counts per label name and value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelCounter {
    counts: BTreeMap<String, BTreeMap<String, usize>>,
}

impl LabelCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts the labels of every alert in `groups`.
    pub fn from_groups(groups: &[AlertGroup]) -> Self {
        let mut counter = Self::new();
        for alert in groups.iter().flat_map(|g| &g.alerts) {
            for (name, value) in &alert.labels {
                counter.add(name, value);
            }
        }
        counter
    }

    pub fn add(&mut self, name: &str, value: &str) {
        *self
            .counts
            .entry(name.to_string())
            .or_default()
            .entry(value.to_string())
            .or_insert(0) += 1;
    }

    pub fn counts(&self) -> &BTreeMap<String, BTreeMap<String, usize>> {
        &self.counts
    }

    pub fn stats(&self) -> LabelNameStatsList {
        compute(&self.counts)
    }
}

/// Builds label statistics ordered by label name. Labels without hits are
/// left out.
pub fn compute(occurrences: &BTreeMap<String, BTreeMap<String, usize>>) -> LabelNameStatsList {
    occurrences
        .iter()
        .filter_map(|(name, values)| name_stats(name, values))
        .collect()
}

fn name_stats(name: &str, values: &BTreeMap<String, usize>) -> Option<LabelNameStats> {
    let hits: usize = values.values().sum();
    if hits == 0 {
        return None;
    }

    let mut out: Vec<LabelValueStats> = values
        .iter()
        .filter(|(_, h)| **h > 0)
        .map(|(value, h)| LabelValueStats {
            value: value.clone(),
            raw: format!("{name}={value}"),
            hits: *h,
            percent: h * 100 / hits,
            offset: 0,
        })
        .collect();
    // stable: equal hits keep value order
    out.sort_by(|a, b| b.hits.cmp(&a.hits));

    let mut total: usize = out.iter().map(|v| v.percent).sum();
    while total < 100 {
        for v in out.iter_mut() {
            v.percent += 1;
            total += 1;
            if total >= 100 {
                break;
            }
        }
    }

    let mut offset = 0;
    for v in out.iter_mut() {
        v.offset = offset;
        offset += v.percent;
    }

    Some(LabelNameStats {
        name: name.to_string(),
        hits,
        values: out,
    })
}
