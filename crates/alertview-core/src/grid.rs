use std::collections::BTreeMap;

use serde::Serialize;

use crate::autogrid::select_label;
use crate::config::AutoGridConfig;
use crate::labels::LabelResolver;
use crate::models::{new_state_count, AlertGroup, StateCount};
use crate::natural::natural_cmp;
use crate::sorting::{compare_label_values, sort_groups, SortConfig};

pub const AUTO_GRID_LABEL: &str = "@auto";
pub const RECEIVER_GRID_LABEL: &str = "@receiver";

/// What to split grids on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridLabel {
    /// Let [`select_label`] pick a label.
    Auto,
    /// A single grid with every group.
    Disabled,
    /// The group receiver name.
    Receiver,
    Label(String),
}

impl GridLabel {
    pub fn parse(raw: &str) -> Self {
        match raw {
            AUTO_GRID_LABEL => GridLabel::Auto,
            "" => GridLabel::Disabled,
            RECEIVER_GRID_LABEL => GridLabel::Receiver,
            name => GridLabel::Label(name.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Grid {
    pub label_name: String,
    /// Raw value the grid is keyed on, empty for groups lacking the label.
    pub label_value: String,
    /// `label_value` after display substitution.
    pub display_value: String,
    pub alert_groups: Vec<AlertGroup>,
    pub state_count: StateCount,
}

pub struct GridPartitioner<'a> {
    pub resolver: &'a LabelResolver,
    pub auto: &'a AutoGridConfig,
}

impl<'a> GridPartitioner<'a> {
    pub fn new(resolver: &'a LabelResolver, auto: &'a AutoGridConfig) -> Self {
        Self { resolver, auto }
    }

    /// Name of the label grids are keyed on; empty when grids are not split.
    pub fn label_name(&self, groups: &[AlertGroup], label: &GridLabel) -> String {
        match label {
            GridLabel::Auto => select_label(groups, self.auto),
            GridLabel::Disabled => String::new(),
            GridLabel::Receiver => RECEIVER_GRID_LABEL.to_string(),
            GridLabel::Label(name) => name.clone(),
        }
    }

    /// Splits `groups` into grids. Groups inside a grid follow `sort`; the
    /// grids follow their display value, with the grid of groups lacking the
    /// label placed last in the visual order selected by `reverse`.
    pub fn partition(
        &self,
        groups: Vec<AlertGroup>,
        label: &GridLabel,
        sort: &SortConfig,
        reverse: bool,
    ) -> Vec<Grid> {
        let label_name = self.label_name(&groups, label);

        let mut buckets: BTreeMap<String, Vec<AlertGroup>> = BTreeMap::new();
        for group in groups {
            let key = grid_key(&group, &label_name).to_string();
            buckets.entry(key).or_default().push(group);
        }

        let mut grids: Vec<Grid> = buckets
            .into_iter()
            .map(|(value, mut alert_groups)| {
                sort_groups(&mut alert_groups, sort, self.resolver);
                let mut state_count = new_state_count();
                for group in &alert_groups {
                    for (state, count) in &group.state_count {
                        *state_count.entry(*state).or_insert(0) += count;
                    }
                }
                Grid {
                    label_name: label_name.clone(),
                    display_value: self.resolver.resolve(&label_name, &value).to_string(),
                    label_value: value,
                    alert_groups,
                    state_count,
                }
            })
            .collect();

        grids.sort_by(|a, b| {
            compare_label_values(&a.display_value, &b.display_value, reverse)
                .then_with(|| natural_cmp(&a.label_value, &b.label_value))
        });
        grids
    }
}

fn grid_key<'g>(group: &'g AlertGroup, label_name: &str) -> &'g str {
    match label_name {
        "" => "",
        RECEIVER_GRID_LABEL => group.receiver.as_str(),
        name => group.grid_value(name).unwrap_or(""),
    }
}
