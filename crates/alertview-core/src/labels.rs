use std::collections::BTreeMap;

use crate::models::AlertGroup;

/// Maps raw label values to configured display substitutions.
#[derive(Debug, Clone, Default)]
pub struct LabelResolver {
    substitutions: BTreeMap<String, BTreeMap<String, String>>,
}

impl LabelResolver {
    pub fn new(substitutions: BTreeMap<String, BTreeMap<String, String>>) -> Self {
        Self { substitutions }
    }

    /// Substituted value for `value` of label `name`, or `value` itself.
    pub fn resolve<'a>(&'a self, name: &str, value: &'a str) -> &'a str {
        self.substitutions
            .get(name)
            .and_then(|values| values.get(value))
            .map(String::as_str)
            .unwrap_or(value)
    }

    /// Display value of label `name` for a group, empty when the group
    /// does not carry it.
    pub fn group_value<'a>(&'a self, group: &'a AlertGroup, name: &str) -> &'a str {
        match group.label_value(name) {
            Some(raw) => self.resolve(name, raw),
            None => "",
        }
    }
}
