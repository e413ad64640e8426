//! Pair catalog: maps pair ids to categories and derives the monitored set.
//!
//! Resolution is a two-tier lookup. Explicit entries win; otherwise the first
//! matching [`RangeRule`] applies; otherwise the pair is [`Category::Unknown`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Category, PairId, expand_id_ranges};

/// Inclusive id range mapped to a category. `end = None` means unbounded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RangeRule {
    pub start: u32,
    #[serde(default)]
    pub end: Option<u32>,
    pub category: Category,
}

impl RangeRule {
    pub const fn bounded(start: u32, end: u32, category: Category) -> Self {
        Self {
            start,
            end: Some(end),
            category,
        }
    }

    pub const fn from(start: u32, category: Category) -> Self {
        Self {
            start,
            end: None,
            category,
        }
    }

    pub fn contains(&self, id: PairId) -> bool {
        let id = id.get();
        id >= self.start && self.end.is_none_or(|end| id <= end)
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    explicit: BTreeMap<PairId, Category>,
    rules: Vec<RangeRule>,
}

impl Catalog {
    pub fn new(explicit: BTreeMap<PairId, Category>, rules: Vec<RangeRule>) -> Self {
        Self { explicit, rules }
    }

    /// Range inference used when no rules are configured:
    /// crypto `0..=1000`, fx/commodity `5000..=5600`, equity `6000..`.
    pub fn default_rules() -> Vec<RangeRule> {
        vec![
            RangeRule::bounded(0, 1000, Category::Crypto),
            RangeRule::bounded(5000, 5600, Category::FxOrCommodity),
            RangeRule::from(6000, Category::Equity),
        ]
    }

    pub fn category_of(&self, id: PairId) -> Category {
        if let Some(category) = self.explicit.get(&id) {
            return *category;
        }

        self.rules
            .iter()
            .find(|rule| rule.contains(id))
            .map(|rule| rule.category)
            .unwrap_or(Category::Unknown)
    }

    pub fn len(&self) -> usize {
        self.explicit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.explicit.is_empty()
    }

    /// Derive the set of pairs to monitor for the process lifetime.
    ///
    /// With an override list the ids come from [`expand_id_ranges`]; without
    /// one every explicitly catalogued id is monitored.
    pub fn monitored_set(&self, override_spec: Option<&str>) -> MonitoredSet {
        match override_spec.map(str::trim).filter(|spec| !spec.is_empty()) {
            Some(spec) => MonitoredSet::from_ids(expand_id_ranges(spec)),
            None => MonitoredSet::from_ids(self.explicit.keys().copied()),
        }
    }
}

/// Sorted, duplicate-free list of pairs watched by the keeper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitoredSet(Vec<PairId>);

impl MonitoredSet {
    pub fn from_ids(ids: impl IntoIterator<Item = PairId>) -> Self {
        let mut ids: Vec<PairId> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        Self(ids)
    }

    pub fn as_slice(&self) -> &[PairId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = PairId> + '_ {
        self.0.iter().copied()
    }

    /// Short human-readable description for startup logs, e.g. `3 pairs [0..6005]`.
    pub fn summary(&self) -> String {
        match (self.0.first(), self.0.last()) {
            (Some(first), Some(last)) => {
                format!("{} pairs [{}..{}]", self.0.len(), first, last)
            }
            _ => "0 pairs".to_string(),
        }
    }
}
