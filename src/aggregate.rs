//! Merging of per-source items into the single list shown on the board.
//!
//! Everything here is pure: the same input sequence always yields the same
//! output, so re-running a cycle on an unchanged snapshot does not reshuffle
//! the board.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Deserialize;

use crate::item::CanonicalItem;
use crate::registry::Registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMode {
    /// Up to `per_source` newest items of every source first, in registry
    /// order, then everything else newest first.
    #[default]
    Interleave,
    /// One global newest-first ordering.
    Recency,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregationConfig {
    #[serde(default)]
    pub mode: AggregationMode,
    #[serde(default = "default_per_source")]
    pub per_source: usize,
    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

fn default_per_source() -> usize {
    2
}

fn default_max_items() -> usize {
    50
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            mode: AggregationMode::default(),
            per_source: default_per_source(),
            max_items: default_max_items(),
        }
    }
}

/// Newest first. Items without a timestamp compare as the oldest.
pub fn newest_first(a: &CanonicalItem, b: &CanonicalItem) -> Ordering {
    // `None < Some(_)`, so reversing puts missing timestamps last.
    b.published_at.cmp(&a.published_at)
}

/// Split items into the top slice and the recency-ordered remainder.
///
/// The top slice holds, for each source in registry order, up to
/// `per_source` of its newest items. The remainder is every other item,
/// newest first. Both sorts are stable, so ties keep input order.
pub fn partition(
    items: Vec<CanonicalItem>,
    registry: &Registry,
    per_source: usize,
) -> (Vec<CanonicalItem>, Vec<CanonicalItem>) {
    let mut selected = vec![false; items.len()];
    let mut top_order = Vec::new();

    for source in registry.iter() {
        let mut own: Vec<usize> = (0..items.len())
            .filter(|&i| items[i].source == source.name)
            .collect();
        own.sort_by(|&a, &b| newest_first(&items[a], &items[b]));

        for &i in own.iter().take(per_source) {
            selected[i] = true;
            top_order.push(i);
        }
    }

    let mut slots: Vec<Option<CanonicalItem>> = items.into_iter().map(Some).collect();

    let top_slice: Vec<CanonicalItem> = top_order
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect();

    let mut remainder: Vec<CanonicalItem> = slots
        .into_iter()
        .zip(selected)
        .filter(|(_, picked)| !picked)
        .filter_map(|(slot, _)| slot)
        .collect();
    remainder.sort_by(newest_first);

    (top_slice, remainder)
}

/// Drop repeated identities, keeping the first occurrence.
pub fn dedup(mut items: Vec<CanonicalItem>) -> Vec<CanonicalItem> {
    let mut seen = HashSet::new();
    items.retain(|item| seen.insert((item.link.clone(), item.source.clone(), item.published_at)));
    items
}

/// Build one cycle's board list from the union of fetched items.
pub fn aggregate(
    items: Vec<CanonicalItem>,
    registry: &Registry,
    config: &AggregationConfig,
) -> Vec<CanonicalItem> {
    let items = dedup(items);

    let mut list = match config.mode {
        AggregationMode::Interleave => {
            let (mut top_slice, remainder) = partition(items, registry, config.per_source);
            top_slice.extend(remainder);
            top_slice
        }
        AggregationMode::Recency => {
            let mut items = items;
            items.sort_by(newest_first);
            items
        }
    };

    list.truncate(config.max_items);
    list
}
