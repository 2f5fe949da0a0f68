//! Filtering and grouping of indexed measurements.
//!
//! A [`SetupFilter`] selects setups by bitmask and wildcards the attributes
//! whose mask is zero; setups that only differ in wildcarded attributes are
//! merged into one group. Labels name the dimensions that stay fixed (chart
//! title) and the ones that vary between groups (legend).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thrust_core::error::{Result, ThrustError};
use thrust_core::formatting::{chart_title, count_label, join_labels};
use thrust_core::models::{
    Attribute, IndexedMap, IndexedSetup, Measurement, SetupDictionary, SetupFilter,
};
use thrust_core::settings::Settings;
use tracing::debug;

// ── Labels ────────────────────────────────────────────────────────────────────

/// Display label of one attribute across the surviving setups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeLabel {
    /// Exactly one value remains.
    Single(String),
    /// Several (or zero) values remain.
    Count { attribute: Attribute, count: usize },
}

impl fmt::Display for AttributeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeLabel::Single(value) => f.write_str(value),
            AttributeLabel::Count { attribute, count } => {
                f.write_str(&count_label(*attribute, *count))
            }
        }
    }
}

// ── Grouped view ──────────────────────────────────────────────────────────────

/// Measurements merged under one filter-collapsed key.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// Collapsed key; wildcarded attributes are zero.
    pub key: IndexedSetup,
    /// Legend label naming the varying dimensions.
    pub label: String,
    /// Original setups merged into this group.
    pub setups: Vec<IndexedSetup>,
    pub measurements: Vec<Measurement>,
}

/// Result of grouping an indexed map under a filter.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedView {
    pub title: String,
    pub labels: BTreeMap<Attribute, AttributeLabel>,
    /// Groups in collapsed-key order.
    pub groups: Vec<Group>,
}

impl GroupedView {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn measurement_count(&self) -> usize {
        self.groups.iter().map(|g| g.measurements.len()).sum()
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Keep matching setups and merge them under their collapsed keys.
///
/// Measurement lists are concatenated in original key order. A filter that
/// matches nothing yields an empty map.
pub fn apply_filter(index: &IndexedMap, filter: &SetupFilter) -> IndexedMap {
    let mut filtered = IndexedMap::new();
    for (setup, measurements) in index {
        if let Some(key) = filter.collapse(setup) {
            filtered
                .entry(key)
                .or_default()
                .extend(measurements.iter().copied());
        }
    }
    filtered
}

/// Original keys of every setup that passes `filter`.
pub fn surviving_setups(index: &IndexedMap, filter: &SetupFilter) -> Vec<IndexedSetup> {
    index.keys().filter(|s| filter.matches(s)).copied().collect()
}

/// Label of every attribute over `survivors`.
pub fn attribute_labels(
    dictionary: &SetupDictionary,
    survivors: &[IndexedSetup],
) -> BTreeMap<Attribute, AttributeLabel> {
    Attribute::ALL
        .into_iter()
        .map(|attr| {
            let bits: BTreeSet<u64> = survivors.iter().map(|s| s.bit(attr)).collect();
            let single = match bits.len() {
                1 => bits
                    .first()
                    .and_then(|bit| dictionary.resolve(attr, *bit)),
                _ => None,
            };
            let label = match single {
                Some(value) => AttributeLabel::Single(value.to_string()),
                None => AttributeLabel::Count {
                    attribute: attr,
                    count: bits.len(),
                },
            };
            (attr, label)
        })
        .collect()
}

/// Filter, merge and label the indexed measurements.
pub fn group_measurements(
    dictionary: &SetupDictionary,
    index: &IndexedMap,
    filter: &SetupFilter,
) -> GroupedView {
    let survivors = surviving_setups(index, filter);
    let labels = attribute_labels(dictionary, &survivors);

    let title_parts: Vec<String> = Attribute::ALL
        .into_iter()
        .filter_map(|attr| {
            let label = &labels[&attr];
            match label {
                AttributeLabel::Single(value) => Some(value.clone()),
                AttributeLabel::Count { count, .. } if filter.is_wildcard(attr) && *count > 1 => {
                    Some(label.to_string())
                }
                AttributeLabel::Count { .. } => None,
            }
        })
        .collect();
    let title = chart_title(&title_parts);

    let varying: Vec<Attribute> = Attribute::ALL
        .into_iter()
        .filter(|attr| {
            !filter.is_wildcard(*attr)
                && matches!(labels[attr], AttributeLabel::Count { count, .. } if count > 1)
        })
        .collect();

    let mut members: BTreeMap<IndexedSetup, Vec<IndexedSetup>> = BTreeMap::new();
    for setup in &survivors {
        if let Some(key) = filter.collapse(setup) {
            members.entry(key).or_default().push(*setup);
        }
    }

    let groups: Vec<Group> = apply_filter(index, filter)
        .into_iter()
        .map(|(key, measurements)| {
            let label = group_label(dictionary, &key, &varying, &labels);
            Group {
                key,
                label,
                setups: members.remove(&key).unwrap_or_default(),
                measurements,
            }
        })
        .collect();

    debug!(
        "Filter kept {} of {} setup(s) in {} group(s)",
        survivors.len(),
        index.len(),
        groups.len()
    );

    GroupedView {
        title,
        labels,
        groups,
    }
}

/// Number of setups with `attr == bit` that would pass `filter` if `bit`
/// were added to its selection.
pub fn available_count(
    index: &IndexedMap,
    filter: &SetupFilter,
    attr: Attribute,
    bit: u64,
) -> usize {
    let mut extended = *filter;
    extended.set_mask(attr, filter.mask(attr) | bit);
    index
        .keys()
        .filter(|setup| setup.bit(attr) == bit && extended.matches(setup))
        .count()
}

/// Build a filter from command-line selections.
///
/// Grouped attributes are wildcarded, attributes with named values select
/// exactly those values, everything else selects all known values. Naming
/// values for a grouped attribute is rejected.
pub fn build_filter(dictionary: &SetupDictionary, settings: &Settings) -> Result<SetupFilter> {
    let group_by = settings.group_by_attributes()?;
    let mut filter = SetupFilter::wildcard();
    for attr in Attribute::ALL {
        if group_by.contains(&attr) {
            let selected = settings.selected_values(attr);
            if !selected.is_empty() {
                return Err(ThrustError::Config(format!(
                    "--group-by {attr} cannot be combined with --{attr} {}",
                    selected.join(",")
                )));
            }
            filter.group_by(attr);
            continue;
        }
        let selected = settings.selected_values(attr);
        if selected.is_empty() {
            filter.select_all(attr, dictionary);
            continue;
        }
        let mut mask = 0;
        for value in selected {
            mask |= dictionary.bit_for(attr, value)?;
        }
        filter.set_mask(attr, mask);
    }
    Ok(filter)
}

// ── Private helpers ───────────────────────────────────────────────────────────

/// Legend label of one group: its values of the varying attributes, or the
/// fixed values when nothing varies.
fn group_label(
    dictionary: &SetupDictionary,
    key: &IndexedSetup,
    varying: &[Attribute],
    labels: &BTreeMap<Attribute, AttributeLabel>,
) -> String {
    if varying.is_empty() {
        return join_labels(labels.values().filter_map(|label| match label {
            AttributeLabel::Single(value) => Some(value.as_str()),
            AttributeLabel::Count { .. } => None,
        }));
    }
    join_labels(
        varying
            .iter()
            .filter_map(|attr| dictionary.resolve(*attr, key.bit(*attr))),
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────
