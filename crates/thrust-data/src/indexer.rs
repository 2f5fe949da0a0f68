//! Dimension indexing: distinct values per attribute and one-hot setup keys.

use std::collections::BTreeSet;

use thrust_core::error::Result;
use thrust_core::models::{Attribute, IndexedMap, MeasurementMap, SetupDictionary};
use tracing::debug;

/// Sorted distinct values of every attribute across all setups.
///
/// Fails when an attribute has more distinct values than fit in a `u64`.
pub fn determine_unique_values(map: &MeasurementMap) -> Result<SetupDictionary> {
    let mut dictionary = SetupDictionary::default();
    for attr in Attribute::ALL {
        let values: BTreeSet<&str> = map.keys().map(|setup| setup.get(attr)).collect();
        debug!("{} distinct {} value(s)", values.len(), attr);
        dictionary = dictionary.with_values(attr, values.into_iter().map(str::to_string))?;
    }
    Ok(dictionary)
}

/// Re-key `map` by indexed setups computed against `dictionary`.
pub fn index_measurement_map(
    dictionary: &SetupDictionary,
    map: &MeasurementMap,
) -> Result<IndexedMap> {
    map.iter()
        .map(|(setup, measurements)| Ok((dictionary.encode(setup)?, measurements.clone())))
        .collect()
}

/// Build the dictionary and the indexed map in one step.
pub fn index_measurements(map: &MeasurementMap) -> Result<(SetupDictionary, IndexedMap)> {
    let dictionary = determine_unique_values(map)?;
    let index = index_measurement_map(&dictionary, map)?;
    Ok((dictionary, index))
}
