//! Interchange file consumed by the web viewer.
//!
//! The file lists the distinct values of every attribute (`items`) and one
//! string-form row per setup (`measurements`). Output is deterministic: keys
//! and rows are sorted and nothing time-dependent is written.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thrust_core::error::Result;
use thrust_core::models::{Attribute, MeasurementMap, SetupDictionary};
use tracing::info;

/// Serialized interchange document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterchangeData {
    /// Sorted distinct values keyed by attribute name.
    pub items: BTreeMap<String, Vec<String>>,
    /// Setup rows in `motor, cells, prop, esc, author, session` order.
    pub measurements: Vec<[String; 6]>,
}

impl InterchangeData {
    pub fn new(dictionary: &SetupDictionary, map: &MeasurementMap) -> Self {
        let items = Attribute::ALL
            .into_iter()
            .map(|attr| (attr.name().to_string(), dictionary.values(attr).to_vec()))
            .collect();
        let measurements = map.keys().map(|setup| setup.to_row()).collect();
        Self {
            items,
            measurements,
        }
    }

    /// Pretty JSON with a four-space indent.
    pub fn to_json(&self) -> Result<String> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8(buffer).map_err(anyhow::Error::from)?)
    }
}

/// Write the interchange file, creating parent directories as needed.
///
/// The content goes to a temporary sibling first and is renamed into place.
pub fn write_interchange(data: &InterchangeData, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let json = data.to_json()?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;

    info!(
        "Wrote {} setup(s) to {}",
        data.measurements.len(),
        path.display()
    );
    Ok(())
}
