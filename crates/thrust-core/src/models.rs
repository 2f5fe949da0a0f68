use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ThrustError};

/// Maximum number of distinct values an attribute can hold in indexed form.
pub const MAX_DISTINCT_VALUES: usize = u64::BITS as usize;

/// String-form aggregation: every measurement grouped under its setup.
pub type MeasurementMap = BTreeMap<Setup, Vec<Measurement>>;

/// Indexed-form aggregation: measurements grouped under one-hot setup keys.
pub type IndexedMap = BTreeMap<IndexedSetup, Vec<Measurement>>;

// ── Attribute ─────────────────────────────────────────────────────────────────

/// One dimension of a test setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    /// Motor name, taken from the CSV file name.
    Motor,
    /// Battery cell count, e.g. `"3S"`.
    Cells,
    /// Propeller.
    Prop,
    /// Electronic speed controller.
    Esc,
    /// Person who ran the test.
    Author,
    /// Test session identifier.
    Session,
}

impl Attribute {
    /// Every attribute, in declaration order.
    pub const ALL: [Attribute; 6] = [
        Attribute::Motor,
        Attribute::Cells,
        Attribute::Prop,
        Attribute::Esc,
        Attribute::Author,
        Attribute::Session,
    ];

    /// Attributes read from CSV columns (motor comes from the file name).
    pub const COLUMNS: [Attribute; 5] = [
        Attribute::Cells,
        Attribute::Prop,
        Attribute::Esc,
        Attribute::Author,
        Attribute::Session,
    ];

    /// Lowercase name, also used as the header prefix and JSON key.
    pub fn name(self) -> &'static str {
        match self {
            Attribute::Motor => "motor",
            Attribute::Cells => "cells",
            Attribute::Prop => "prop",
            Attribute::Esc => "esc",
            Attribute::Author => "author",
            Attribute::Session => "session",
        }
    }

    /// Plural noun used in count labels such as `"3 authors"`.
    pub fn plural(self) -> &'static str {
        match self {
            Attribute::Motor => "motors",
            Attribute::Cells => "cell counts",
            Attribute::Prop => "props",
            Attribute::Esc => "ESCs",
            Attribute::Author => "authors",
            Attribute::Session => "sessions",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Attribute {
    type Err = ThrustError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        Attribute::ALL
            .into_iter()
            .find(|attr| attr.name() == lower)
            .ok_or_else(|| ThrustError::Config(format!("Unknown setup attribute: {}", s)))
    }
}

// ── Measurement ───────────────────────────────────────────────────────────────

/// One bench-test sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Supply voltage in volts.
    #[serde(rename = "U")]
    pub voltage: f64,
    /// Current draw in amps.
    #[serde(rename = "I")]
    pub current: f64,
    /// Thrust in grams.
    pub thrust: f64,
    /// Rotor speed, when the bench recorded it.
    #[serde(default)]
    pub rpm: Option<f64>,
}

impl Measurement {
    pub fn new(voltage: f64, current: f64, thrust: f64, rpm: Option<f64>) -> Self {
        Self {
            voltage,
            current,
            thrust,
            rpm,
        }
    }
}

// ── Setup (string form) ───────────────────────────────────────────────────────

/// Test configuration holding the literal values observed in the data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Setup {
    pub motor: String,
    pub cells: String,
    pub prop: String,
    pub esc: String,
    pub author: String,
    pub session: String,
}

impl Setup {
    pub fn new(
        motor: impl Into<String>,
        cells: impl Into<String>,
        prop: impl Into<String>,
        esc: impl Into<String>,
        author: impl Into<String>,
        session: impl Into<String>,
    ) -> Self {
        Self {
            motor: motor.into(),
            cells: cells.into(),
            prop: prop.into(),
            esc: esc.into(),
            author: author.into(),
            session: session.into(),
        }
    }

    pub fn get(&self, attr: Attribute) -> &str {
        match attr {
            Attribute::Motor => &self.motor,
            Attribute::Cells => &self.cells,
            Attribute::Prop => &self.prop,
            Attribute::Esc => &self.esc,
            Attribute::Author => &self.author,
            Attribute::Session => &self.session,
        }
    }

    /// Values in [`Attribute::ALL`] order, as written to the interchange file.
    pub fn to_row(&self) -> [String; 6] {
        Attribute::ALL.map(|attr| self.get(attr).to_string())
    }
}

// ── IndexedSetup ──────────────────────────────────────────────────────────────

/// Test configuration where each attribute is a one-hot bit into the sorted
/// distinct values of that attribute. A zero attribute is a wildcard.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct IndexedSetup {
    pub motor: u64,
    pub cells: u64,
    pub prop: u64,
    pub esc: u64,
    pub author: u64,
    pub session: u64,
}

impl IndexedSetup {
    pub fn bit(&self, attr: Attribute) -> u64 {
        match attr {
            Attribute::Motor => self.motor,
            Attribute::Cells => self.cells,
            Attribute::Prop => self.prop,
            Attribute::Esc => self.esc,
            Attribute::Author => self.author,
            Attribute::Session => self.session,
        }
    }

    pub fn set_bit(&mut self, attr: Attribute, bit: u64) {
        let slot = match attr {
            Attribute::Motor => &mut self.motor,
            Attribute::Cells => &mut self.cells,
            Attribute::Prop => &mut self.prop,
            Attribute::Esc => &mut self.esc,
            Attribute::Author => &mut self.author,
            Attribute::Session => &mut self.session,
        };
        *slot = bit;
    }
}

// ── SetupFilter ───────────────────────────────────────────────────────────────

/// Per-attribute selection masks. `0` ignores the attribute (wildcard),
/// anything else keeps setups whose bit is part of the mask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetupFilter {
    masks: IndexedSetup,
}

impl SetupFilter {
    /// Filter with every attribute wildcarded.
    pub fn wildcard() -> Self {
        Self::default()
    }

    /// Filter selecting every known value of every attribute.
    pub fn all(dictionary: &SetupDictionary) -> Self {
        let mut filter = Self::default();
        for attr in Attribute::ALL {
            filter.select_all(attr, dictionary);
        }
        filter
    }

    pub fn mask(&self, attr: Attribute) -> u64 {
        self.masks.bit(attr)
    }

    pub fn set_mask(&mut self, attr: Attribute, mask: u64) {
        self.masks.set_bit(attr, mask);
    }

    pub fn is_wildcard(&self, attr: Attribute) -> bool {
        self.mask(attr) == 0
    }

    /// Flip one value in or out of the selection.
    pub fn toggle(&mut self, attr: Attribute, bit: u64) {
        self.set_mask(attr, self.mask(attr) ^ bit);
    }

    /// Select every known value of `attr`.
    pub fn select_all(&mut self, attr: Attribute, dictionary: &SetupDictionary) {
        self.set_mask(attr, dictionary.full_mask(attr));
    }

    /// Stop distinguishing between values of `attr`.
    pub fn group_by(&mut self, attr: Attribute) {
        self.set_mask(attr, 0);
    }

    pub fn matches(&self, setup: &IndexedSetup) -> bool {
        Attribute::ALL.into_iter().all(|attr| {
            let mask = self.mask(attr);
            mask == 0 || setup.bit(attr) & mask != 0
        })
    }

    /// The key `setup` is grouped under, or `None` when it is filtered out.
    pub fn collapse(&self, setup: &IndexedSetup) -> Option<IndexedSetup> {
        if !self.matches(setup) {
            return None;
        }
        let mut key = *setup;
        for attr in Attribute::ALL {
            if self.is_wildcard(attr) {
                key.set_bit(attr, 0);
            }
        }
        Some(key)
    }
}

// ── SetupDictionary ───────────────────────────────────────────────────────────

/// Sorted distinct values per attribute for one snapshot of the data.
///
/// Bits handed out by [`SetupDictionary::encode`] are only meaningful
/// relative to the dictionary that produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupDictionary {
    pub motor: Vec<String>,
    pub cells: Vec<String>,
    pub prop: Vec<String>,
    pub esc: Vec<String>,
    pub author: Vec<String>,
    pub session: Vec<String>,
}

impl SetupDictionary {
    /// Replace the values of `attr`, sorting and deduplicating them.
    ///
    /// Fails when more values remain than fit in a `u64` mask.
    pub fn with_values(
        mut self,
        attr: Attribute,
        values: impl IntoIterator<Item = String>,
    ) -> Result<Self> {
        let mut values: Vec<String> = values.into_iter().collect();
        values.sort();
        values.dedup();
        if values.len() > MAX_DISTINCT_VALUES {
            return Err(ThrustError::TooManyValues {
                attribute: attr.name().to_string(),
                count: values.len(),
                max: MAX_DISTINCT_VALUES,
            });
        }
        *self.values_mut(attr) = values;
        Ok(self)
    }

    pub fn values(&self, attr: Attribute) -> &[String] {
        match attr {
            Attribute::Motor => &self.motor,
            Attribute::Cells => &self.cells,
            Attribute::Prop => &self.prop,
            Attribute::Esc => &self.esc,
            Attribute::Author => &self.author,
            Attribute::Session => &self.session,
        }
    }

    fn values_mut(&mut self, attr: Attribute) -> &mut Vec<String> {
        match attr {
            Attribute::Motor => &mut self.motor,
            Attribute::Cells => &mut self.cells,
            Attribute::Prop => &mut self.prop,
            Attribute::Esc => &mut self.esc,
            Attribute::Author => &mut self.author,
            Attribute::Session => &mut self.session,
        }
    }

    /// One-hot bit for `value`, or [`ThrustError::UnknownValue`].
    pub fn bit_for(&self, attr: Attribute, value: &str) -> Result<u64> {
        self.values(attr)
            .binary_search_by(|known| known.as_str().cmp(value))
            .map(|position| 1u64 << position)
            .map_err(|_| ThrustError::UnknownValue {
                attribute: attr.name().to_string(),
                value: value.to_string(),
            })
    }

    /// Original value behind a one-hot bit. `None` for zero, multi-bit masks
    /// and bits past the end of the list.
    pub fn resolve(&self, attr: Attribute, bit: u64) -> Option<&str> {
        if !bit.is_power_of_two() {
            return None;
        }
        self.values(attr)
            .get(bit.trailing_zeros() as usize)
            .map(String::as_str)
    }

    /// Mask with one bit set for every known value of `attr`.
    pub fn full_mask(&self, attr: Attribute) -> u64 {
        match self.values(attr).len() {
            0 => 0,
            MAX_DISTINCT_VALUES => u64::MAX,
            n => (1u64 << n) - 1,
        }
    }

    /// Convert a string-form setup into its indexed form.
    pub fn encode(&self, setup: &Setup) -> Result<IndexedSetup> {
        let mut indexed = IndexedSetup::default();
        for attr in Attribute::ALL {
            indexed.set_bit(attr, self.bit_for(attr, setup.get(attr))?);
        }
        Ok(indexed)
    }

    /// Convert an indexed setup back to its string form.
    ///
    /// Returns `None` when any attribute is a wildcard or unknown bit.
    pub fn decode(&self, indexed: &IndexedSetup) -> Option<Setup> {
        let [motor, cells, prop, esc, author, session] =
            Attribute::ALL.map(|attr| self.resolve(attr, indexed.bit(attr)));
        Some(Setup::new(motor?, cells?, prop?, esc?, author?, session?))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dictionary() -> SetupDictionary {
        let strs = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        SetupDictionary::default()
            .with_values(Attribute::Motor, strs(&["MotorB", "MotorA"]))
            .unwrap()
            .with_values(Attribute::Cells, strs(&["4S", "3S", "3S"]))
            .unwrap()
            .with_values(Attribute::Prop, strs(&["6030"]))
            .unwrap()
            .with_values(Attribute::Esc, strs(&["ESC1", "ESC2"]))
            .unwrap()
            .with_values(Attribute::Author, strs(&["bob", "alice", "carol"]))
            .unwrap()
            .with_values(Attribute::Session, strs(&["s1"]))
            .unwrap()
    }

    // ── Attribute ─────────────────────────────────────────────────────────────

    #[test]
    fn test_attribute_from_str() {
        assert_eq!("ESC".parse::<Attribute>().unwrap(), Attribute::Esc);
        assert_eq!(" author ".parse::<Attribute>().unwrap(), Attribute::Author);
        assert!("voltage".parse::<Attribute>().is_err());
    }

    #[test]
    fn test_attribute_columns_exclude_motor() {
        assert!(!Attribute::COLUMNS.contains(&Attribute::Motor));
        assert_eq!(Attribute::COLUMNS.len() + 1, Attribute::ALL.len());
    }

    // ── SetupDictionary ───────────────────────────────────────────────────────

    #[test]
    fn test_with_values_sorts_and_dedups() {
        let dict = sample_dictionary();
        assert_eq!(dict.cells, vec!["3S", "4S"]);
        assert_eq!(dict.author, vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_with_values_rejects_more_than_64() {
        let values = (0..65).map(|i| format!("prop-{:02}", i));
        let err = SetupDictionary::default()
            .with_values(Attribute::Prop, values)
            .unwrap_err();
        assert!(matches!(err, ThrustError::TooManyValues { count: 65, .. }));
    }

    #[test]
    fn test_with_values_accepts_exactly_64() {
        let values = (0..64).map(|i| format!("prop-{:02}", i));
        let dict = SetupDictionary::default()
            .with_values(Attribute::Prop, values)
            .unwrap();
        assert_eq!(dict.full_mask(Attribute::Prop), u64::MAX);
        assert_eq!(dict.resolve(Attribute::Prop, 1 << 63), Some("prop-63"));
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let dict = sample_dictionary();
        let setup = Setup::new("MotorB", "4S", "6030", "ESC1", "carol", "s1");
        let indexed = dict.encode(&setup).unwrap();

        assert_eq!(indexed.motor, 0b10);
        assert_eq!(indexed.cells, 0b10);
        assert_eq!(indexed.prop, 0b1);
        assert_eq!(indexed.esc, 0b1);
        assert_eq!(indexed.author, 0b100);
        assert_eq!(indexed.session, 0b1);
        assert_eq!(dict.decode(&indexed), Some(setup));
    }

    #[test]
    fn test_encode_unknown_value_fails() {
        let dict = sample_dictionary();
        let setup = Setup::new("MotorC", "4S", "6030", "ESC1", "carol", "s1");
        let err = dict.encode(&setup).unwrap_err();
        assert!(matches!(err, ThrustError::UnknownValue { .. }));
    }

    #[test]
    fn test_decode_wildcard_is_none() {
        let dict = sample_dictionary();
        let mut indexed = dict
            .encode(&Setup::new("MotorA", "3S", "6030", "ESC2", "bob", "s1"))
            .unwrap();
        indexed.set_bit(Attribute::Author, 0);
        assert!(dict.decode(&indexed).is_none());
    }

    #[test]
    fn test_resolve_rejects_multi_bit_and_out_of_range() {
        let dict = sample_dictionary();
        assert_eq!(dict.resolve(Attribute::Esc, 0b10), Some("ESC2"));
        assert_eq!(dict.resolve(Attribute::Esc, 0b11), None);
        assert_eq!(dict.resolve(Attribute::Esc, 0b100), None);
        assert_eq!(dict.resolve(Attribute::Esc, 0), None);
    }

    #[test]
    fn test_full_mask() {
        let dict = sample_dictionary();
        assert_eq!(dict.full_mask(Attribute::Author), 0b111);
        assert_eq!(dict.full_mask(Attribute::Session), 0b1);
        assert_eq!(SetupDictionary::default().full_mask(Attribute::Motor), 0);
    }

    // ── SetupFilter ───────────────────────────────────────────────────────────

    #[test]
    fn test_filter_collapse_wildcards_attributes() {
        let setup = IndexedSetup {
            motor: 0b10,
            cells: 0b1,
            prop: 0b1,
            esc: 0b100,
            author: 0b1,
            session: 0b1,
        };
        let mut filter = SetupFilter::wildcard();
        filter.set_mask(Attribute::Esc, 0b110);

        let key = filter.collapse(&setup).unwrap();
        assert_eq!(key.esc, 0b100);
        assert_eq!(key.motor, 0);
        assert_eq!(key.author, 0);
    }

    #[test]
    fn test_filter_excludes_unselected_bit() {
        let setup = IndexedSetup {
            motor: 0b1,
            ..Default::default()
        };
        let mut filter = SetupFilter::wildcard();
        filter.set_mask(Attribute::Motor, 0b10);
        assert!(!filter.matches(&setup));
        assert!(filter.collapse(&setup).is_none());
    }

    #[test]
    fn test_filter_toggle_select_all_group_by() {
        let dict = sample_dictionary();
        let mut filter = SetupFilter::all(&dict);
        assert_eq!(filter.mask(Attribute::Author), 0b111);

        filter.toggle(Attribute::Author, 0b10);
        assert_eq!(filter.mask(Attribute::Author), 0b101);
        filter.toggle(Attribute::Author, 0b10);
        assert_eq!(filter.mask(Attribute::Author), 0b111);

        filter.group_by(Attribute::Author);
        assert!(filter.is_wildcard(Attribute::Author));

        filter.select_all(Attribute::Author, &dict);
        assert_eq!(filter.mask(Attribute::Author), 0b111);
    }

    #[test]
    fn test_setup_to_row_order() {
        let setup = Setup::new("MotorA", "3S", "6030", "ESC1", "alice", "s1");
        assert_eq!(
            setup.to_row(),
            ["MotorA", "3S", "6030", "ESC1", "alice", "s1"].map(String::from)
        );
    }
}
