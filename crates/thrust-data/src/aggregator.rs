//! Measurement aggregation keyed by string-form setup.

use thrust_core::models::MeasurementMap;

use crate::extractor::Record;

// ── AggregateStats ────────────────────────────────────────────────────────────

/// Totals over an aggregation, for log output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateStats {
    pub setups: usize,
    pub measurements: usize,
}

// ── SetupAggregator ───────────────────────────────────────────────────────────

/// Collects measurements under their setup across every parsed file.
///
/// Setups only appear once at least one of their measurements parsed.
#[derive(Debug, Clone, Default)]
pub struct SetupAggregator {
    map: MeasurementMap,
}

impl SetupAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every measurement of a parsed row.
    pub fn add_record(&mut self, record: Record) {
        if record.measurements.is_empty() {
            return;
        }
        self.map
            .entry(record.setup)
            .or_default()
            .extend(record.measurements);
    }

    /// Merge another aggregation into this one, appending measurement lists.
    pub fn merge(&mut self, other: SetupAggregator) {
        for (setup, measurements) in other.map {
            self.map.entry(setup).or_default().extend(measurements);
        }
    }

    pub fn stats(&self) -> AggregateStats {
        AggregateStats {
            setups: self.map.len(),
            measurements: self.map.values().map(Vec::len).sum(),
        }
    }

    pub fn map(&self) -> &MeasurementMap {
        &self.map
    }

    pub fn into_map(self) -> MeasurementMap {
        self.map
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
