//! Top-level bench data pipeline.
//!
//! Loads every CSV file, aggregates measurements by setup and builds the
//! dimension index, returning a [`BenchAnalysis`] ready for export and
//! filtering.

use std::path::Path;

use thrust_core::error::Result;
use thrust_core::models::{IndexedMap, MeasurementMap, SetupDictionary};
use tracing::info;

use crate::export::InterchangeData;
use crate::indexer::index_measurements;
use crate::reader::load_measurements;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the analysis result.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct AnalysisMetadata {
    /// Files that were read and parsed.
    pub files_read: usize,
    /// Files skipped because of a file-scoped failure.
    pub files_skipped: usize,
    /// Distinct setups with at least one measurement.
    pub setups: usize,
    /// Total number of measurements across all setups.
    pub measurements: usize,
    /// Wall-clock seconds spent reading and parsing files.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent building the index.
    pub index_time_seconds: f64,
}

/// The complete output of [`analyze_bench_data`].
#[derive(Debug, Clone)]
pub struct BenchAnalysis {
    pub dictionary: SetupDictionary,
    /// String-form aggregation, sorted by setup.
    pub measurements: MeasurementMap,
    pub index: IndexedMap,
    pub metadata: AnalysisMetadata,
}

impl BenchAnalysis {
    /// Interchange document for the web viewer.
    pub fn interchange(&self) -> InterchangeData {
        InterchangeData::new(&self.dictionary, &self.measurements)
    }
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the full pipeline over `csv_dir`.
///
/// 1. Discover and read every CSV file, skipping files that fail.
/// 2. Aggregate measurements by string-form setup.
/// 3. Compute the distinct values per attribute and index every setup.
pub fn analyze_bench_data(csv_dir: &Path) -> Result<BenchAnalysis> {
    let load_start = std::time::Instant::now();
    let report = load_measurements(csv_dir)?;
    let load_time = load_start.elapsed().as_secs_f64();

    let index_start = std::time::Instant::now();
    let (dictionary, index) = index_measurements(&report.map)?;
    let index_time = index_start.elapsed().as_secs_f64();

    let metadata = AnalysisMetadata {
        files_read: report.files_read,
        files_skipped: report.files_skipped.len(),
        setups: report.map.len(),
        measurements: report.map.values().map(Vec::len).sum(),
        load_time_seconds: load_time,
        index_time_seconds: index_time,
    };

    info!(
        "Indexed {} setup(s): {} motor(s), {} author(s), {} session(s)",
        metadata.setups,
        dictionary.motor.len(),
        dictionary.author.len(),
        dictionary.session.len()
    );

    Ok(BenchAnalysis {
        dictionary,
        measurements: report.map,
        index,
        metadata,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
