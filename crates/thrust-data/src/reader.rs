//! CSV discovery and loading.
//!
//! Every `*.csv` file under the data directory is read into a grid of
//! strings, its header row located and its data rows turned into records.
//! The motor name of a file is its file stem.

use std::path::{Path, PathBuf};

use thrust_core::error::{Result, ThrustError};
use thrust_core::models::MeasurementMap;
use tracing::{debug, error, info, warn};

use crate::aggregator::{AggregateStats, SetupAggregator};
use crate::extractor::{extract_records, Record};
use crate::header::locate_header;

// ── LoadReport ────────────────────────────────────────────────────────────────

/// Outcome of loading a data directory.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub map: MeasurementMap,
    pub files_read: usize,
    /// Files skipped because of a file-scoped failure.
    pub files_skipped: Vec<PathBuf>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.csv` files recursively under `csv_dir`, sorted by path.
///
/// The extension match ignores case. Entries the walk cannot read are logged;
/// those that look like CSV files are still returned so that the failure to
/// open them is reported and counted by the caller.
pub fn find_csv_files(csv_dir: &Path) -> Result<Vec<PathBuf>> {
    if !csv_dir.is_dir() {
        return Err(ThrustError::DataPathNotFound(csv_dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in walkdir::WalkDir::new(csv_dir).follow_links(true) {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && has_csv_extension(entry.path()) {
                    files.push(entry.into_path());
                }
            }
            Err(e) => {
                let path = e.path().map(Path::to_path_buf);
                match &path {
                    Some(p) => warn!("Failed to access {}: {}", p.display(), e),
                    None => warn!("Failed to walk {}: {}", csv_dir.display(), e),
                }
                if let Some(p) = path.filter(|p| has_csv_extension(p)) {
                    files.push(p);
                }
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Read a whole CSV file into rows of trimmed cells. Rows may differ in length.
pub fn read_grid(path: &Path) -> Result<Vec<Vec<String>>> {
    let file = std::fs::File::open(path).map_err(|source| ThrustError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(std::io::BufReader::new(file));

    reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect())
                .map_err(|source| ThrustError::Csv {
                    path: path.to_path_buf(),
                    source,
                })
        })
        .collect()
}

/// Motor name derived from the file name without its extension.
pub fn motor_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Read one file and extract its records.
pub fn process_single_file(path: &Path) -> Result<Vec<Record>> {
    let rows = read_grid(path)?;
    let header = locate_header(&rows, path)
        .ok_or_else(|| ThrustError::HeaderNotFound(path.to_path_buf()))?;
    let motor = motor_name(path);
    let records = extract_records(&header, &motor, &rows, path)?;

    debug!(
        "File {}: {} row(s), header at row {}, {} record(s)",
        path.display(),
        rows.len(),
        header.row + 1,
        records.len()
    );
    Ok(records)
}

/// Load every CSV file under `csv_dir` into one measurement map.
///
/// File-scoped failures are logged and the file is skipped. Anything else,
/// such as an invalid setup key, aborts the load.
pub fn load_measurements(csv_dir: &Path) -> Result<LoadReport> {
    let files = find_csv_files(csv_dir)?;
    if files.is_empty() {
        return Err(ThrustError::NoDataFiles(csv_dir.to_path_buf()));
    }

    let mut aggregator = SetupAggregator::new();
    let mut report = LoadReport::default();

    for path in &files {
        match process_single_file(path) {
            Ok(records) => {
                report.files_read += 1;
                let mut file_aggregator = SetupAggregator::new();
                for record in records {
                    file_aggregator.add_record(record);
                }
                let stats = file_aggregator.stats();
                debug!(
                    "File {}: {} measurement(s) for {} setup(s)",
                    path.display(),
                    stats.measurements,
                    stats.setups
                );
                aggregator.merge(file_aggregator);
            }
            Err(e) if e.is_file_scoped() => {
                error!("Skipping {}: {}", path.display(), e);
                report.files_skipped.push(path.clone());
            }
            Err(e) => return Err(e),
        }
    }

    let AggregateStats {
        setups,
        measurements,
    } = aggregator.stats();
    info!(
        "Loaded {} measurement(s) for {} setup(s) from {} file(s), {} skipped",
        measurements,
        setups,
        report.files_read,
        report.files_skipped.len()
    );

    report.map = aggregator.into_map();
    Ok(report)
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
