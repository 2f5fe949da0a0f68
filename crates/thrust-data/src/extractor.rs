//! Turn data rows into setups and measurements using located header indexes.

use std::path::Path;

use thrust_core::error::{Result, ThrustError};
use thrust_core::formatting::column_name;
use thrust_core::models::{Attribute, Measurement, Setup};
use tracing::debug;

use crate::header::{HeaderIndexes, MeasurementColumns, MeasurementRole};

/// One parsed data row.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub setup: Setup,
    /// One entry per measurement group that parsed cleanly.
    pub measurements: Vec<Measurement>,
}

/// Extract a record from every data row following the header row.
///
/// Cells are expected to be trimmed by the reader. Blank rows are skipped. A
/// row missing one of its setup cells is an invalid setup key and aborts
/// extraction.
pub fn extract_records(
    header: &HeaderIndexes,
    motor: &str,
    rows: &[Vec<String>],
    source: &Path,
) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    for (row_index, row) in rows.iter().enumerate().skip(header.row + 1) {
        if let Some(record) = extract_row(header, motor, row, source, row_index + 1)? {
            records.push(record);
        }
    }
    Ok(records)
}

/// Extract one row. `row_number` is one-based and only used for diagnostics.
pub fn extract_row(
    header: &HeaderIndexes,
    motor: &str,
    row: &[String],
    source: &Path,
    row_number: usize,
) -> Result<Option<Record>> {
    if row.iter().all(|cell| cell.is_empty()) {
        debug!("Skipping blank row {} in {}", row_number, source.display());
        return Ok(None);
    }

    let setup = setup_from_row(header, motor, row, source, row_number)?;

    let measurements = header
        .groups
        .iter()
        .filter_map(|columns| {
            let parsed = measurement_from_row(columns, row);
            if parsed.is_none() {
                debug!(
                    "Failed to parse cells {:?} of row {} in {} as measurement",
                    group_cells(columns, row),
                    row_number,
                    source.display()
                );
            }
            parsed
        })
        .collect();

    Ok(Some(Record {
        setup,
        measurements,
    }))
}

/// Build the string-form setup of a row.
fn setup_from_row(
    header: &HeaderIndexes,
    motor: &str,
    row: &[String],
    source: &Path,
    row_number: usize,
) -> Result<Setup> {
    let [cells, prop, esc, author, session] = Attribute::COLUMNS.map(|attr| {
        let column = header.setup.column(attr);
        column
            .and_then(|c| row.get(c))
            .cloned()
            .ok_or_else(|| ThrustError::InvalidSetupKey {
                path: source.to_path_buf(),
                row: row_number,
                attribute: attr.name().to_string(),
                column: column_name(column),
            })
    });
    Ok(Setup::new(motor, cells?, prop?, esc?, author?, session?))
}

/// Parse one measurement group. `None` when U, I or thrust is not a number
/// or rpm is neither empty nor a number.
pub fn measurement_from_row(columns: &MeasurementColumns, row: &[String]) -> Option<Measurement> {
    let number = |role: MeasurementRole| -> Option<f64> {
        row.get(columns.column(role))?.parse::<f64>().ok()
    };

    let voltage = number(MeasurementRole::Voltage)?;
    let current = number(MeasurementRole::Current)?;
    let thrust = number(MeasurementRole::Thrust)?;

    let rpm_cell = row.get(columns.rpm).map(String::as_str).unwrap_or("");
    let rpm = if rpm_cell.is_empty() {
        None
    } else {
        Some(rpm_cell.parse::<f64>().ok()?)
    };

    Some(Measurement::new(voltage, current, thrust, rpm))
}

/// Raw cells of one group, for log output.
fn group_cells<'a>(columns: &MeasurementColumns, row: &'a [String]) -> Vec<&'a str> {
    MeasurementRole::ALL
        .iter()
        .map(|role| {
            row.get(columns.column(*role))
                .map(String::as_str)
                .unwrap_or("")
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{locate_header, SetupColumns};

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn two_group_header() -> HeaderIndexes {
        HeaderIndexes {
            row: 0,
            setup: SetupColumns {
                cells: 0,
                prop: 1,
                esc: 2,
                author: 3,
                session: 4,
            },
            groups: vec![
                MeasurementColumns {
                    voltage: 5,
                    current: 6,
                    thrust: 7,
                    rpm: 8,
                },
                MeasurementColumns {
                    voltage: 9,
                    current: 10,
                    thrust: 11,
                    rpm: 12,
                },
            ],
        }
    }

    // ── measurement_from_row ──────────────────────────────────────────────────

    #[test]
    fn test_empty_rpm_is_absent() {
        let header = two_group_header();
        let cells = row(&["3S", "6030", "ESC1", "alice", "s1", "12.2", "2.2", "120", ""]);
        let m = measurement_from_row(&header.groups[0], &cells).unwrap();
        assert_eq!(m, Measurement::new(12.2, 2.2, 120.0, None));
    }

    #[test]
    fn test_rpm_parsed_when_present() {
        let header = two_group_header();
        let cells = row(&["3S", "6030", "ESC1", "alice", "s1", "12.2", "2.2", "120", "9800"]);
        let m = measurement_from_row(&header.groups[0], &cells).unwrap();
        assert_eq!(m.rpm, Some(9800.0));
    }

    #[test]
    fn test_non_numeric_rpm_drops_measurement() {
        let header = two_group_header();
        let cells = row(&["3S", "6030", "ESC1", "alice", "s1", "12.2", "2.2", "120", "n/a"]);
        assert!(measurement_from_row(&header.groups[0], &cells).is_none());
    }

    #[test]
    fn test_empty_voltage_drops_measurement() {
        let header = two_group_header();
        let cells = row(&["3S", "6030", "ESC1", "alice", "s1", "", "2.2", "120", ""]);
        assert!(measurement_from_row(&header.groups[0], &cells).is_none());
    }

    #[test]
    fn test_short_row_drops_measurement() {
        let header = two_group_header();
        let cells = row(&["3S", "6030", "ESC1", "alice", "s1", "12.2", "2.2"]);
        assert!(measurement_from_row(&header.groups[0], &cells).is_none());
    }

    // ── extract_row ───────────────────────────────────────────────────────────

    #[test]
    fn test_bad_cell_only_affects_its_group() {
        let header = two_group_header();
        let cells = row(&[
            "3S", "6030", "ESC1", "alice", "s1", "12.2", "abc", "120", "", "12.0", "4.1", "250",
            "10500",
        ]);
        let record = extract_row(&header, "MotorA", &cells, Path::new("MotorA.csv"), 2)
            .unwrap()
            .unwrap();
        assert_eq!(
            record.setup,
            Setup::new("MotorA", "3S", "6030", "ESC1", "alice", "s1")
        );
        assert_eq!(
            record.measurements,
            vec![Measurement::new(12.0, 4.1, 250.0, Some(10500.0))]
        );
    }

    #[test]
    fn test_row_without_measurements_keeps_setup() {
        let header = two_group_header();
        let cells = row(&["3S", "6030", "ESC1", "alice", "s1"]);
        let record = extract_row(&header, "MotorA", &cells, Path::new("MotorA.csv"), 2)
            .unwrap()
            .unwrap();
        assert_eq!(record.setup.session, "s1");
        assert!(record.measurements.is_empty());
    }

    #[test]
    fn test_blank_row_skipped() {
        let header = two_group_header();
        let cells = row(&["", "", ""]);
        let record = extract_row(&header, "MotorA", &cells, Path::new("MotorA.csv"), 9).unwrap();
        assert!(record.is_none());
    }

    #[test]
    fn test_missing_setup_cell_is_invalid_key() {
        let header = two_group_header();
        let cells = row(&["3S", "6030", "ESC1"]);
        let err = extract_row(&header, "MotorA", &cells, Path::new("MotorA.csv"), 4).unwrap_err();
        match err {
            ThrustError::InvalidSetupKey {
                row,
                attribute,
                column,
                ..
            } => {
                assert_eq!(row, 4);
                assert_eq!(attribute, "author");
                assert_eq!(column, "D");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    // ── extract_records ───────────────────────────────────────────────────────

    #[test]
    fn test_extract_records_starts_after_header_row() {
        let rows = vec![
            row(&["bench export"]),
            row(&[
                "cells", "prop", "esc", "author", "session", "U(V)", "I(A)", "thrust(g)", "rpm",
            ]),
            row(&["3S", "6030", "ESC1", "alice", "s1", "12.2", "2.2", "120", ""]),
            row(&["3S", "6030", "ESC1", "alice", "s1", "12.1", "4.0", "210", "8000"]),
        ];
        let header = locate_header(&rows, Path::new("MotorA.csv")).unwrap();
        let records = extract_records(&header, "MotorA", &rows, Path::new("MotorA.csv")).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].measurements[0].thrust, 210.0);
    }
}
