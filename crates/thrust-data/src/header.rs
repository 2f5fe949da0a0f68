//! Header row detection for bench CSV files.
//!
//! Bench spreadsheets are exported with free-form preambles, so the header
//! row has to be found heuristically: the first row whose cells name every
//! setup column and at least one complete group of measurement columns wins.

use std::path::Path;

use thrust_core::error::{Result, ThrustError};
use thrust_core::formatting::column_name;
use thrust_core::models::Attribute;
use tracing::{debug, info};

// ── MeasurementRole ───────────────────────────────────────────────────────────

/// Column role inside one measurement group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementRole {
    Voltage,
    Current,
    Thrust,
    Rpm,
}

impl MeasurementRole {
    /// Roles in matching order; the first prefix that matches wins.
    pub const ALL: [MeasurementRole; 4] = [
        MeasurementRole::Voltage,
        MeasurementRole::Current,
        MeasurementRole::Thrust,
        MeasurementRole::Rpm,
    ];

    /// Lowercase header prefix identifying the role.
    pub fn prefix(self) -> &'static str {
        match self {
            MeasurementRole::Voltage => "u",
            MeasurementRole::Current => "i",
            MeasurementRole::Thrust => "t",
            MeasurementRole::Rpm => "rpm",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MeasurementRole::Voltage => "U",
            MeasurementRole::Current => "I",
            MeasurementRole::Thrust => "thrust",
            MeasurementRole::Rpm => "rpm",
        }
    }
}

// ── Column sets ───────────────────────────────────────────────────────────────

/// Column of every setup attribute read from the CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupColumns {
    pub cells: usize,
    pub prop: usize,
    pub esc: usize,
    pub author: usize,
    pub session: usize,
}

impl SetupColumns {
    /// Column holding `attr`; `None` for [`Attribute::Motor`].
    pub fn column(&self, attr: Attribute) -> Option<usize> {
        match attr {
            Attribute::Motor => None,
            Attribute::Cells => Some(self.cells),
            Attribute::Prop => Some(self.prop),
            Attribute::Esc => Some(self.esc),
            Attribute::Author => Some(self.author),
            Attribute::Session => Some(self.session),
        }
    }
}

/// Columns of one U/I/thrust/rpm measurement group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementColumns {
    pub voltage: usize,
    pub current: usize,
    pub thrust: usize,
    pub rpm: usize,
}

impl MeasurementColumns {
    pub fn column(&self, role: MeasurementRole) -> usize {
        match role {
            MeasurementRole::Voltage => self.voltage,
            MeasurementRole::Current => self.current,
            MeasurementRole::Thrust => self.thrust,
            MeasurementRole::Rpm => self.rpm,
        }
    }

    /// Spreadsheet names of the four columns, for log output.
    pub fn describe(&self) -> String {
        format!(
            "U={}, I={}, thrust={}, rpm={}",
            column_name(Some(self.voltage)),
            column_name(Some(self.current)),
            column_name(Some(self.thrust)),
            column_name(Some(self.rpm)),
        )
    }
}

/// Column positions discovered in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderIndexes {
    /// Zero-based index of the header row; data starts on the next row.
    pub row: usize,
    pub setup: SetupColumns,
    /// Measurement groups, left to right.
    pub groups: Vec<MeasurementColumns>,
}

/// Columns assigned so far while scanning a row, one slot per role.
#[derive(Debug, Clone, Copy)]
struct PartialColumns<const N: usize>([Option<usize>; N]);

impl<const N: usize> PartialColumns<N> {
    fn new() -> Self {
        Self([None; N])
    }

    fn complete(&self) -> Option<[usize; N]> {
        let mut out = [0; N];
        for (slot, column) in out.iter_mut().zip(self.0) {
            *slot = column?;
        }
        Some(out)
    }

    fn describe(&self, names: impl Fn(usize) -> &'static str) -> String {
        self.0
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{}={}", names(i), column_name(*column)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Find the first row that yields complete header indexes.
///
/// Rows with conflicting or incomplete headers are logged and skipped.
/// Returns `None` when no row qualifies.
pub fn locate_header(rows: &[Vec<String>], source: &Path) -> Option<HeaderIndexes> {
    for (row_index, row) in rows.iter().enumerate() {
        match classify_row(source, row_index, row) {
            Ok(Some(indexes)) => {
                let groups: Vec<String> = indexes.groups.iter().map(|g| g.describe()).collect();
                info!(
                    "{}: found complete indexes on row {}: setup columns {:?}, measurement groups [{}]",
                    source.display(),
                    row_index + 1,
                    indexes.setup,
                    groups.join("; ")
                );
                return Some(indexes);
            }
            Ok(None) => {}
            Err(e) => debug!("{}; trying next row.", e),
        }
    }
    None
}

/// Classify every cell of one row of `source`.
///
/// Cells are expected to be trimmed already. Returns `Ok(None)` when the row
/// lacks a setup column or a complete measurement group, and
/// [`ThrustError::HeaderConflict`] when a role is claimed twice.
pub fn classify_row(
    source: &Path,
    row_index: usize,
    row: &[String],
) -> Result<Option<HeaderIndexes>> {
    let row_number = row_index + 1;
    let mut setup = PartialColumns::<5>::new();
    let mut group = PartialColumns::<4>::new();
    let mut groups: Vec<MeasurementColumns> = Vec::new();

    for (col, cell) in row.iter().enumerate() {
        let lower = cell.to_lowercase();

        if let Some(slot) = Attribute::COLUMNS
            .iter()
            .position(|attr| lower.starts_with(attr.name()))
        {
            if setup.0[slot].is_some() {
                return Err(ThrustError::HeaderConflict {
                    path: source.to_path_buf(),
                    row: row_number,
                    role: Attribute::COLUMNS[slot].name().to_string(),
                    cell: cell.clone(),
                    column: column_name(Some(col)),
                    detail: String::new(),
                });
            }
            setup.0[slot] = Some(col);
        } else if let Some(slot) = MeasurementRole::ALL
            .iter()
            .position(|role| lower.starts_with(role.prefix()))
        {
            if group.0[slot].is_some() {
                return Err(ThrustError::HeaderConflict {
                    path: source.to_path_buf(),
                    row: row_number,
                    role: MeasurementRole::ALL[slot].prefix().to_string(),
                    cell: cell.clone(),
                    column: column_name(Some(col)),
                    detail: format!(
                        ", but previous measurement column group ({}) is incomplete",
                        group.describe(|i| MeasurementRole::ALL[i].name())
                    ),
                });
            }
            group.0[slot] = Some(col);
        } else {
            debug!(
                "{}: column {} (containing '{}') on row {} did not match any expected header.",
                source.display(),
                column_name(Some(col)),
                cell,
                row_number
            );
        }

        if let Some([voltage, current, thrust, rpm]) = group.complete() {
            groups.push(MeasurementColumns {
                voltage,
                current,
                thrust,
                rpm,
            });
            group = PartialColumns::new();
        }
    }

    match setup.complete() {
        Some([cells, prop, esc, author, session]) if !groups.is_empty() => {
            Ok(Some(HeaderIndexes {
                row: row_index,
                setup: SetupColumns {
                    cells,
                    prop,
                    esc,
                    author,
                    session,
                },
                groups,
            }))
        }
        _ => {
            debug!(
                "{}: indexes ({}) and {} measurement group(s) based on row {} {:?} not complete, trying next row.",
                source.display(),
                setup.describe(|i| Attribute::COLUMNS[i].name()),
                groups.len(),
                row_number,
                row
            );
            Ok(None)
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
