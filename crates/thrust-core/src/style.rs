//! Plot styling for thrust series.
//!
//! Styles are a pure function of the set of group labels: labels are sorted,
//! and the position in that order picks the colour and marker. The scatter
//! points and the fitted curve of one group always share a colour.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Colour cycle for series, as `#rrggbb` strings.
pub const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Marker shapes, advanced once the palette wraps around.
pub const MARKERS: [Marker; 4] = [
    Marker::Circle,
    Marker::Square,
    Marker::Triangle,
    Marker::Diamond,
];

/// Scatter marker shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Marker {
    Circle,
    Square,
    Triangle,
    Diamond,
}

/// Line style of the fitted curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Solid,
    Dashed,
}

/// Visual attributes of one plotted group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesStyle {
    /// Colour shared by the points and the curve.
    pub color: String,
    /// Marker used for measured points.
    pub marker: Marker,
    /// Line style used for the fitted curve.
    pub curve: LineStyle,
}

impl SeriesStyle {
    /// Style for the `position`-th label in sorted order.
    pub fn for_position(position: usize) -> Self {
        Self {
            color: PALETTE[position % PALETTE.len()].to_string(),
            marker: MARKERS[(position / PALETTE.len()) % MARKERS.len()],
            curve: LineStyle::Dashed,
        }
    }
}

/// Assign a style to every distinct label.
///
/// The result depends only on the set of labels, never on the order they
/// are passed in or on previous calls.
pub fn assign_styles<I, S>(labels: I) -> BTreeMap<String, SeriesStyle>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut sorted: Vec<String> = labels.into_iter().map(Into::into).collect();
    sorted.sort();
    sorted.dedup();

    sorted
        .into_iter()
        .enumerate()
        .map(|(position, label)| (label, SeriesStyle::for_position(position)))
        .collect()
}
