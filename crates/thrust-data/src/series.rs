//! Plot series handed to the external plotting collaborator.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thrust_core::error::Result;
use thrust_core::fit::{fit_polynomial, PolynomialFit, MAX_DEGREE};
use thrust_core::style::{assign_styles, SeriesStyle};
use tracing::info;

use crate::filter::{Group, GroupedView};

/// Number of samples along each fitted curve.
pub const CURVE_SAMPLES: usize = 100;

pub const X_LABEL: &str = "I [A]";
pub const Y_LABEL: &str = "thrust [g]";

/// Scatter points and fitted curve of one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSeries {
    pub label: String,
    pub style: SeriesStyle,
    /// `(I, thrust)` pairs, starting at the origin.
    pub points: Vec<(f64, f64)>,
    pub fit: Option<PolynomialFit>,
    /// Sampled fit over `[0, max I]`; empty when no fit exists.
    pub curve: Vec<(f64, f64)>,
    pub measurement_count: usize,
}

/// One chart: title, axis labels and every series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotData {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<PlotSeries>,
}

impl PlotData {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Build the series of every group in `view`.
pub fn build_plot(view: &GroupedView) -> PlotData {
    let styles = assign_styles(view.groups.iter().map(|g| g.label.clone()));
    let series = view
        .groups
        .iter()
        .map(|group| {
            let style = styles
                .get(&group.label)
                .cloned()
                .unwrap_or_else(|| SeriesStyle::for_position(0));
            build_series(group, style)
        })
        .collect();

    PlotData {
        title: view.title.clone(),
        x_label: X_LABEL.to_string(),
        y_label: Y_LABEL.to_string(),
        series,
    }
}

/// Points, fit and sampled curve of one group.
pub fn build_series(group: &Group, style: SeriesStyle) -> PlotSeries {
    let points: Vec<(f64, f64)> = std::iter::once((0.0, 0.0))
        .chain(group.measurements.iter().map(|m| (m.current, m.thrust)))
        .collect();

    let fit = fit_polynomial(&points, MAX_DEGREE);
    let max_current = points.iter().map(|(x, _)| *x).fold(0.0, f64::max);
    let curve = fit
        .as_ref()
        .map(|f| f.sample(max_current, CURVE_SAMPLES))
        .unwrap_or_default();

    if let (Some(f), Some(&(last_current, _))) = (&fit, points.last()) {
        if points.len() > 2 {
            let fitted = f.evaluate(last_current);
            info!(
                "{}: 0.5 * I / thrust at I = {}: {:.5}",
                group.label,
                last_current,
                0.5 * last_current / fitted
            );
        }
    }

    PlotSeries {
        label: group.label.clone(),
        style,
        points,
        fit,
        curve,
        measurement_count: group.measurements.len(),
    }
}

/// Write the plot description as pretty JSON.
pub fn write_plot(plot: &PlotData, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, plot.to_json()?)?;
    info!("Wrote {} series to {}", plot.series.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;
    use thrust_core::models::{IndexedSetup, Measurement};

    fn group(label: &str, samples: &[(f64, f64)]) -> Group {
        Group {
            key: IndexedSetup::default(),
            label: label.to_string(),
            setups: vec![IndexedSetup::default()],
            measurements: samples
                .iter()
                .map(|&(i, t)| Measurement::new(12.0, i, t, None))
                .collect(),
        }
    }

    fn view(groups: Vec<Group>) -> GroupedView {
        GroupedView {
            title: "Motor Thrust, 3S".to_string(),
            labels: BTreeMap::new(),
            groups,
        }
    }

    #[test]
    fn test_points_start_at_origin() {
        let series = build_series(
            &group("MotorA", &[(1.0, 50.0), (2.0, 90.0)]),
            SeriesStyle::for_position(0),
        );
        assert_eq!(series.points, vec![(0.0, 0.0), (1.0, 50.0), (2.0, 90.0)]);
        assert_eq!(series.measurement_count, 2);
    }

    #[test]
    fn test_quadratic_recovered() {
        // thrust = 40 I + 5 I^2
        let samples: Vec<(f64, f64)> = [1.0, 2.0, 3.0, 4.0]
            .iter()
            .map(|&i| (i, 40.0 * i + 5.0 * i * i))
            .collect();
        let series = build_series(&group("MotorA", &samples), SeriesStyle::for_position(0));
        let fit = series.fit.unwrap();
        assert_eq!(fit.degree(), 2);
        assert!((fit.coefficients[1] - 40.0).abs() < 1e-6);
        assert!((fit.coefficients[2] - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_single_measurement_fits_line() {
        let series = build_series(&group("MotorA", &[(2.0, 100.0)]), SeriesStyle::for_position(0));
        let fit = series.fit.unwrap();
        assert_eq!(fit.degree(), 1);
        assert!((fit.evaluate(1.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_curve_spans_zero_to_max_current() {
        let series = build_series(
            &group("MotorA", &[(3.0, 120.0), (1.0, 50.0)]),
            SeriesStyle::for_position(0),
        );
        assert_eq!(series.curve.len(), CURVE_SAMPLES);
        assert_eq!(series.curve[0].0, 0.0);
        assert!((series.curve[CURVE_SAMPLES - 1].0 - 3.0).abs() < 1e-12);
        assert!(series.curve.iter().all(|(_, y)| *y >= 0.0));
    }

    #[test]
    fn test_empty_group_collapses_to_origin() {
        let series = build_series(&group("MotorA", &[]), SeriesStyle::for_position(0));
        assert_eq!(series.points, vec![(0.0, 0.0)]);
        assert_eq!(series.measurement_count, 0);
        assert!(series.curve.iter().all(|(x, _)| *x == 0.0));
    }

    #[test]
    fn test_build_plot_styles_follow_sorted_labels() {
        let plot = build_plot(&view(vec![
            group("MotorB", &[(1.0, 40.0)]),
            group("MotorA", &[(1.0, 50.0)]),
        ]));
        assert_eq!(plot.title, "Motor Thrust, 3S");
        assert_eq!(plot.x_label, X_LABEL);
        assert_eq!(plot.series[0].label, "MotorB");
        assert_eq!(plot.series[0].style, SeriesStyle::for_position(1));
        assert_eq!(plot.series[1].style, SeriesStyle::for_position(0));
    }

    #[test]
    fn test_write_plot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("series.json");
        let plot = build_plot(&view(vec![group("MotorA", &[(1.0, 50.0), (2.0, 90.0)])]));

        write_plot(&plot, &path).unwrap();
        let parsed: PlotData =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.series.len(), 1);
        assert_eq!(parsed.series[0].points.len(), 3);
    }
}
