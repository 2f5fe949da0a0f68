mod bootstrap;

use anyhow::{Context, Result};
use thrust_core::settings::Settings;
use thrust_data::analysis::analyze_bench_data;
use thrust_data::export::write_interchange;
use thrust_data::filter::{build_filter, group_measurements};
use thrust_data::series::{build_plot, write_plot};

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Thrust plotter v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("Reading CSV files from {}", settings.csv_dir.display());

    let analysis = analyze_bench_data(&settings.csv_dir)
        .with_context(|| format!("Failed to analyze {}", settings.csv_dir.display()))?;

    write_interchange(&analysis.interchange(), &settings.output)
        .with_context(|| format!("Failed to write {}", settings.output.display()))?;

    let filter = build_filter(&analysis.dictionary, &settings)?;
    let view = group_measurements(&analysis.dictionary, &analysis.index, &filter);
    if view.is_empty() {
        tracing::warn!("No measurements match the selected filter");
    }

    let plot = build_plot(&view);
    if let Some(path) = &settings.series_output {
        write_plot(&plot, path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    println!("{}", plot.title);
    for series in &plot.series {
        println!(
            "  {:<48} {:>4} measurement(s)  {}",
            series.label, series.measurement_count, series.style.color
        );
    }

    Ok(())
}
