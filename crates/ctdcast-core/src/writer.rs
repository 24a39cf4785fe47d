//! Serializes one profile: CSV table plus a diagnostic figure of the day's
//! sea-pressure trace with the detected span highlighted.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use polars::prelude::*;
use tracing::warn;

use crate::error::{ProcessingError, Result};
use crate::types::{DayUnit, ProfileDataset, ProfileSpan, SEA_PRESSURE_CHANNEL, TIMESTAMP_COLUMN};

const FIGURE_SIZE: (u32, u32) = (900, 600);
const MICROS_PER_HOUR: f64 = 3_600.0 * 1_000_000.0;

#[derive(Debug, Clone)]
pub struct WrittenProfile {
    pub table_path: PathBuf,
    pub figure_path: Option<PathBuf>,
    pub warnings: Vec<String>,
}

/// Writes `<out>/<YYYYMMDD>/profile_<n>.csv` and the sibling `.png`. The
/// table always lands first; a figure failure is downgraded to a warning on
/// the returned record rather than discarding the table.
pub fn write_profile(
    out_dir: &Path,
    unit: &DayUnit,
    span: &ProfileSpan,
    dataset: &ProfileDataset,
) -> Result<WrittenProfile> {
    let day_dir = day_directory(out_dir, dataset.date);
    fs::create_dir_all(&day_dir)?;

    let table_path = day_dir.join(format!("profile_{}.csv", dataset.index));
    let mut file = File::create(&table_path)?;
    CsvWriter::new(&mut file).finish(&mut dataset.df.clone())?;

    let figure_path = day_dir.join(format!("profile_{}.png", dataset.index));
    match render_figure(&figure_path, unit, span) {
        Ok(()) => Ok(WrittenProfile {
            table_path,
            figure_path: Some(figure_path),
            warnings: Vec::new(),
        }),
        Err(err) => {
            warn!(
                date = %dataset.date,
                index = dataset.index,
                error = %err,
                "figure rendering failed, keeping table output"
            );
            Ok(WrittenProfile {
                table_path,
                figure_path: None,
                warnings: vec![format!("{}: {}", err.kind(), err)],
            })
        }
    }
}

pub fn day_directory(out_dir: &Path, date: chrono::NaiveDate) -> PathBuf {
    out_dir.join(date.format("%Y%m%d").to_string())
}

fn render_figure(path: &Path, unit: &DayUnit, span: &ProfileSpan) -> Result<()> {
    let points = pressure_trace(unit)?;
    if points.is_empty() {
        return Err(ProcessingError::Render(
            "no sea-pressure samples to plot".to_string(),
        ));
    }

    let max_pressure = points
        .iter()
        .map(|&(_, pressure)| pressure)
        .fold(f64::MIN, f64::max);
    let y_max = (max_pressure * 1.1).max(1.0);

    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} profile {}", unit.date, span.index),
            ("sans-serif", 30),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..24.0, 0.0..y_max)
        .map_err(render_error)?;

    chart
        .configure_mesh()
        .x_desc("Hour of day")
        .y_desc("Sea pressure (dbar)")
        .draw()
        .map_err(render_error)?;

    chart
        .draw_series(LineSeries::new(points.iter().copied(), &BLUE))
        .map_err(render_error)?;

    let span_points = pressure_trace_span(unit, span)?;
    chart
        .draw_series(LineSeries::new(span_points.into_iter(), RED.stroke_width(3)))
        .map_err(render_error)?;

    root.present().map_err(render_error)?;
    Ok(())
}

fn pressure_trace(unit: &DayUnit) -> Result<Vec<(f64, f64)>> {
    trace_range(unit, 0, unit.df.height())
}

fn pressure_trace_span(unit: &DayUnit, span: &ProfileSpan) -> Result<Vec<(f64, f64)>> {
    trace_range(unit, span.start, span.end)
}

fn trace_range(unit: &DayUnit, start: usize, end: usize) -> Result<Vec<(f64, f64)>> {
    let timestamps = unit
        .df
        .column(TIMESTAMP_COLUMN)
        .and_then(|column| column.datetime())
        .map_err(|err| ProcessingError::Render(err.to_string()))?;
    let sea_pressure = unit
        .df
        .column(SEA_PRESSURE_CHANNEL)
        .and_then(|column| column.f64())
        .map_err(|err| ProcessingError::Render(err.to_string()))?;

    let midnight = unit
        .date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| ProcessingError::Render("invalid day date".to_string()))?
        .and_utc()
        .timestamp_micros();

    let mut points = Vec::with_capacity(end - start);
    for idx in start..end {
        if let (Some(micros), Some(pressure)) = (timestamps.get(idx), sea_pressure.get(idx)) {
            let hours = (micros - midnight) as f64 / MICROS_PER_HOUR;
            points.push((hours, pressure));
        }
    }
    Ok(points)
}

fn render_error(err: impl std::fmt::Display) -> ProcessingError {
    ProcessingError::Render(err.to_string())
}
