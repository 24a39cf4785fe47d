//! Detects discrete profile casts inside a day unit.
//!
//! A sample is in-profile only while sea pressure AND conductivity sit
//! strictly above their thresholds; the conductivity check rejects pressure
//! transients from out-of-water handling. Runs shorter than the configured
//! minimum are dropped as noise.

use crate::error::{ProcessingError, Result};
use crate::types::{
    DayUnit, ProcessingParameters, ProfileSpan, CONDUCTIVITY_CHANNEL, SEA_PRESSURE_CHANNEL,
};

pub fn detect_profiles(unit: &DayUnit, params: &ProcessingParameters) -> Result<Vec<ProfileSpan>> {
    let sea_pressure = unit
        .df
        .column(SEA_PRESSURE_CHANNEL)
        .and_then(|column| column.f64())
        .map_err(|_| missing_channel(unit, SEA_PRESSURE_CHANNEL))?;
    let conductivity = unit
        .df
        .column(CONDUCTIVITY_CHANNEL)
        .and_then(|column| column.f64())
        .map_err(|_| missing_channel(unit, CONDUCTIVITY_CHANNEL))?;

    let len = unit.df.height();
    let mut spans = Vec::new();
    let mut open_start: Option<usize> = None;
    let mut next_index = 1usize;

    for idx in 0..len {
        // Nulls count as out of the water.
        let in_profile = matches!(
            (sea_pressure.get(idx), conductivity.get(idx)),
            (Some(p), Some(c)) if p > params.pressure_threshold && c > params.conductivity_threshold
        );

        match (open_start, in_profile) {
            (None, true) => open_start = Some(idx),
            (Some(start), false) => {
                close_run(&mut spans, &mut next_index, start, idx, params);
                open_start = None;
            }
            _ => {}
        }
    }

    // A run still open at the end of the day closes at the last sample.
    if let Some(start) = open_start {
        close_run(&mut spans, &mut next_index, start, len, params);
    }

    Ok(spans)
}

fn close_run(
    spans: &mut Vec<ProfileSpan>,
    next_index: &mut usize,
    start: usize,
    end: usize,
    params: &ProcessingParameters,
) {
    if end - start >= params.min_span_samples {
        spans.push(ProfileSpan {
            start,
            end,
            index: *next_index,
        });
        *next_index += 1;
    }
}

fn missing_channel(unit: &DayUnit, channel: &str) -> ProcessingError {
    ProcessingError::MalformedSeries {
        series: unit.date.to_string(),
        message: format!("numeric '{channel}' channel is required for detection"),
    }
}
