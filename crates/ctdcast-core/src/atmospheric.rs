//! Atmospheric pressure correction: absolute logger pressure to sea (gauge)
//! pressure.

use polars::prelude::*;

use crate::error::{ProcessingError, Result};
use crate::types::{DayUnit, PRESSURE_CHANNEL, SEA_PRESSURE_CHANNEL};

/// Physically plausible sea-level atmospheric pressure.
pub const ATMOSPHERIC_PRESSURE_DBAR: std::ops::RangeInclusive<f64> = 9.5..=10.8;

/// Appends a `sea_pressure` column (`absolute - atmospheric`) to a copy of
/// the day unit. The absolute `pressure` channel is left untouched, so
/// callers needing both still have both.
pub fn apply_sea_pressure(unit: &DayUnit, atmospheric_pressure: f64) -> Result<DayUnit> {
    if !ATMOSPHERIC_PRESSURE_DBAR.contains(&atmospheric_pressure) {
        return Err(ProcessingError::InvalidParameter {
            name: "atmospheric_pressure",
            message: format!(
                "{atmospheric_pressure} dbar outside plausible sea-level range {:?}",
                ATMOSPHERIC_PRESSURE_DBAR
            ),
        });
    }

    let pressure = unit
        .df
        .column(PRESSURE_CHANNEL)
        .and_then(|column| column.f64())
        .map_err(|_| ProcessingError::MalformedSeries {
            series: unit.date.to_string(),
            message: format!("numeric '{PRESSURE_CHANNEL}' channel is required"),
        })?;

    let len = unit.df.height();
    let mut sea_pressure: Vec<Option<f64>> = Vec::with_capacity(len);
    for idx in 0..len {
        sea_pressure.push(pressure.get(idx).map(|value| value - atmospheric_pressure));
    }

    let mut df = unit.df.clone();
    df.with_column(Series::new(SEA_PRESSURE_CHANNEL.into(), sea_pressure))?;

    Ok(DayUnit {
        date: unit.date,
        df,
    })
}
