use chrono::NaiveDate;
use polars::prelude::*;

use crate::atmospheric::ATMOSPHERIC_PRESSURE_DBAR;
use crate::error::{ProcessingError, Result};
use crate::sites;

/// Column holding the instrument timestamp, `Datetime(Microseconds, None)`,
/// kept in the instrument's recorded clock and never reinterpreted.
pub const TIMESTAMP_COLUMN: &str = "timestamp";
/// Absolute pressure as logged by the instrument (dbar).
pub const PRESSURE_CHANNEL: &str = "pressure";
/// Gauge pressure after atmospheric correction (dbar).
pub const SEA_PRESSURE_CHANNEL: &str = "sea_pressure";
pub const CONDUCTIVITY_CHANNEL: &str = "conductivity";
pub const TEMPERATURE_CHANNEL: &str = "temperature";

pub const DEPTH_COLUMN: &str = "depth";
pub const SALINITY_COLUMN: &str = "salinity";
pub const DENSITY_ANOMALY_COLUMN: &str = "density_anomaly";
pub const SITE_ID_COLUMN: &str = "site_id";

pub const PRESSURE_THRESHOLD_DBAR: std::ops::RangeInclusive<f64> = 0.10..=10.00;
pub const CONDUCTIVITY_THRESHOLD_MS_CM: std::ops::RangeInclusive<f64> = 0.01..=10.99;
pub const DEFAULT_MIN_SPAN_SAMPLES: usize = 10;

/// One logger record stream as produced by the external instrument-file
/// parser: a `timestamp` column plus one `f64` column per channel. Missing
/// readings stay as nulls, never dropped.
#[derive(Debug, Clone)]
pub struct RawSeries {
    pub source: String,
    pub df: DataFrame,
}

impl RawSeries {
    pub fn new(source: impl Into<String>, df: DataFrame) -> Self {
        Self {
            source: source.into(),
            df,
        }
    }
}

/// A raw series restricted to one calendar day.
#[derive(Debug, Clone)]
pub struct DayUnit {
    pub date: NaiveDate,
    pub df: DataFrame,
}

/// Half-open sample range `[start, end)` of one detected cast, with its
/// 1-based chronological index within the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileSpan {
    pub start: usize,
    pub end: usize,
    pub index: usize,
}

impl ProfileSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Materialized table for one detected profile: requested channels plus the
/// derived depth/salinity/density-anomaly columns and the station id.
#[derive(Debug, Clone)]
pub struct ProfileDataset {
    pub site_id: u32,
    pub date: NaiveDate,
    pub index: usize,
    pub df: DataFrame,
}

/// Batch-wide configuration, validated once at construction. Every value a
/// caller used to hardcode (station id, atmospheric pressure, thresholds)
/// is explicit here.
#[derive(Debug, Clone)]
pub struct ProcessingParameters {
    pub site_id: u32,
    pub atmospheric_pressure: f64,
    pub pressure_threshold: f64,
    pub conductivity_threshold: f64,
    pub channel_subset: Vec<String>,
    pub min_span_samples: usize,
}

impl ProcessingParameters {
    pub fn new(
        site_id: u32,
        atmospheric_pressure: f64,
        pressure_threshold: f64,
        conductivity_threshold: f64,
        channel_subset: Vec<String>,
    ) -> Result<Self> {
        let params = Self {
            site_id,
            atmospheric_pressure,
            pressure_threshold,
            conductivity_threshold,
            channel_subset,
            min_span_samples: DEFAULT_MIN_SPAN_SAMPLES,
        };
        params.validate()?;
        Ok(params)
    }

    /// Re-run the range checks. Happens at construction and again at batch
    /// start, since an out-of-range value invalidates every detection
    /// decision of the batch.
    pub fn validate(&self) -> Result<()> {
        if sites::station(self.site_id).is_none() {
            return Err(ProcessingError::InvalidParameter {
                name: "site_id",
                message: format!("unknown station id {}", self.site_id),
            });
        }
        if !ATMOSPHERIC_PRESSURE_DBAR.contains(&self.atmospheric_pressure) {
            return Err(ProcessingError::InvalidParameter {
                name: "atmospheric_pressure",
                message: format!(
                    "{} dbar outside plausible sea-level range {:?}",
                    self.atmospheric_pressure, ATMOSPHERIC_PRESSURE_DBAR
                ),
            });
        }
        if !PRESSURE_THRESHOLD_DBAR.contains(&self.pressure_threshold) {
            return Err(ProcessingError::InvalidParameter {
                name: "pressure_threshold",
                message: format!(
                    "{} dbar outside accepted range {:?}",
                    self.pressure_threshold, PRESSURE_THRESHOLD_DBAR
                ),
            });
        }
        if !CONDUCTIVITY_THRESHOLD_MS_CM.contains(&self.conductivity_threshold) {
            return Err(ProcessingError::InvalidParameter {
                name: "conductivity_threshold",
                message: format!(
                    "{} mS/cm outside accepted range {:?}",
                    self.conductivity_threshold, CONDUCTIVITY_THRESHOLD_MS_CM
                ),
            });
        }
        if self.min_span_samples == 0 {
            return Err(ProcessingError::InvalidParameter {
                name: "min_span_samples",
                message: "minimum span length must be at least 1 sample".to_string(),
            });
        }
        Ok(())
    }

    pub fn with_min_span_samples(mut self, min_span_samples: usize) -> Result<Self> {
        if min_span_samples == 0 {
            return Err(ProcessingError::InvalidParameter {
                name: "min_span_samples",
                message: "minimum span length must be at least 1 sample".to_string(),
            });
        }
        self.min_span_samples = min_span_samples;
        Ok(self)
    }

    /// Channel subset the monitoring program exports by default. Derived
    /// quantities are always appended and need not be listed.
    pub fn default_channel_subset() -> Vec<String> {
        [
            "conductivity",
            "temperature",
            "temperature1",
            "dissolved_o2_concentration",
            "par",
            "ph",
            "chlorophyll-a",
            "fdom",
            "turbidity",
        ]
        .into_iter()
        .map(str::to_string)
        .collect()
    }
}
