//! Builds the per-profile dataset: requested channel subset plus depth,
//! salinity, and density anomaly from the equation-of-state seam.

use polars::prelude::*;

use crate::error::{ProcessingError, Result};
use crate::types::{
    DayUnit, ProcessingParameters, ProfileDataset, ProfileSpan, CONDUCTIVITY_CHANNEL,
    DENSITY_ANOMALY_COLUMN, DEPTH_COLUMN, SALINITY_COLUMN, SEA_PRESSURE_CHANNEL, SITE_ID_COLUMN,
    TEMPERATURE_CHANNEL, TIMESTAMP_COLUMN,
};

#[derive(Debug, Clone, Copy)]
pub struct DerivedSample {
    pub depth: f64,
    pub salinity: f64,
    pub density_anomaly: f64,
}

/// External oceanographic equation-of-state routine, treated as a black
/// box. [`crate::eos::Pss78`] is the shipped implementation; callers may
/// substitute their own.
pub trait EquationOfState {
    fn derive(
        &self,
        pressure: f64,
        conductivity: f64,
        temperature: f64,
        latitude: f64,
    ) -> DerivedSample;
}

/// Materializes one span of a corrected day unit. Channels listed in the
/// subset but absent from the day are skipped; the channels the equation of
/// state needs are required and their absence is a `DerivationError`.
pub fn compute_profile_dataset(
    unit: &DayUnit,
    span: &ProfileSpan,
    params: &ProcessingParameters,
    eos: &dyn EquationOfState,
    latitude: f64,
) -> Result<ProfileDataset> {
    let slice = unit.df.slice(span.start as i64, span.len());

    for channel in [SEA_PRESSURE_CHANNEL, CONDUCTIVITY_CHANNEL, TEMPERATURE_CHANNEL] {
        if slice.column(channel).is_err() {
            return Err(ProcessingError::Derivation {
                date: unit.date,
                index: span.index,
                channel: channel.to_string(),
            });
        }
    }

    let sea_pressure = slice.column(SEA_PRESSURE_CHANNEL)?.f64()?;
    let conductivity = slice.column(CONDUCTIVITY_CHANNEL)?.f64()?;
    let temperature = slice.column(TEMPERATURE_CHANNEL)?.f64()?;

    let len = slice.height();
    let mut depth: Vec<Option<f64>> = Vec::with_capacity(len);
    let mut salinity: Vec<Option<f64>> = Vec::with_capacity(len);
    let mut density_anomaly: Vec<Option<f64>> = Vec::with_capacity(len);

    for idx in 0..len {
        match (
            sea_pressure.get(idx),
            conductivity.get(idx),
            temperature.get(idx),
        ) {
            (Some(p), Some(c), Some(t)) => {
                let sample = eos.derive(p, c, t, latitude);
                depth.push(Some(sample.depth));
                salinity.push(Some(sample.salinity));
                density_anomaly.push(Some(sample.density_anomaly));
            }
            // Null readings stay null, never substituted with defaults.
            _ => {
                depth.push(None);
                salinity.push(None);
                density_anomaly.push(None);
            }
        }
    }

    let mut columns: Vec<Column> = vec![slice.column(TIMESTAMP_COLUMN)?.clone()];
    for channel in &params.channel_subset {
        if channel == TIMESTAMP_COLUMN {
            continue;
        }
        if let Ok(column) = slice.column(channel.as_str()) {
            columns.push(column.clone());
        }
    }
    columns.push(Series::new(DEPTH_COLUMN.into(), depth).into());
    columns.push(Series::new(SALINITY_COLUMN.into(), salinity).into());
    columns.push(Series::new(DENSITY_ANOMALY_COLUMN.into(), density_anomaly).into());
    columns.push(Series::new(SITE_ID_COLUMN.into(), vec![params.site_id as i64; len]).into());

    Ok(ProfileDataset {
        site_id: params.site_id,
        date: unit.date,
        index: span.index,
        df: DataFrame::new(columns)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eos::Pss78;
    use crate::test_support::corrected_unit;

    fn params(subset: &[&str]) -> ProcessingParameters {
        ProcessingParameters::new(
            5,
            10.1325,
            0.45,
            5.00,
            subset.iter().map(|s| s.to_string()).collect(),
        )
        .expect("valid parameters")
    }

    fn span(start: usize, end: usize) -> ProfileSpan {
        ProfileSpan {
            start,
            end,
            index: 1,
        }
    }

    #[test]
    fn derived_columns_and_site_id_are_appended() {
        let unit = corrected_unit(
            "2024-06-01",
            &[Some(1.0), Some(5.0), Some(10.0)],
            &[Some(40.0), Some(40.5), Some(41.0)],
        );
        let dataset = compute_profile_dataset(&unit, &span(0, 3), &params(&[]), &Pss78, 48.3589)
            .expect("derivation succeeds");

        assert_eq!(dataset.df.height(), 3);
        for column in [
            TIMESTAMP_COLUMN,
            DEPTH_COLUMN,
            SALINITY_COLUMN,
            DENSITY_ANOMALY_COLUMN,
            SITE_ID_COLUMN,
        ] {
            assert!(dataset.df.column(column).is_ok(), "missing {column}");
        }

        let site = dataset
            .df
            .column(SITE_ID_COLUMN)
            .expect("site_id column")
            .i64()
            .expect("site_id is integer");
        assert_eq!(site.get(0), Some(5));

        let salinity = dataset
            .df
            .column(SALINITY_COLUMN)
            .expect("salinity column")
            .f64()
            .expect("salinity is f64");
        let value = salinity.get(1).expect("salinity derived");
        assert!(value > 25.0 && value < 40.0, "got {value}");
    }

    #[test]
    fn channel_subset_restricts_retained_channels() {
        let unit = corrected_unit(
            "2024-06-01",
            &[Some(1.0), Some(2.0)],
            &[Some(40.0), Some(40.0)],
        );
        // 'par' is requested but absent from this instrument: skipped.
        let dataset = compute_profile_dataset(
            &unit,
            &span(0, 2),
            &params(&[TEMPERATURE_CHANNEL, "par"]),
            &Pss78,
            48.3589,
        )
        .expect("derivation succeeds");

        assert!(dataset.df.column(TEMPERATURE_CHANNEL).is_ok());
        assert!(dataset.df.column("par").is_err());
        assert!(dataset.df.column(SEA_PRESSURE_CHANNEL).is_err());
    }

    #[test]
    fn missing_temperature_is_a_derivation_error() {
        let mut unit = corrected_unit(
            "2024-06-01",
            &[Some(1.0), Some(2.0)],
            &[Some(40.0), Some(40.0)],
        );
        unit.df = unit.df.drop(TEMPERATURE_CHANNEL).expect("drop temperature");

        let err = compute_profile_dataset(&unit, &span(0, 2), &params(&[]), &Pss78, 48.3589)
            .unwrap_err();
        assert_eq!(err.kind(), "DerivationError");
        assert!(err.to_string().contains(TEMPERATURE_CHANNEL));
    }

    #[test]
    fn null_inputs_propagate_as_null_outputs() {
        let unit = corrected_unit(
            "2024-06-01",
            &[Some(1.0), None, Some(3.0)],
            &[Some(40.0), Some(40.0), Some(40.0)],
        );
        let dataset = compute_profile_dataset(&unit, &span(0, 3), &params(&[]), &Pss78, 48.3589)
            .expect("derivation succeeds");

        let depth = dataset
            .df
            .column(DEPTH_COLUMN)
            .expect("depth column")
            .f64()
            .expect("depth is f64");
        assert!(depth.get(0).is_some());
        assert!(depth.get(1).is_none());
        assert!(depth.get(2).is_some());
    }

    #[test]
    fn dataset_covers_exactly_the_span() {
        let unit = corrected_unit(
            "2024-06-01",
            &[Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)],
            &[Some(40.0); 5],
        );
        let dataset = compute_profile_dataset(&unit, &span(1, 4), &params(&[]), &Pss78, 48.3589)
            .expect("derivation succeeds");
        assert_eq!(dataset.df.height(), 3);
    }
}
