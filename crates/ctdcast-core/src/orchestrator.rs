//! Failure-tolerant batch driver: correction, detection, derivation, and
//! writing per day unit, with every outcome recorded in the manifest.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::atmospheric;
use crate::derived::{self, EquationOfState};
use crate::error::{ProcessingError, Result};
use crate::manifest::OutputManifest;
use crate::profile_detector;
use crate::sites;
use crate::types::{DayUnit, ProcessingParameters};
use crate::writer;

/// Processes every day unit in chronological order. Parameter problems are
/// batch-fatal and surface before anything is written; a failure on one
/// unit or one span is caught, recorded, and skipped; the batch never
/// aborts on a single bad cast. The returned manifest is the sole
/// authoritative record of what succeeded.
pub fn process_batch(
    units: &[DayUnit],
    params: &ProcessingParameters,
    eos: &dyn EquationOfState,
    out_dir: &Path,
) -> Result<OutputManifest> {
    params.validate()?;
    let station = sites::station(params.site_id).ok_or_else(|| {
        ProcessingError::InvalidParameter {
            name: "site_id",
            message: format!("unknown station id {}", params.site_id),
        }
    })?;

    let mut ordered: Vec<&DayUnit> = units.iter().collect();
    ordered.sort_by_key(|unit| unit.date);

    let mut manifest = OutputManifest::default();
    for unit in ordered {
        match process_day(unit, params, eos, station.latitude, out_dir, &mut manifest) {
            Ok(0) => {
                info!(date = %unit.date, "no cast met the thresholds");
                manifest.push_empty_day(unit.date);
            }
            Ok(count) => {
                info!(date = %unit.date, spans = count, "day unit processed");
            }
            Err(err) => {
                warn!(date = %unit.date, error = %err, "day unit failed, continuing batch");
                manifest.push_failure(unit.date, None, &err);
            }
        }
    }

    Ok(manifest)
}

/// Returns the number of spans detected for the day (not the number that
/// succeeded): a day with detected-but-failed spans is not an empty day.
fn process_day(
    unit: &DayUnit,
    params: &ProcessingParameters,
    eos: &dyn EquationOfState,
    latitude: f64,
    out_dir: &Path,
    manifest: &mut OutputManifest,
) -> Result<usize> {
    let corrected = atmospheric::apply_sea_pressure(unit, params.atmospheric_pressure)?;
    let spans = profile_detector::detect_profiles(&corrected, params)?;

    // The dated directory exists even for a day with zero valid profiles.
    fs::create_dir_all(writer::day_directory(out_dir, unit.date))?;

    for span in &spans {
        let written = derived::compute_profile_dataset(&corrected, span, params, eos, latitude)
            .and_then(|dataset| writer::write_profile(out_dir, &corrected, span, &dataset));
        match written {
            Ok(written) => manifest.push_profile(params.site_id, unit.date, span.index, written),
            Err(err) => {
                warn!(
                    date = %unit.date,
                    index = span.index,
                    error = %err,
                    "profile span failed, continuing day"
                );
                manifest.push_failure(unit.date, Some(span.index), &err);
            }
        }
    }

    Ok(spans.len())
}
