//! CSV stand-in for the proprietary instrument-file parser: reads one
//! channel export into a `RawSeries`. The first `timestamp`-named column is
//! parsed with the instrument clock kept as-is; every other column becomes
//! an `f64` channel with empty cells as nulls.

use std::fs::File;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use csv::ReaderBuilder;
use polars::prelude::*;

use ctdcast_core::types::TIMESTAMP_COLUMN;
use ctdcast_core::RawSeries;

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S",
];

pub fn read_series(path: &Path) -> Result<RawSeries> {
    let source = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader.headers().context("failed to read CSV headers")?.clone();
    let timestamp_idx = headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(TIMESTAMP_COLUMN))
        .with_context(|| format!("{source}: no '{TIMESTAMP_COLUMN}' column"))?;

    let channel_names: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != timestamp_idx)
        .map(|(idx, header)| (idx, header.trim().to_ascii_lowercase()))
        .collect();

    let mut timestamps: Vec<i64> = Vec::new();
    let mut channels: Vec<Vec<Option<f64>>> = vec![Vec::new(); channel_names.len()];

    for (row, record) in reader.records().enumerate() {
        let record =
            record.with_context(|| format!("{source}: failed to read CSV row {}", row + 2))?;

        let raw_timestamp = record.get(timestamp_idx).unwrap_or("");
        let parsed = parse_timestamp(raw_timestamp).with_context(|| {
            format!("{source}: unparseable timestamp '{raw_timestamp}' on row {}", row + 2)
        })?;
        timestamps.push(parsed.and_utc().timestamp_micros());

        for (slot, (column, name)) in channel_names.iter().enumerate() {
            let cell = record.get(*column).unwrap_or("");
            if cell.is_empty() {
                channels[slot].push(None);
            } else {
                let value: f64 = cell.parse().with_context(|| {
                    format!("{source}: channel '{name}' has non-numeric value '{cell}' on row {}", row + 2)
                })?;
                channels[slot].push(Some(value));
            }
        }
    }

    if timestamps.is_empty() {
        bail!("{source}: file contains no data rows");
    }

    let mut columns: Vec<Column> = vec![Series::new(TIMESTAMP_COLUMN.into(), timestamps)
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))
        .context("failed to build timestamp column")?
        .into()];
    for ((_, name), values) in channel_names.iter().zip(channels) {
        columns.push(Series::new(name.as_str().into(), values).into());
    }

    Ok(RawSeries::new(source, DataFrame::new(columns)?))
}

fn parse_timestamp(text: &str) -> Result<NaiveDateTime> {
    for format in TIMESTAMP_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(parsed);
        }
    }
    bail!("no known timestamp format matched")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create fixture");
        file.write_all(content.as_bytes()).expect("write fixture");
        file
    }

    #[test]
    fn reads_channels_with_nulls() {
        let fixture = write_fixture(
            "timestamp,Pressure,Conductivity\n\
             2024-06-01 10:00:00,10.20,40.1\n\
             2024-06-01 10:00:01,,40.2\n",
        );

        let series = read_series(fixture.path()).expect("ingest succeeds");
        assert_eq!(series.df.height(), 2);

        let pressure = series
            .df
            .column("pressure")
            .expect("pressure channel lowercased")
            .f64()
            .expect("pressure is f64");
        assert!((pressure.get(0).unwrap() - 10.20).abs() < 1e-12);
        assert!(pressure.get(1).is_none());

        let timestamps = series
            .df
            .column(TIMESTAMP_COLUMN)
            .expect("timestamp column")
            .datetime()
            .expect("datetime column");
        assert_eq!(
            timestamps.get(1).unwrap() - timestamps.get(0).unwrap(),
            1_000_000
        );
    }

    #[test]
    fn rejects_file_without_timestamp_column() {
        let fixture = write_fixture("pressure\n10.0\n");
        let err = read_series(fixture.path()).unwrap_err();
        assert!(err.to_string().contains("timestamp"));
    }

    #[test]
    fn rejects_non_numeric_channel_value() {
        let fixture = write_fixture(
            "timestamp,pressure\n\
             2024-06-01 10:00:00,abc\n",
        );
        let err = read_series(fixture.path()).unwrap_err();
        assert!(err.to_string().contains("non-numeric"));
    }

    #[test]
    fn rejects_empty_file() {
        let fixture = write_fixture("timestamp,pressure\n");
        let err = read_series(fixture.path()).unwrap_err();
        assert!(err.to_string().contains("no data rows"));
    }
}
