//! Partitions raw multi-day logger streams into calendar-day units.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use polars::prelude::*;

use crate::error::{ProcessingError, Result};
use crate::types::{DayUnit, RawSeries, TIMESTAMP_COLUMN};

/// Groups the samples of every input series by the calendar date of the
/// instrument timestamp and merges same-date samples across series. Returns
/// one unit per distinct date, in chronological order; a single-day input
/// degenerates to a single unit. Timestamps must be present and
/// non-decreasing within each source.
pub fn scan_days(series: &[RawSeries]) -> Result<Vec<DayUnit>> {
    let mut by_date: BTreeMap<NaiveDate, Vec<DataFrame>> = BTreeMap::new();

    for raw in series {
        for (date, frame) in split_into_dates(raw)? {
            by_date.entry(date).or_default().push(frame);
        }
    }

    let mut units = Vec::with_capacity(by_date.len());
    for (date, mut frames) in by_date {
        let df = if frames.len() == 1 {
            frames.pop().unwrap_or_default()
        } else {
            merge_same_date(date, frames)?
        };
        units.push(DayUnit { date, df });
    }

    Ok(units)
}

/// Slices one source into its contiguous per-date runs. Since timestamps
/// are sorted within a source, each date occupies exactly one run.
fn split_into_dates(raw: &RawSeries) -> Result<Vec<(NaiveDate, DataFrame)>> {
    let timestamps = raw
        .df
        .column(TIMESTAMP_COLUMN)
        .and_then(|column| column.datetime())
        .map_err(|_| malformed(raw, "datetime 'timestamp' column is required"))?;

    let len = raw.df.height();
    let mut dates = Vec::with_capacity(len);
    let mut previous: Option<i64> = None;
    for idx in 0..len {
        let micros = timestamps
            .get(idx)
            .ok_or_else(|| malformed(raw, format!("missing timestamp at row {idx}")))?;
        if let Some(prev) = previous {
            if micros < prev {
                return Err(malformed(
                    raw,
                    format!("timestamps are non-monotonic at row {idx}"),
                ));
            }
        }
        previous = Some(micros);
        dates.push(date_from_micros(raw, micros)?);
    }

    let mut runs = Vec::new();
    let mut run_start = 0usize;
    for idx in 1..len {
        if dates[idx] != dates[run_start] {
            runs.push((
                dates[run_start],
                raw.df.slice(run_start as i64, idx - run_start),
            ));
            run_start = idx;
        }
    }
    if len > 0 {
        runs.push((
            dates[run_start],
            raw.df.slice(run_start as i64, len - run_start),
        ));
    }

    Ok(runs)
}

fn merge_same_date(date: NaiveDate, frames: Vec<DataFrame>) -> Result<DataFrame> {
    let mut iter = frames.into_iter();
    let mut merged = match iter.next() {
        Some(frame) => frame,
        None => return Ok(DataFrame::default()),
    };

    for frame in iter {
        if schema_names(&merged) != schema_names(&frame) {
            return Err(ProcessingError::MalformedSeries {
                series: date.to_string(),
                message: "sources contributing to the same date carry different channel sets"
                    .to_string(),
            });
        }
        merged.vstack_mut(&frame)?;
    }

    // Stable sort: rows with tied timestamps keep their stacking order, so
    // repeated runs over the same sources emit identical tables.
    Ok(merged.sort(
        [TIMESTAMP_COLUMN],
        SortMultipleOptions::default().with_maintain_order(true),
    )?)
}

fn schema_names(df: &DataFrame) -> Vec<String> {
    let mut names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    names.sort();
    names
}

fn date_from_micros(raw: &RawSeries, micros: i64) -> Result<NaiveDate> {
    DateTime::from_timestamp_micros(micros)
        .map(|dt| dt.naive_utc().date())
        .ok_or_else(|| malformed(raw, format!("timestamp {micros} out of representable range")))
}

fn malformed(raw: &RawSeries, message: impl Into<String>) -> ProcessingError {
    ProcessingError::MalformedSeries {
        series: raw.source.clone(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, raw_series, raw_series_at, timestamp_series};

    #[test]
    fn single_day_input_yields_single_unit() {
        let raw = raw_series("cast.csv", "2024-06-01", 4);
        let units = scan_days(&[raw]).expect("scan succeeds");
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].date, date("2024-06-01"));
        assert_eq!(units[0].df.height(), 4);
    }

    #[test]
    fn partitions_multi_day_stream_without_loss() {
        let mut raw = raw_series("stream.csv", "2024-06-01", 3);
        let next_day = raw_series("stream.csv", "2024-06-02", 5);
        raw.df.vstack_mut(&next_day.df).expect("stack days");

        let units = scan_days(&[raw]).expect("scan succeeds");
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].date, date("2024-06-01"));
        assert_eq!(units[1].date, date("2024-06-02"));
        assert_eq!(units[0].df.height() + units[1].df.height(), 8);
    }

    #[test]
    fn merges_same_date_sources_sorted_by_timestamp() {
        let late = raw_series_at("b.csv", "2024-06-01", 12, 2);
        let early = raw_series_at("a.csv", "2024-06-01", 8, 2);

        let units = scan_days(&[late, early]).expect("scan succeeds");
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].df.height(), 4);

        let timestamps = units[0]
            .df
            .column(TIMESTAMP_COLUMN)
            .expect("timestamp column")
            .datetime()
            .expect("datetime column");
        let mut previous = i64::MIN;
        for idx in 0..4 {
            let micros = timestamps.get(idx).expect("timestamp present");
            assert!(micros >= previous);
            previous = micros;
        }
    }

    #[test]
    fn tied_timestamps_merge_in_source_order_every_run() {
        let source = |name: &str, pressure: f64| {
            let mut df = df![
                "pressure" => vec![pressure; 3],
                "conductivity" => vec![40.0; 3],
                "temperature" => vec![15.0; 3],
            ]
            .expect("construct source frame");
            df.with_column(timestamp_series("2024-06-01", 600, 3))
                .expect("add timestamps");
            RawSeries::new(name, df)
        };

        // Both sources carry identical timestamps, so every row is tied.
        let units = scan_days(&[source("a.csv", 1.0), source("b.csv", 2.0)])
            .expect("scan succeeds");
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].df.height(), 6);

        // Stable merge: the first-listed source wins each tie.
        let pressure = units[0]
            .df
            .column("pressure")
            .expect("pressure column")
            .f64()
            .expect("pressure is f64");
        let order: Vec<f64> = (0..6).map(|idx| pressure.get(idx).unwrap()).collect();
        assert_eq!(order, vec![1.0, 2.0, 1.0, 2.0, 1.0, 2.0]);

        let rerun = scan_days(&[source("a.csv", 1.0), source("b.csv", 2.0)])
            .expect("rescan succeeds");
        assert!(units[0].df.equals(&rerun[0].df));
    }

    #[test]
    fn non_monotonic_timestamps_are_rejected() {
        let mut raw = raw_series_at("broken.csv", "2024-06-01", 12, 3);
        let earlier = raw_series_at("broken.csv", "2024-06-01", 8, 1);
        raw.df.vstack_mut(&earlier.df).expect("stack rows");

        let err = scan_days(&[raw]).unwrap_err();
        assert_eq!(err.kind(), "MalformedSeriesError");
        assert!(err.to_string().contains("non-monotonic"));
    }

    #[test]
    fn missing_timestamp_column_is_rejected() {
        let mut raw = raw_series("no_ts.csv", "2024-06-01", 2);
        raw.df = raw.df.drop(TIMESTAMP_COLUMN).expect("drop timestamp");
        let err = scan_days(&[raw]).unwrap_err();
        assert_eq!(err.kind(), "MalformedSeriesError");
    }

    #[test]
    fn empty_input_yields_no_units() {
        let units = scan_days(&[]).expect("scan succeeds");
        assert!(units.is_empty());
    }
}
