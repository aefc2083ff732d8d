//! Merge and squash engine, grounded in
//! `original_source/tests/unit/test_merge.py` and the squash precedence
//! rules exercised by `tests/integration/test_merge.py`.

use std::collections::HashMap;

use polars::prelude::*;

use crate::error::{MeteoError, Result};
use crate::frame::{source_column, Frame, STATION_COL, TIME_COL};
use crate::granularity::Granularity;
use crate::parameter::Parameter;
use crate::provider::registry;
use crate::station::Station;
use crate::timeseries::TimeSeries;

/// Horizontal union of independent time series of the same granularity.
/// Rejects divergent granularities and empty input.
pub fn merge(series: Vec<TimeSeries>) -> Result<TimeSeries> {
    if series.is_empty() {
        return Err(MeteoError::EmptyMerge);
    }
    let granularity = series[0].granularity();
    if series.iter().any(|s| s.granularity() != granularity) {
        return Err(MeteoError::IncompatibleMerge);
    }

    let start = series.iter().filter_map(|s| s.start()).min();
    let end = series.iter().filter_map(|s| s.end()).max();

    let mut stations: Vec<Station> = Vec::new();
    for s in &series {
        for station in s.stations() {
            if !stations.iter().any(|existing| existing.id == station.id) {
                stations.push(station.clone());
            }
        }
    }

    let frames: Vec<Frame> = series.into_iter().map(|s| s.into_frame()).collect();
    let combined = Frame::concat(frames).map_err(MeteoError::Polars)?;

    Ok(TimeSeries::new(combined, stations, granularity, start, end))
}

/// Collapse rows sharing `(station, time)` but differing source into one
/// row, filling each parameter from the first row whose value is present
/// when walked in descending provider-priority order. Also used by
/// `TimeSeries::fetch(squash=true)`.
pub fn squash(frame: &Frame) -> Result<Frame> {
    let df = frame.as_dataframe();
    if df.height() == 0 {
        return Ok(frame.clone());
    }

    let parameters = frame.parameters();
    let station_series = df.column(STATION_COL).map_err(MeteoError::Polars)?.cast(&DataType::Utf8).map_err(MeteoError::Polars)?;
    let time_series = df.column(TIME_COL).map_err(MeteoError::Polars)?;
    let time_i64 = time_series.cast(&DataType::Int64).map_err(MeteoError::Polars)?;

    let height = df.height();
    let mut order: Vec<(String, i64)> = Vec::new();
    let mut groups: HashMap<(String, i64), Vec<usize>> = HashMap::new();
    for row in 0..height {
        let station = station_series.get(row).map_err(MeteoError::Polars)?.to_string();
        let time = time_i64.get(row).map_err(MeteoError::Polars)?.try_extract::<i64>().unwrap_or(0);
        let key = (station, time);
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(row);
    }

    let mut out_station: Vec<String> = Vec::with_capacity(order.len());
    let mut out_time: Vec<i64> = Vec::with_capacity(order.len());
    let mut out_params: HashMap<Parameter, Vec<Option<f64>>> = parameters.iter().map(|p| (*p, Vec::with_capacity(order.len()))).collect();
    let mut out_sources: HashMap<Parameter, Vec<Option<String>>> = parameters.iter().map(|p| (*p, Vec::with_capacity(order.len()))).collect();

    for key in &order {
        out_station.push(key.0.clone());
        out_time.push(key.1);
        let rows = &groups[key];

        for parameter in &parameters {
            let value_col = df.column(parameter.id()).map_err(MeteoError::Polars)?;
            let source_col = df.column(&source_column(*parameter)).ok();

            let mut picked_value = None;
            let mut picked_source: Option<String> = None;
            let mut best_priority = i32::MIN;

            for &row in rows {
                let value = value_col.get(row).map_err(MeteoError::Polars)?;
                let value_f64 = match value {
                    AnyValue::Float64(v) => Some(v),
                    AnyValue::Null => None,
                    other => other.try_extract::<f64>().ok(),
                };
                let Some(v) = value_f64 else { continue };
                let source = source_col
                    .and_then(|c| c.get(row).ok())
                    .and_then(|av| match av {
                        AnyValue::Utf8(s) => Some(s.to_string()),
                        _ => None,
                    });
                let priority = source
                    .as_deref()
                    .and_then(registry::priority)
                    .unwrap_or(0);

                if picked_value.is_none() || priority > best_priority {
                    picked_value = Some(v);
                    picked_source = source;
                    best_priority = priority;
                }
            }

            out_params.get_mut(parameter).unwrap().push(picked_value);
            out_sources.get_mut(parameter).unwrap().push(picked_source);
        }
    }

    let mut columns = vec![
        Series::new(STATION_COL, out_station),
        Series::new(TIME_COL, out_time).cast(&DataType::Datetime(TimeUnit::Milliseconds, None)).map_err(MeteoError::Polars)?,
    ];
    for parameter in &parameters {
        columns.push(Series::new(parameter.id(), out_params.remove(parameter).unwrap()));
        columns.push(Series::new(&source_column(*parameter), out_sources.remove(parameter).unwrap()));
    }

    let out = DataFrame::new(columns).map_err(MeteoError::Polars)?;
    Frame::from_dataframe(out)
        .map_err(MeteoError::Polars)
        .and_then(|f| f.sort_by_station_time().map_err(MeteoError::Polars))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_row(station: &str, time_millis: i64, temp: Option<f64>) -> Frame {
        let df = DataFrame::new(vec![
            Series::new(STATION_COL, vec![station.to_string()]),
            Series::new(TIME_COL, vec![time_millis]).cast(&DataType::Datetime(TimeUnit::Milliseconds, None)).unwrap(),
            Series::new("temp", vec![temp]),
        ])
        .unwrap();
        Frame::from_dataframe(df).unwrap()
    }

    #[test]
    fn merge_rejects_empty_list() {
        assert!(matches!(merge(vec![]), Err(MeteoError::EmptyMerge)));
    }

    #[test]
    fn merge_rejects_divergent_granularity() {
        let a = TimeSeries::new(Frame::empty(), vec![], Granularity::Hourly, None, None);
        let b = TimeSeries::new(Frame::empty(), vec![], Granularity::Daily, None, None);
        assert!(matches!(merge(vec![a, b]), Err(MeteoError::IncompatibleMerge)));
    }

    #[test]
    fn squash_of_empty_frame_is_identity() {
        let squashed = squash(&Frame::empty()).unwrap();
        assert_eq!(squashed.height(), 0);
    }

    #[test]
    fn squash_prefers_higher_priority_source_on_conflict() {
        let a = frame_with_row("10637", 0, Some(1.0)).stamp_source("meteostat_hourly").unwrap();
        let b = frame_with_row("10637", 0, Some(2.0)).stamp_source("dwd_hourly").unwrap();
        let combined = Frame::concat(vec![a, b]).unwrap();
        let squashed = squash(&combined).unwrap();
        assert_eq!(squashed.height(), 1);
        let value = squashed.as_dataframe().column("temp").unwrap().f64().unwrap().get(0);
        assert_eq!(value, Some(2.0)); // dwd_hourly priority 30 > meteostat_hourly priority 10
    }

    #[test]
    fn squash_falls_back_to_only_available_value() {
        let a = frame_with_row("10637", 0, Some(5.0)).stamp_source("metno_forecast").unwrap();
        let b = frame_with_row("10637", 0, None).stamp_source("dwd_hourly").unwrap();
        let combined = Frame::concat(vec![a, b]).unwrap();
        let squashed = squash(&combined).unwrap();
        let value = squashed.as_dataframe().column("temp").unwrap().f64().unwrap().get(0);
        assert_eq!(value, Some(5.0));
    }
}
