//! Climate-normal reduction, grounded in
//! `original_source/tests/integration/test_normals.py`: a multi-year
//! monthly series collapses to exactly one row per calendar month, each
//! parameter averaged across the years the source request spanned.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;

use crate::error::{MeteoError, Result};
use crate::frame::{Frame, STATION_COL, TIME_COL};
use crate::granularity::Granularity;
use crate::timeseries::TimeSeries;

/// Collapse a fetched monthly series into one row per `(station, month)`,
/// averaging each parameter's non-null values. The result's `start`/`end`
/// are left unset: a normal is a climatology, not a dated observation, so
/// `completeness()` correctly reports `None` for it.
pub fn reduce_to_monthly_normals(monthly: TimeSeries) -> Result<TimeSeries> {
    let stations = monthly.stations().to_vec();
    let parameters = monthly.parameters();
    let frame = monthly.into_frame();
    if frame.is_empty() {
        return Ok(TimeSeries::new(Frame::empty(), stations, Granularity::Normals, None, None));
    }

    let df = frame.as_dataframe();
    let station_col = df.column(STATION_COL).map_err(MeteoError::Polars)?.cast(&DataType::Utf8).map_err(MeteoError::Polars)?;
    let time_col = df.column(TIME_COL).map_err(MeteoError::Polars)?.cast(&DataType::Int64).map_err(MeteoError::Polars)?;

    let height = df.height();
    let mut order: Vec<(String, u32)> = Vec::new();
    let mut groups: HashMap<(String, u32), Vec<usize>> = HashMap::new();
    for row in 0..height {
        let station = station_col.get(row).map_err(MeteoError::Polars)?.to_string();
        let millis = time_col.get(row).map_err(MeteoError::Polars)?.try_extract::<i64>().unwrap_or(0);
        let month = chrono::DateTime::from_timestamp_millis(millis)
            .map(|dt| dt.naive_utc().month())
            .unwrap_or(1);
        let key = (station, month);
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(row);
    }

    let mut out_station: Vec<String> = Vec::with_capacity(order.len());
    let mut out_time: Vec<i64> = Vec::with_capacity(order.len());
    let mut out_params: HashMap<_, Vec<Option<f64>>> = parameters.iter().map(|p| (*p, Vec::with_capacity(order.len()))).collect();

    for key @ (station, month) in &order {
        out_station.push(station.clone());
        // The reference year is arbitrary: only the month-of-year carries
        // meaning for a normal, so every row is stamped onto year 1.
        let stamp = NaiveDate::from_ymd_opt(1, *month, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        out_time.push(stamp.and_utc().timestamp_millis());

        let rows = &groups[key];
        for parameter in &parameters {
            let col = df.column(parameter.id()).map_err(MeteoError::Polars)?.cast(&DataType::Float64).map_err(MeteoError::Polars)?;
            let ca = col.f64().map_err(MeteoError::Polars)?;
            let mut sum = 0.0;
            let mut count = 0usize;
            for &row in rows {
                if let Some(v) = ca.get(row) {
                    sum += v;
                    count += 1;
                }
            }
            out_params.get_mut(parameter).unwrap().push((count > 0).then(|| sum / count as f64));
        }
    }

    let mut columns = vec![
        Series::new(STATION_COL, out_station),
        Series::new(TIME_COL, out_time).cast(&DataType::Datetime(TimeUnit::Milliseconds, None)).map_err(MeteoError::Polars)?,
    ];
    for parameter in &parameters {
        columns.push(Series::new(parameter.id(), out_params.remove(parameter).unwrap()));
    }

    let out = DataFrame::new(columns).map_err(MeteoError::Polars)?;
    let result_frame = Frame::from_dataframe(out)
        .map_err(MeteoError::Polars)?
        .sort_by_station_time()
        .map_err(MeteoError::Polars)?;

    Ok(TimeSeries::new(result_frame, stations, Granularity::Normals, None, None))
}
