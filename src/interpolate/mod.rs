//! Spatial interpolator, grounded in
//! `original_source/meteostat/interpolation/__init__.py` and its
//! `idw.py`/`lapserate.py` collaborators.

pub mod idw;
pub mod lapserate;

use std::collections::BTreeMap;

use polars::prelude::*;

use crate::error::{MeteoError, Result};
use crate::frame::{Frame, STATION_COL, TIME_COL};
use crate::geo::get_distance;
use crate::parameter::Parameter;
use crate::point::Point;
use crate::station::Station;
use crate::timeseries::TimeSeries;

pub const INTERPOLATED_STATION_ID: &str = "interpolated";
const DEFAULT_POWER: f64 = 2.0;
const DEFAULT_LAPSE_RATE: f64 = 6.5;
const DEFAULT_LAPSE_RATE_THRESHOLD_M: f64 = 50.0;

#[derive(Debug, Clone)]
pub struct InterpolationOptions {
    pub power: f64,
    pub lapse_rate: Option<f64>,
    pub lapse_rate_threshold_m: f64,
    pub lapse_rate_parameters: Vec<Parameter>,
}

impl Default for InterpolationOptions {
    fn default() -> Self {
        Self {
            power: DEFAULT_POWER,
            lapse_rate: Some(DEFAULT_LAPSE_RATE),
            lapse_rate_threshold_m: DEFAULT_LAPSE_RATE_THRESHOLD_M,
            lapse_rate_parameters: vec![Parameter::Temp, Parameter::Tmin, Parameter::Tmax],
        }
    }
}

/// Great-circle distance (km) plus a penalty for stations whose elevation
/// differs from the target beyond `threshold_m`.
fn effective_distance(station: &Station, point: &Point, threshold_m: f64) -> f64 {
    let horizontal_km = get_distance(station.latitude, station.longitude, point.latitude, point.longitude) / 1000.0;
    let Some(point_elevation) = point.elevation else {
        return horizontal_km;
    };
    let elevation_diff = (station.elevation - point_elevation).abs();
    if elevation_diff <= threshold_m {
        horizontal_km
    } else {
        horizontal_km + (elevation_diff - threshold_m) / 1000.0
    }
}

/// Produce a synthetic-station TimeSeries at `point` by interpolating
/// every populated column of `series` across its stations, one timestamp
/// at a time.
pub fn interpolate(series: &TimeSeries, point: Point, options: &InterpolationOptions) -> Result<TimeSeries> {
    let stations = series.stations();
    if stations.is_empty() || series.is_empty() {
        return Ok(TimeSeries::new(Frame::empty(), vec![], series.granularity(), series.start(), series.end()));
    }

    let distances: Vec<f64> = stations.iter().map(|s| effective_distance(s, &point, options.lapse_rate_threshold_m)).collect();

    let df = series.clone().into_frame();
    let df = df.as_dataframe();

    let station_col = df.column(STATION_COL)?.cast(&DataType::Utf8)?;
    let time_col = df.column(TIME_COL)?.cast(&DataType::Int64)?;

    let mut rows_by_time: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for row in 0..df.height() {
        let t = time_col.get(row)?.try_extract::<i64>().unwrap_or(0);
        rows_by_time.entry(t).or_default().push(row);
    }

    let station_index: std::collections::HashMap<&str, usize> =
        stations.iter().enumerate().map(|(i, s)| (s.id.as_str(), i)).collect();

    let parameters = series.parameters();
    let mut out_time: Vec<i64> = Vec::with_capacity(rows_by_time.len());
    let mut out_values: std::collections::HashMap<Parameter, Vec<Option<f64>>> =
        parameters.iter().map(|p| (*p, Vec::with_capacity(rows_by_time.len()))).collect();

    for (time, rows) in &rows_by_time {
        out_time.push(*time);

        let mut per_station_value: std::collections::HashMap<Parameter, Vec<Option<f64>>> =
            parameters.iter().map(|p| (*p, vec![None; stations.len()])).collect();

        for &row in rows {
            let station_id = station_col.get(row)?.to_string();
            let Some(&idx) = station_index.get(station_id.as_str()) else {
                continue;
            };
            for parameter in &parameters {
                let Ok(col) = df.column(parameter.id()) else { continue };
                let Ok(floats) = col.cast(&DataType::Float64) else { continue };
                let Ok(ca) = floats.f64() else { continue };
                let mut value = ca.get(row);

                if options.lapse_rate_parameters.contains(parameter) {
                    if let (Some(lapse_rate), Some(point_elevation)) = (options.lapse_rate, point.elevation) {
                        if let Some(v) = value {
                            value = Some(lapserate::apply_lapse_rate(v, stations[idx].elevation, point_elevation, lapse_rate));
                        }
                    }
                }

                per_station_value.get_mut(parameter).unwrap()[idx] = value;
            }
        }

        for parameter in &parameters {
            let values = &per_station_value[parameter];
            let result = if parameter.meta().categorical {
                idw::nearest_neighbor(&distances, values)
            } else {
                let v = idw::inverse_distance_weighting(&distances, values, options.power);
                Some(if v.is_nan() { v } else { (v * 10.0).round() / 10.0 })
            };
            out_values.get_mut(parameter).unwrap().push(Some(result.unwrap_or(f64::NAN)));
        }
    }

    let mut columns = vec![
        Series::new(STATION_COL, vec![INTERPOLATED_STATION_ID.to_string(); out_time.len()]),
        Series::new(TIME_COL, out_time).cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?,
    ];
    for parameter in &parameters {
        columns.push(Series::new(parameter.id(), out_values.remove(parameter).unwrap()));
    }

    let out_df = DataFrame::new(columns).map_err(MeteoError::Polars)?;
    let out_frame = Frame::from_dataframe(out_df).map_err(MeteoError::Polars)?;

    let synthetic_station = Station {
        id: INTERPOLATED_STATION_ID.to_string(),
        name: "Interpolated point".to_string(),
        country: stations[0].country.clone(),
        region: None,
        latitude: point.latitude,
        longitude: point.longitude,
        elevation: point.elevation.unwrap_or(f64::NAN),
        timezone: stations[0].timezone.clone(),
        identifiers: Default::default(),
    };

    Ok(TimeSeries::new(out_frame, vec![synthetic_station], series.granularity(), series.start(), series.end()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::granularity::Granularity;

    fn station(id: &str, lat: f64, lon: f64, elevation: f64) -> Station {
        Station {
            id: id.to_string(),
            name: id.to_string(),
            country: "DE".to_string(),
            region: None,
            latitude: lat,
            longitude: lon,
            elevation,
            timezone: "UTC".to_string(),
            identifiers: Default::default(),
        }
    }

    fn sample_series() -> TimeSeries {
        let stations = vec![station("A", 50.0, 8.0, 100.0), station("B", 50.1, 8.1, 110.0)];
        let df = DataFrame::new(vec![
            Series::new(STATION_COL, vec!["A", "A", "B", "B"]),
            Series::new(TIME_COL, vec![0_i64, 3_600_000, 0, 3_600_000])
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
                .unwrap(),
            Series::new("temp", vec![Some(20.0), Some(21.0), Some(22.0), Some(23.0)]),
        ])
        .unwrap();
        let frame = Frame::from_dataframe(df).unwrap();
        TimeSeries::new(frame, stations, Granularity::Hourly, None, None)
    }

    #[test]
    fn interpolated_series_has_synthetic_station() {
        let point = Point::new(50.05, 8.05, Some(105.0)).unwrap();
        let result = interpolate(&sample_series(), point, &InterpolationOptions::default()).unwrap();
        assert_eq!(result.stations().len(), 1);
        assert_eq!(result.stations()[0].id, INTERPOLATED_STATION_ID);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn elevation_none_skips_lapse_rate_but_still_interpolates() {
        let point = Point::new(50.05, 8.05, None).unwrap();
        let result = interpolate(&sample_series(), point, &InterpolationOptions::default()).unwrap();
        assert!(!result.is_empty());
    }

    #[test]
    fn empty_series_produces_empty_result() {
        let empty = TimeSeries::new(Frame::empty(), vec![], Granularity::Hourly, None, None);
        let point = Point::new(50.0, 8.0, None).unwrap();
        let result = interpolate(&empty, point, &InterpolationOptions::default()).unwrap();
        assert!(result.is_empty());
    }
}
