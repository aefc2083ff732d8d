//! MET Norway Locationforecast API, grounded in
//! `original_source/meteostat/api/config.py::metno_forecast_endpoint` and
//! `tests/provider/test_metno_forecast.py`.
//!
//! Unlike the other adapters this one is point-based, not station-id
//! based: MET Norway forecasts any lat/lon/altitude triple, so the
//! station's own coordinates are used directly instead of an identifier
//! lookup.

use polars::prelude::*;
use serde::Deserialize;

use crate::cache::{cached_json, Cache};
use crate::config::Config;
use crate::frame::{Frame, STATION_COL, TIME_COL};
use crate::network::NetworkClient;
use crate::request::ProviderRequest;
use crate::station::Station;

#[derive(Debug, Deserialize)]
struct LocationforecastResponse {
    properties: Properties,
}

#[derive(Debug, Deserialize)]
struct Properties {
    timeseries: Vec<TimeStep>,
}

#[derive(Debug, Deserialize)]
struct TimeStep {
    time: String,
    data: StepData,
}

#[derive(Debug, Deserialize)]
struct StepData {
    instant: Instant,
}

#[derive(Debug, Deserialize)]
struct Instant {
    details: Details,
}

#[derive(Debug, Deserialize, Default)]
struct Details {
    air_temperature: Option<f64>,
    relative_humidity: Option<f64>,
    air_pressure_at_sea_level: Option<f64>,
    wind_from_direction: Option<f64>,
    wind_speed: Option<f64>,
    cloud_area_fraction: Option<f64>,
}

async fn get_forecast(client: &NetworkClient, config: &Config, station: &Station) -> Option<LocationforecastResponse> {
    let url = config
        .metno_forecast_endpoint
        .replace("{latitude}", &station.latitude.to_string())
        .replace("{longitude}", &station.longitude.to_string())
        .replace("{elevation}", &station.elevation.to_string());
    let resp = client.get(&url).await.ok()??;
    if !resp.is_success() {
        return None;
    }
    serde_json::from_str(&resp.body).ok()
}

/// Fetch the current forecast window for a station's coordinates. Always a
/// forward-looking feed — historical requests naturally return no
/// overlapping rows once the dispatch engine's window filter runs.
pub async fn fetch(req: &ProviderRequest, station: &Station, client: &NetworkClient, cache: &Cache, config: &Config) -> Frame {
    let function_id = "metno_forecast";
    let args = (station.latitude, station.longitude, station.elevation);
    let response = cached_json::<LocationforecastResponse, _, _>(cache, function_id, &args, config.cache_ttl, || async {
        get_forecast(client, config, station).await
    })
    .await;

    let Some(response) = response else {
        return Frame::empty();
    };
    if response.properties.timeseries.is_empty() {
        return Frame::empty();
    }

    let height = response.properties.timeseries.len();
    let times: Vec<String> = response.properties.timeseries.iter().map(|t| t.time.clone()).collect();
    let details: Vec<&Details> = response
        .properties
        .timeseries
        .iter()
        .map(|t| &t.data.instant.details)
        .collect();

    let df = DataFrame::new(vec![
        Series::new(STATION_COL, vec![req.station_id.clone(); height]),
        Series::new(TIME_COL, times)
            .str_to_datetime(Some("%Y-%m-%dT%H:%M:%S%.fZ"), None, false)
            .unwrap_or_else(|_| Series::full_null(TIME_COL, height, &DataType::Datetime(TimeUnit::Milliseconds, None))),
        Series::new("temp", details.iter().map(|d| d.air_temperature).collect::<Vec<_>>()),
        Series::new("rhum", details.iter().map(|d| d.relative_humidity).collect::<Vec<_>>()),
        Series::new("pres", details.iter().map(|d| d.air_pressure_at_sea_level).collect::<Vec<_>>()),
        Series::new("wdir", details.iter().map(|d| d.wind_from_direction).collect::<Vec<_>>()),
        Series::new("wspd", details.iter().map(|d| d.wind_speed).collect::<Vec<_>>()),
        Series::new(
            "cldc",
            details.iter().map(|d| d.cloud_area_fraction.map(|v| v / 12.5)).collect::<Vec<_>>(),
        ),
    ]);

    match df {
        Ok(df) => Frame::from_dataframe(df).unwrap_or_else(|_| Frame::empty()),
        Err(_) => Frame::empty(),
    }
}
