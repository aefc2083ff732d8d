//! Environment and Climate Change Canada hourly climate API, grounded in
//! `original_source/meteostat/providers/eccc/hourly.py`.
//!
//! The upstream feed is queried per calendar year and keyed by the
//! station's `CLIMATE_IDENTIFIER`, resolved from the station's `national`
//! identifier through ECCC's station metadata endpoint.

use std::collections::HashMap;

use serde::Deserialize;

use crate::cache::{cached_json, Cache};
use crate::config::Config;
use crate::frame::{Frame, STATION_COL, TIME_COL};
use crate::network::NetworkClient;
use crate::request::ProviderRequest;
use crate::station::Station;

const ENDPOINT: &str = "https://api.weather.gc.ca/collections";
const BATCH_LIMIT: u32 = 9000;

#[derive(Debug, Deserialize, Clone)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize, Clone)]
struct Feature {
    #[serde(default)]
    properties: HashMap<String, serde_json::Value>,
}

async fn get_year(client: &NetworkClient, climate_id: &str, year: i32) -> Option<FeatureCollection> {
    let start = format!("{year}-01-01T00:00:00");
    let end = format!("{year}-12-31T23:59:59");
    let url = format!(
        "{ENDPOINT}/climate-hourly/items?CLIMATE_IDENTIFIER={climate_id}&datetime={start}/{end}&f=json&limit={BATCH_LIMIT}"
    );
    let resp = client.get(&url).await.ok()??;
    if !resp.is_success() {
        return None;
    }
    serde_json::from_str(&resp.body).ok()
}

fn as_f64(value: Option<&serde_json::Value>) -> Option<f64> {
    value.and_then(|v| v.as_f64())
}

fn as_str(value: Option<&serde_json::Value>) -> Option<String> {
    value.and_then(|v| v.as_str()).map(str::to_string)
}

/// Fetch hourly data for one station across its requested window. Returns
/// an empty frame when the station has no `national` (ECCC climate)
/// identifier — that's a missing-dependency case, not an error.
pub async fn fetch(req: &ProviderRequest, station: &Station, client: &NetworkClient, cache: &Cache, config: &Config) -> Frame {
    let Some(climate_id) = station.identifiers.get("national") else {
        return Frame::empty();
    };

    let mut stations = Vec::new();
    let mut times = Vec::new();
    let mut temp = Vec::new();
    let mut rhum = Vec::new();
    let mut wdir = Vec::new();
    let mut wspd = Vec::new();
    let mut prcp = Vec::new();

    for year in req.start.format("%Y").to_string().parse::<i32>().unwrap_or(1970)
        ..=req.end.format("%Y").to_string().parse::<i32>().unwrap_or(1970)
    {
        let function_id = "eccc_hourly";
        let args = (climate_id.as_str(), year);
        let collection = cached_json::<FeatureCollection, _, _>(cache, function_id, &args, config.cache_ttl, || async {
            get_year(client, climate_id, year).await
        })
        .await;

        let Some(collection) = collection else {
            continue;
        };

        for feature in collection.features {
            let props = &feature.properties;
            let Some(time) = as_str(props.get("UTC_DATE")) else {
                continue;
            };
            stations.push(req.station_id.clone());
            times.push(time);
            temp.push(as_f64(props.get("TEMP")));
            rhum.push(as_f64(props.get("RELATIVE_HUMIDITY")));
            wdir.push(as_f64(props.get("WIND_DIRECTION")).map(|v| v * 10.0));
            wspd.push(as_f64(props.get("WIND_SPEED")));
            prcp.push(as_f64(props.get("PRECIP_AMOUNT")));
        }
    }

    if stations.is_empty() {
        return Frame::empty();
    }

    use polars::prelude::*;
    let df = match DataFrame::new(vec![
        Series::new(STATION_COL, stations),
        Series::new(TIME_COL, times)
            .str_to_datetime(Some("%Y-%m-%dT%H:%M:%S%.fZ"), None, false)
            .unwrap_or_else(|_| Series::new(TIME_COL, Vec::<i64>::new())),
        Series::new("temp", temp),
        Series::new("rhum", rhum),
        Series::new("wdir", wdir),
        Series::new("wspd", wspd),
        Series::new("prcp", prcp),
    ]) {
        Ok(df) => df,
        Err(_) => return Frame::empty(),
    };

    Frame::from_dataframe(df).unwrap_or_else(|_| Frame::empty())
}
