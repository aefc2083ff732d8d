//! GeoSphere Austria Data Hub, newer "timestamps + parameters-array"
//! response layout, grounded in
//! `original_source/meteostat/providers/gsa/hourly.py` and
//! `gsa/shared.py`.
//!
//! The Python source ships two parallel GSA implementations: this newer
//! layout (`gsa/*`, top-level `timestamps` array plus per-parameter value
//! arrays under `features[0].properties.parameters`) and an older
//! per-feature-time layout (`gsadh/*`). Only the newer layout is
//! implemented here — see `DESIGN.md` for the Open Question this resolves.

use std::collections::HashMap;

use polars::prelude::*;
use serde::Deserialize;

use crate::cache::{cached_json, Cache};
use crate::config::Config;
use crate::frame::{Frame, STATION_COL, TIME_COL};
use crate::network::NetworkClient;
use crate::parameter::Parameter;
use crate::request::ProviderRequest;
use crate::station::Station;

const RESOURCE_ID_HOURLY: &str = "klima-v2-1h";

fn parameter_mapping() -> &'static [(&'static str, Parameter)] {
    &[
        ("tl", Parameter::Temp),
        ("rr", Parameter::Prcp),
        ("p", Parameter::Pres),
        ("ff", Parameter::Wspd),
        ("dd", Parameter::Wdir),
        ("rf", Parameter::Rhum),
        ("so_h", Parameter::Tsun),
    ]
}

fn to_gsa_code(parameter: Parameter) -> Option<&'static str> {
    parameter_mapping().iter().find(|(_, p)| *p == parameter).map(|(c, _)| *c)
}

fn from_gsa_code(code: &str) -> Option<Parameter> {
    parameter_mapping().iter().find(|(c, _)| *c == code).map(|(_, p)| *p)
}

fn convert_wspd_ms_to_kmh(v: f64) -> f64 {
    v * 3.6
}

fn convert_tsun_h_to_min(v: f64) -> f64 {
    v * 60.0
}

#[derive(Debug, Deserialize)]
struct GsaResponse {
    #[serde(default)]
    timestamps: Vec<String>,
    #[serde(default)]
    features: Vec<GsaFeature>,
}

#[derive(Debug, Deserialize)]
struct GsaFeature {
    properties: GsaProperties,
}

#[derive(Debug, Deserialize)]
struct GsaProperties {
    parameters: HashMap<String, GsaParamSeries>,
}

#[derive(Debug, Deserialize)]
struct GsaParamSeries {
    data: Vec<Option<f64>>,
}

async fn get_data(
    client: &NetworkClient,
    config: &Config,
    station_id: &str,
    codes: &[&str],
    start: &str,
    end: &str,
) -> Option<GsaResponse> {
    let url = format!(
        "{}/station/historical/{RESOURCE_ID_HOURLY}?parameters={}&station_ids={station_id}&start={start}&end={end}&output_format=geojson",
        config.gsa_api_base_url,
        codes.join(",")
    );
    let resp = client.get(&url).await.ok()??;
    if !resp.is_success() {
        return None;
    }
    serde_json::from_str(&resp.body).ok()
}

/// Fetch hourly data from GeoSphere Austria. Returns an empty frame when
/// the station carries no `national` identifier, or when none of the
/// requested parameters have a GSA mapping.
pub async fn fetch(req: &ProviderRequest, station: &Station, client: &NetworkClient, cache: &Cache, config: &Config) -> Frame {
    let Some(station_id) = station.identifiers.get("national") else {
        return Frame::empty();
    };

    let codes: Vec<&str> = req.parameters.iter().filter_map(|p| to_gsa_code(*p)).collect();
    if codes.is_empty() {
        return Frame::empty();
    }

    let start = req.start.format("%Y-%m-%dT%H:%M").to_string();
    let end = req.end.format("%Y-%m-%dT%H:%M").to_string();

    let function_id = "gsa_hourly";
    let args = (station_id.as_str(), codes.clone(), start.clone(), end.clone());
    let response = cached_json::<GsaResponse, _, _>(cache, function_id, &args, config.cache_ttl, || async {
        get_data(client, config, station_id, &codes, &start, &end).await
    })
    .await;

    let Some(response) = response else {
        return Frame::empty();
    };
    let Some(feature) = response.features.first() else {
        return Frame::empty();
    };
    if response.timestamps.is_empty() {
        return Frame::empty();
    }

    let height = response.timestamps.len();
    let station_col = Series::new(STATION_COL, vec![req.station_id.clone(); height]);
    let time_col = Series::new(TIME_COL, response.timestamps.clone())
        .str_to_datetime(Some("%Y-%m-%dT%H:%M:%S%.f%:z"), None, false)
        .or_else(|_| Series::new(TIME_COL, response.timestamps).str_to_datetime(Some("%Y-%m-%dT%H:%M:%S"), None, false));
    let Ok(time_col) = time_col else {
        return Frame::empty();
    };

    let mut columns = vec![station_col, time_col];
    for (code, values) in &feature.properties.parameters {
        let Some(parameter) = from_gsa_code(code) else {
            continue;
        };
        let converted: Vec<Option<f64>> = values
            .data
            .iter()
            .map(|v| {
                v.map(|x| match parameter {
                    Parameter::Wspd => convert_wspd_ms_to_kmh(x),
                    Parameter::Tsun => convert_tsun_h_to_min(x),
                    _ => x,
                })
            })
            .collect();
        if converted.len() == height {
            columns.push(Series::new(parameter.id(), converted));
        }
    }

    match DataFrame::new(columns) {
        Ok(df) => Frame::from_dataframe(df).unwrap_or_else(|_| Frame::empty()),
        Err(_) => Frame::empty(),
    }
}
