//! NOAA Aviation Weather Center METAR feed, grounded in
//! `original_source/meteostat/api/config.py::aviationweather_endpoint`
//! and `tests/provider/test_noaa_metar.py`.
//!
//! METAR is a fixed-format text report, not JSON; this module owns a
//! minimal tokenizer for the handful of groups Meteostat maps to
//! parameters (temperature/dewpoint, wind, altimeter, present weather).

use polars::prelude::*;

use crate::cache::{cached_json, Cache};
use crate::config::Config;
use crate::frame::{Frame, STATION_COL, TIME_COL};
use crate::network::NetworkClient;
use crate::request::ProviderRequest;
use crate::station::Station;

struct MetarObservation {
    time: chrono::NaiveDateTime,
    temp: Option<f64>,
    dwpt: Option<f64>,
    wdir: Option<f64>,
    wspd: Option<f64>,
    pres: Option<f64>,
}

/// `12/08` or `M05/M02` style temperature/dewpoint group.
fn parse_temp_dwpt(token: &str) -> Option<(Option<f64>, Option<f64>)> {
    let (t, d) = token.split_once('/')?;
    let parse_one = |s: &str| -> Option<f64> {
        if let Some(rest) = s.strip_prefix('M') {
            rest.parse::<f64>().ok().map(|v| -v)
        } else if s.is_empty() {
            None
        } else {
            s.parse::<f64>().ok()
        }
    };
    Some((parse_one(t), parse_one(d)))
}

fn parse_wind(token: &str) -> Option<(Option<f64>, Option<f64>)> {
    if token.len() < 7 || !token.ends_with("KT") {
        return None;
    }
    let dir = token.get(0..3)?;
    let spd = token.get(3..5)?;
    let dir = if dir == "VRB" { None } else { dir.parse::<f64>().ok() };
    let spd = spd.parse::<f64>().ok();
    Some((dir, spd))
}

fn parse_altimeter(token: &str) -> Option<f64> {
    let digits = token.strip_prefix('A')?;
    let inches: f64 = digits.parse::<f64>().ok()? / 100.0;
    Some(inches * 33.8639) // inHg to hPa
}

fn parse_report(raw: &str, reference_date: chrono::NaiveDate) -> Option<MetarObservation> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    let mut time = None;
    let mut temp = None;
    let mut dwpt = None;
    let mut wdir = None;
    let mut wspd = None;
    let mut pres = None;

    for token in &tokens {
        if token.ends_with('Z') && token.len() == 7 {
            let day: u32 = token[0..2].parse().ok()?;
            let hour: u32 = token[2..4].parse().ok()?;
            let minute: u32 = token[4..6].parse().ok()?;
            time = reference_date
                .with_day(day)
                .and_then(|d| d.and_hms_opt(hour, minute, 0));
        } else if let Some((t, d)) = parse_temp_dwpt(token) {
            if t.is_some() || d.is_some() {
                temp = t;
                dwpt = d;
            }
        } else if let Some((d, s)) = parse_wind(token) {
            wdir = d;
            wspd = s;
        } else if let Some(p) = parse_altimeter(token) {
            pres = Some(p);
        }
    }

    Some(MetarObservation {
        time: time?,
        temp,
        dwpt,
        wdir,
        wspd,
        pres,
    })
}

use chrono::Datelike;

async fn get_raw(client: &NetworkClient, config: &Config, icao: &str) -> Option<String> {
    let url = config
        .aviationweather_endpoint
        .replace("{station}", icao);
    let resp = client.get(&url).await.ok()??;
    if !resp.is_success() || resp.body.trim().is_empty() {
        return None;
    }
    Some(resp.body)
}

/// Fetch current METAR observations for one station. Only the most recent
/// window aviationweather.gov serves is available; historical requests
/// outside it simply return no rows.
pub async fn fetch(req: &ProviderRequest, station: &Station, client: &NetworkClient, cache: &Cache, config: &Config) -> Frame {
    let Some(icao) = station.identifiers.get("icao") else {
        return Frame::empty();
    };

    let function_id = "noaa_metar";
    let args = (icao.as_str(),);
    let raw = cached_json::<String, _, _>(cache, function_id, &args, config.cache_ttl, || async {
        get_raw(client, config, icao).await
    })
    .await;

    let Some(raw) = raw else {
        return Frame::empty();
    };

    let today = req.end;
    let observations: Vec<MetarObservation> = raw.lines().filter_map(|line| parse_report(line, today)).collect();

    if observations.is_empty() {
        return Frame::empty();
    }

    let height = observations.len();
    let df = DataFrame::new(vec![
        Series::new(STATION_COL, vec![req.station_id.clone(); height]),
        Series::new(
            TIME_COL,
            observations.iter().map(|o| o.time.and_utc().timestamp_millis()).collect::<Vec<_>>(),
        )
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        .unwrap(),
        Series::new("temp", observations.iter().map(|o| o.temp).collect::<Vec<_>>()),
        Series::new("dwpt", observations.iter().map(|o| o.dwpt).collect::<Vec<_>>()),
        Series::new("wdir", observations.iter().map(|o| o.wdir).collect::<Vec<_>>()),
        Series::new("wspd", observations.iter().map(|o| o.wspd).collect::<Vec<_>>()),
        Series::new("pres", observations.iter().map(|o| o.pres).collect::<Vec<_>>()),
    ]);

    match df {
        Ok(df) => Frame::from_dataframe(df).unwrap_or_else(|_| Frame::empty()),
        Err(_) => Frame::empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parses_temperature_dewpoint_group() {
        assert_eq!(parse_temp_dwpt("12/08"), Some((Some(12.0), Some(8.0))));
        assert_eq!(parse_temp_dwpt("M05/M10"), Some((Some(-5.0), Some(-10.0))));
    }

    #[test]
    fn parses_wind_group() {
        assert_eq!(parse_wind("27015KT"), Some((Some(270.0), Some(15.0))));
        assert_eq!(parse_wind("VRB03KT"), Some((None, Some(3.0))));
    }

    #[test]
    fn parses_altimeter_group_to_hpa() {
        let hpa = parse_altimeter("A3012").unwrap();
        assert!((hpa - 1019.86).abs() < 0.1);
    }

    #[test]
    fn parses_full_report() {
        let report = "KJFK 151851Z 27015KT 10SM FEW250 12/08 A3012 RMK AO2";
        let obs = parse_report(report, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()).unwrap();
        assert_eq!(obs.temp, Some(12.0));
        assert_eq!(obs.dwpt, Some(8.0));
        assert_eq!(obs.wdir, Some(270.0));
        assert_eq!(obs.wspd, Some(15.0));
    }
}
