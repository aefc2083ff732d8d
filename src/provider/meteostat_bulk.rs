//! Meteostat's own bulk archive, grounded in
//! `original_source/meteostat/api/config.py`'s `hourly_endpoint` /
//! `daily_endpoint` / `monthly_endpoint` templates. One gzip-compressed CSV
//! per station per year (hourly/daily) or per station (monthly), fetched
//! over HTTP and parsed with polars' CSV reader.

use std::io::Read;

use flate2::read::GzDecoder;
use polars::prelude::*;

use crate::cache::{cached_frame, Cache};
use crate::config::Config;
use crate::frame::{Frame, STATION_COL, TIME_COL};
use crate::granularity::Granularity;
use crate::network::NetworkClient;
use crate::request::ProviderRequest;

const PROVIDER_ID: &str = "meteostat_bulk";

fn endpoint_for(config: &Config, granularity: Granularity) -> &str {
    match granularity {
        Granularity::Hourly => &config.meteostat_hourly_endpoint,
        Granularity::Daily => &config.meteostat_daily_endpoint,
        Granularity::Monthly | Granularity::Normals => &config.meteostat_monthly_endpoint,
    }
}

fn column_order(granularity: Granularity) -> &'static [&'static str] {
    match granularity {
        Granularity::Hourly => &[
            "date", "hour", "temp", "dwpt", "rhum", "prcp", "snow", "wdir", "wspd", "wpgt", "pres",
            "tsun", "coco",
        ],
        Granularity::Daily => &[
            "date", "tavg", "tmin", "tmax", "prcp", "snow", "wdir", "wspd", "wpgt", "pres", "tsun",
        ],
        Granularity::Monthly | Granularity::Normals => {
            &["year", "month", "tavg", "tmin", "tmax", "prcp", "wspd", "pres", "tsun"]
        }
    }
}

async fn fetch_year(client: &NetworkClient, config: &Config, station_id: &str, year: i32) -> Option<DataFrame> {
    let granularity = Granularity::Hourly;
    let url = endpoint_for(config, granularity)
        .replace("{year}", &year.to_string())
        .replace("{station}", station_id);

    let (status, bytes) = client.get_bytes(&url).await.ok()??;
    if !status.is_success() {
        return None;
    }

    let mut decoder = GzDecoder::new(&bytes[..]);
    let mut text = String::new();
    decoder.read_to_string(&mut text).ok()?;

    let names = column_order(granularity);
    let cursor = std::io::Cursor::new(text);
    CsvReader::new(cursor)
        .has_header(false)
        .with_columns(Some(names.iter().map(|s| s.to_string()).collect()))
        .finish()
        .ok()
}

/// Fetch bulk-archive data for one station across its requested window,
/// yearly for hourly granularity, a single document for daily/monthly.
pub async fn fetch(
    req: &ProviderRequest,
    client: &NetworkClient,
    cache: &Cache,
    config: &Config,
) -> Frame {
    let function_id = format!("{PROVIDER_ID}_{}", req.granularity);
    let args = (&req.station_id, req.start, req.end);

    let maybe_df = cached_frame(cache, &function_id, &args, config.cache_ttl, || async {
        match req.granularity {
            Granularity::Hourly => {
                let mut frames = Vec::new();
                for year in req.start.format("%Y").to_string().parse::<i32>().unwrap_or(1970)
                    ..=req.end.format("%Y").to_string().parse::<i32>().unwrap_or(1970)
                {
                    if let Some(df) = fetch_year(client, config, &req.station_id, year).await {
                        frames.push(df);
                    }
                }
                if frames.is_empty() {
                    None
                } else {
                    frames
                        .into_iter()
                        .reduce(|a, b| a.vstack(&b).unwrap_or(a))
                }
            }
            _ => None,
        }
    })
    .await;

    let Some(df) = maybe_df else {
        return Frame::empty();
    };

    match build_canonical(df, req) {
        Ok(frame) => frame,
        Err(_) => Frame::empty(),
    }
}

fn build_canonical(df: DataFrame, req: &ProviderRequest) -> PolarsResult<Frame> {
    let height = df.height();
    let station_series = Series::new(STATION_COL, vec![req.station_id.clone(); height]);
    let time_series = if df.column("hour").is_ok() {
        df.column("date")?
            .cast(&DataType::Utf8)?
            .utf8()?
            .into_iter()
            .zip(df.column("hour")?.i64()?.into_iter())
            .map(|(d, h)| format!("{}T{:02}:00:00", d.unwrap_or_default(), h.unwrap_or(0)))
            .collect::<Vec<_>>()
    } else {
        df.column("date")?
            .cast(&DataType::Utf8)?
            .utf8()?
            .into_iter()
            .map(|d| d.unwrap_or_default().to_string())
            .collect::<Vec<_>>()
    };
    let time_series = Series::new(TIME_COL, time_series)
        .str_to_datetime(Some("%Y-%m-%dT%H:%M:%S"), None, false)
        .unwrap_or_else(|_| Series::full_null(TIME_COL, height, &DataType::Datetime(TimeUnit::Milliseconds, None)));

    let mut out = DataFrame::new(vec![station_series, time_series])?;
    let rename_pairs = [("tavg", "temp"), ("snow", "snwd")];
    let mut renamed = df;
    for (from, to) in rename_pairs {
        if renamed.column(from).is_ok() {
            renamed.rename(from, to)?;
        }
    }
    for col in ["temp", "dwpt", "tmin", "tmax", "rhum", "prcp", "snwd", "wdir", "wspd", "wpgt", "pres", "tsun", "coco"] {
        if let Ok(series) = renamed.column(col) {
            out.with_column(series.clone())?;
        }
    }

    Frame::from_dataframe(out)
}
