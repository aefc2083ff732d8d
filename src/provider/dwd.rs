//! Deutscher Wetterdienst open-data FTP archive, grounded in
//! `original_source/meteostat/api/config.py::dwd_ftp_host` and the
//! `tests/provider/test_dwd_hourly.py` / `test_dwd_daily.py` fixtures
//! referenced in `_INDEX.md`.
//!
//! DWD publishes one semicolon-delimited CSV per station per parameter
//! group, zipped, under a directory that's stable per granularity but
//! whose filename embeds the station id and an archive date range that
//! has to be discovered via an FTP directory listing.

use std::io::Read;

use polars::prelude::*;

use crate::cache::{cached_frame, Cache};
use crate::config::Config;
use crate::frame::{Frame, STATION_COL, TIME_COL};
use crate::granularity::Granularity;
use crate::network::{ftp_list, ftp_retr};
use crate::request::ProviderRequest;
use crate::station::Station;

fn directory_for(granularity: Granularity) -> &'static str {
    match granularity {
        Granularity::Hourly => "/climate_environment/CDC/observations_germany/climate/hourly/air_temperature/historical/",
        Granularity::Daily => "/climate_environment/CDC/observations_germany/climate/daily/kl/historical/",
        _ => "/climate_environment/CDC/observations_germany/climate/monthly/kl/historical/",
    }
}

fn station_zip_name(entries: &[String], station_id: &str) -> Option<String> {
    entries
        .iter()
        .find(|e| e.contains(&format!("_{station_id}_")) && e.ends_with(".zip"))
        .cloned()
}

fn parse_zip_csv(bytes: &[u8]) -> Option<DataFrame> {
    let cursor = std::io::Cursor::new(bytes);
    let mut archive = zip::ZipArchive::new(cursor).ok()?;
    let mut text = String::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).ok()?;
        if file.name().starts_with("produkt_") {
            file.read_to_string(&mut text).ok()?;
            break;
        }
    }
    if text.is_empty() {
        return None;
    }

    let cursor = std::io::Cursor::new(text);
    CsvReader::new(cursor)
        .with_separator(b';')
        .has_header(true)
        .finish()
        .ok()
}

/// Fetch one station's full archived series for the requested granularity.
/// DWD ships a complete historical record per file, so the window is
/// applied by the dispatch engine's downstream row filter, not here.
pub async fn fetch(req: &ProviderRequest, station: &Station, cache: &Cache, config: &Config) -> Frame {
    let Some(station_id) = station.identifiers.get("national") else {
        return Frame::empty();
    };

    let dir = directory_for(req.granularity);
    let function_id = format!("dwd_{}", req.granularity);
    let args = (station_id.as_str(), dir);

    let maybe_df = cached_frame(cache, &function_id, &args, config.cache_ttl, || async {
        let entries = ftp_list(&config.dwd_ftp_host, dir).await?;
        let filename = station_zip_name(&entries, station_id)?;
        let path = format!("{dir}{filename}");
        let bytes = ftp_retr(&config.dwd_ftp_host, &path).await?;
        parse_zip_csv(&bytes)
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

fn build_canonical(mut df: DataFrame, req: &ProviderRequest) -> PolarsResult<Frame> {
    let height = df.height();
    let station_col = Series::new(STATION_COL, vec![req.station_id.clone(); height]);

    let time_col = if df.column("MESS_DATUM").is_ok() {
        let raw = df.column("MESS_DATUM")?.cast(&DataType::Utf8)?;
        let fmt = if raw.utf8()?.get(0).map(|s| s.len()) == Some(10) {
            "%Y%m%d%H"
        } else {
            "%Y%m%d"
        };
        raw.utf8()?
            .into_iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect::<Series>()
            .str_to_datetime(Some(fmt), None, false)?
    } else {
        Series::full_null(TIME_COL, height, &DataType::Datetime(TimeUnit::Milliseconds, None))
    };
    let time_col = time_col.with_name(TIME_COL);

    let mut out = DataFrame::new(vec![station_col, time_col])?;

    let rename_pairs = [
        ("TT_TU", "temp"),
        ("RF_TU", "rhum"),
        ("TMK", "temp"),
        ("TNK", "tmin"),
        ("TXK", "tmax"),
        ("RSK", "prcp"),
        ("SHK_TAG", "snwd"),
        ("FM", "wspd"),
        ("DD", "wdir"),
        ("PM", "pres"),
        ("SDK", "tsun"),
    ];
    for (from, to) in rename_pairs {
        if df.column(from).is_ok() && df.column(to).is_err() {
            df.rename(from, to)?;
        }
    }
    for col in ["temp", "tmin", "tmax", "rhum", "prcp", "snwd", "wspd", "wdir", "pres", "tsun"] {
        if let Ok(series) = df.column(col) {
            out.with_column(series.clone())?;
        }
    }

    Frame::from_dataframe(out)
}
