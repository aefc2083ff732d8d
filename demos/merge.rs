//! Combine two independently fetched hourly series and squash duplicate
//! providers down to one row per station/timestamp, translated from
//! `original_source/examples/provider.py`.

use chrono::NaiveDate;
use meteostat::{merge, Client, FetchOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    meteostat::logging::init();

    let client = Client::new();
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();

    let meteostat_only = client
        .hourly(vec!["10637".to_string()], start, Some(end), Some(&["meteostat_hourly"]))
        .await?;
    let dwd_only = client
        .hourly(vec!["10637".to_string()], start, Some(end), Some(&["dwd_hourly"]))
        .await?;

    let merged = merge(vec![meteostat_only, dwd_only])?;
    let df = merged.fetch(FetchOptions {
        squash: true,
        sources: true,
        ..Default::default()
    })?;

    println!("{df}");
    Ok(())
}
