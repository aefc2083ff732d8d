//! Daily observations for a single station, translated from
//! `original_source/examples/daily.py`.

use chrono::NaiveDate;
use meteostat::{Client, FetchOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    meteostat::logging::init();

    let client = Client::new();
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2020, 1, 31).unwrap();

    let series = client.daily(vec!["10637".to_string()], start, Some(end), None).await?;
    let df = series.fetch(FetchOptions {
        fill: true,
        squash: true,
        ..Default::default()
    })?;

    println!("{df}");
    Ok(())
}
