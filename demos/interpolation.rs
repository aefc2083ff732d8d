//! Interpolate daily observations to an arbitrary point, translated from
//! `original_source/examples/interpolation.py`.

use chrono::NaiveDate;
use meteostat::{Client, FetchOptions, InterpolationOptions, Point};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    meteostat::logging::init();

    let client = Client::new();
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2020, 1, 31).unwrap();

    let stations = vec!["10637".to_string(), "D1424".to_string(), "EDFE0".to_string()];
    let series = client.daily(stations, start, Some(end), None).await?;

    let point = Point::new(50.0, 8.6, Some(120.0))?;
    let interpolated = client.interpolate(&series, point, &InterpolationOptions::default())?;

    let df = interpolated.fetch(FetchOptions::default())?;
    println!("{df}");
    Ok(())
}
