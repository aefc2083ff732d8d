//! 30-year climate normals for a station, translated from
//! `original_source/examples/normals.py`.

use meteostat::{Client, FetchOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    meteostat::logging::init();

    let client = Client::new();
    let series = client.normals(vec!["10637".to_string()], 1961, 1990, None, None).await?;
    let df = series.fetch(FetchOptions::default())?;

    println!("{df}");
    Ok(())
}
