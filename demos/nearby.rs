//! Nearest stations to a point, translated from
//! `original_source/examples/nearby.py`.

use meteostat::{Client, Point};

fn main() -> anyhow::Result<()> {
    meteostat::logging::init();

    let client = Client::new();
    let point = Point::new(50.05, 8.6, None)?;

    for (station, distance) in client.stations().nearby(point, 5)? {
        println!("{:>8}  {:<30} {:>8.1} m", station.id, station.name, distance);
    }
    Ok(())
}
