//! Station catalog invariants: a `nearby()` query at a station's own
//! coordinates returns that station first with distance 0.

use std::sync::Arc;

use meteostat::config::Config;
use meteostat::point::Point;
use meteostat::stations::Stations;

fn seeded_catalog() -> (tempfile::TempDir, Stations) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("stations.db");

    let conn = rusqlite::Connection::open(&db_path).unwrap();
    conn.execute(
        "CREATE TABLE stations (
            id TEXT PRIMARY KEY, name TEXT, country TEXT, region TEXT,
            latitude REAL, longitude REAL, elevation REAL, timezone TEXT
        )",
        [],
    )
    .unwrap();
    conn.execute("CREATE TABLE station_identifiers (station_id TEXT, key TEXT, value TEXT)", []).unwrap();
    conn.execute(
        "INSERT INTO stations VALUES
            ('10637', 'Frankfurt/Main', 'DE', 'HE', 50.0379, 8.5622, 112.0, 'Europe/Berlin'),
            ('72202', 'Key West', 'US', 'FL', 24.5557, -81.7598, 2.0, 'America/New_York')",
        [],
    )
    .unwrap();
    conn.execute("INSERT INTO station_identifiers VALUES ('10637', 'national', '10637')", []).unwrap();
    drop(conn);

    let mut config = Config::default();
    config.stations_db_file = db_path;
    (dir, Stations::new(Arc::new(config)))
}

#[test]
fn nearby_at_a_stations_own_coordinates_ranks_it_first_with_zero_distance() {
    let (_dir, stations) = seeded_catalog();
    let point = Point::new(50.0379, 8.5622, None).unwrap();
    let results = stations.nearby(point, 2).unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0.id, "10637");
    assert!(results[0].1 < 1.0, "distance to itself should be ~0m, got {}", results[0].1);
    assert!(results[1].1 > results[0].1);
}

#[test]
fn meta_returns_none_for_unknown_station_not_an_error() {
    let (_dir, stations) = seeded_catalog();
    assert!(stations.meta("does-not-exist").unwrap().is_none());
    assert!(stations.meta("").unwrap().is_none());
}

#[test]
fn meta_attaches_identifiers_map() {
    let (_dir, stations) = seeded_catalog();
    let station = stations.meta("10637").unwrap().unwrap();
    assert_eq!(station.identifiers.get("national").map(String::as_str), Some("10637"));
}
