//! Embedded station catalog, grounded in
//! `original_source/meteostat/api/stations.py` (as exercised by
//! `tests/unit/test_stations_math.py`, `tests/unit/test_stations_meta.py`
//! and `tests/integration/test_stations.py`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use polars::prelude::*;
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

use crate::config::Config;
use crate::error::{MeteoError, Result};
use crate::granularity::Granularity;
use crate::inventory::{DateRange, Inventory};
use crate::network::NetworkClient;
use crate::parameter::Parameter;
use crate::point::Point;
use crate::station::Station;

/// Earth radius used by the `nearby()` haversine query, in meters — matches
/// the constant baked into the upstream SQL (`6371000`).
const EARTH_RADIUS_M: f64 = 6_371_000.0;

pub struct Stations {
    config: Arc<Config>,
}

impl Stations {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Register `acos`/`cos`/`sin`/`radians`/`degrees` as SQLite scalar
    /// functions so `nearby()`'s haversine query runs without relying on
    /// SQLite's optional `ENABLE_MATH_FUNCTIONS` build flag.
    ///
    /// `acos`'s argument is clamped to `[-1, 1]` — floating-point rounding
    /// in the `cos * cos * cos + sin * sin` expression can push the
    /// argument a few ulps outside that domain for a station exactly at
    /// the query point or at its antipode, which otherwise raises a
    /// domain error instead of returning ~0 or ~20000km.
    fn register_math_functions(conn: &Connection) -> rusqlite::Result<()> {
        conn.create_scalar_function("acos", 1, FunctionFlags::SQLITE_DETERMINISTIC, |ctx| {
            let x: f64 = ctx.get(0)?;
            Ok(x.clamp(-1.0, 1.0).acos())
        })?;
        conn.create_scalar_function("cos", 1, FunctionFlags::SQLITE_DETERMINISTIC, |ctx| {
            let x: f64 = ctx.get(0)?;
            Ok(x.cos())
        })?;
        conn.create_scalar_function("sin", 1, FunctionFlags::SQLITE_DETERMINISTIC, |ctx| {
            let x: f64 = ctx.get(0)?;
            Ok(x.sin())
        })?;
        conn.create_scalar_function("radians", 1, FunctionFlags::SQLITE_DETERMINISTIC, |ctx| {
            let x: f64 = ctx.get(0)?;
            Ok(x.to_radians())
        })?;
        conn.create_scalar_function("degrees", 1, FunctionFlags::SQLITE_DETERMINISTIC, |ctx| {
            let x: f64 = ctx.get(0)?;
            Ok(x.to_degrees())
        })?;
        Ok(())
    }

    fn open(&self) -> Result<Connection> {
        let conn = Connection::open(&self.config.stations_db_file)?;
        Self::register_math_functions(&conn)?;
        Ok(conn)
    }

    /// Download the station catalog if it is missing or older than
    /// `stations_db_ttl`, trying each configured endpoint in order. Mirrors
    /// the atomic-write discipline the fetch cache uses for bulk archives.
    pub async fn ensure_database(&self, client: &NetworkClient) -> Result<PathBuf> {
        let path = &self.config.stations_db_file;
        let is_fresh = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| modified.elapsed().ok())
            .map(|age| age <= self.config.stations_db_ttl)
            .unwrap_or(false);

        if is_fresh {
            return Ok(path.clone());
        }

        for endpoint in &self.config.stations_db_endpoints {
            match client.get_bytes(endpoint).await {
                Ok(Some((status, bytes))) if status.is_success() => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    let tmp = path.with_extension("db.tmp");
                    std::fs::write(&tmp, &bytes)?;
                    std::fs::rename(&tmp, path)?;
                    return Ok(path.clone());
                }
                Ok(_) => {
                    tracing::warn!(endpoint, "station catalog download returned no usable body, trying next endpoint");
                }
                Err(err) => {
                    tracing::warn!(endpoint, error = %err, "station catalog download failed, trying next endpoint");
                }
            }
        }

        if path.exists() {
            Ok(path.clone())
        } else {
            Err(MeteoError::Sql(rusqlite::Error::InvalidPath(path.clone())))
        }
    }

    /// A single station's metadata, or `None` if `id` isn't in the catalog.
    /// An unknown id (typo, nonexistent station) is not an error.
    pub fn meta(&self, id: &str) -> Result<Option<Station>> {
        if id.is_empty() {
            return Ok(None);
        }
        let conn = self.open()?;
        let station = conn
            .query_row(
                "SELECT id, name, country, region, latitude, longitude, elevation, timezone FROM stations WHERE id = ?1",
                [id],
                |row| {
                    Ok(Station {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        country: row.get(2)?,
                        region: row.get(3)?,
                        latitude: row.get(4)?,
                        longitude: row.get(5)?,
                        elevation: row.get(6)?,
                        timezone: row.get(7)?,
                        identifiers: Default::default(),
                    })
                },
            )
            .optional()?;

        let Some(mut station) = station else {
            return Ok(None);
        };

        let mut stmt = conn.prepare("SELECT key, value FROM station_identifiers WHERE station_id = ?1")?;
        let rows = stmt.query_map([id], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
        for row in rows {
            let (key, value) = row?;
            station.identifiers.insert(key, value);
        }

        Ok(Some(station))
    }

    /// Stations ordered by ascending distance (meters) from `point`.
    pub fn nearby(&self, point: Point, limit: usize) -> Result<Vec<(Station, f64)>> {
        let conn = self.open()?;
        let sql = format!(
            "SELECT id, name, country, region, latitude, longitude, elevation, timezone,
                    {radius} * acos(
                        cos(radians(:lat)) * cos(radians(latitude)) *
                        cos(radians(longitude) - radians(:lon)) +
                        sin(radians(:lat)) * sin(radians(latitude))
                    ) AS distance
             FROM stations
             ORDER BY distance ASC
             LIMIT :limit",
            radius = EARTH_RADIUS_M as i64
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            rusqlite::named_params! { ":lat": point.latitude, ":lon": point.longitude, ":limit": limit as i64 },
            |row| {
                Ok((
                    Station {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        country: row.get(2)?,
                        region: row.get(3)?,
                        latitude: row.get(4)?,
                        longitude: row.get(5)?,
                        elevation: row.get(6)?,
                        timezone: row.get(7)?,
                        identifiers: Default::default(),
                    },
                    row.get::<_, f64>(8)?,
                ))
            },
        )?;

        let mut out = Vec::with_capacity(limit);
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Per-parameter availability window for one station.
    pub fn inventory(&self, id: &str) -> Result<Inventory> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(
            "SELECT parameter, granularity, start, end FROM inventory WHERE station_id = ?1",
        )?;
        let rows = stmt.query_map([id], |row| {
            let parameter: String = row.get(0)?;
            let granularity: String = row.get(1)?;
            let start: Option<String> = row.get(2)?;
            let end: Option<String> = row.get(3)?;
            Ok((parameter, granularity, start, end))
        })?;

        let mut inventory = Inventory::new();
        for row in rows {
            let (parameter, granularity, start, end) = row?;
            let Some(parameter) = parse_parameter(&parameter) else { continue };
            let Some(granularity) = parse_granularity(&granularity) else { continue };
            inventory.insert(
                parameter,
                granularity,
                DateRange {
                    start: start.as_deref().and_then(parse_date),
                    end: end.as_deref().and_then(parse_date),
                },
            );
        }
        Ok(inventory)
    }

    /// Escape hatch for arbitrary read queries against the catalog
    /// (`stations.query("SELECT id FROM stations WHERE country = 'US'")`).
    pub fn query(&self, sql: &str) -> Result<DataFrame> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(sql)?;
        let column_count = stmt.column_count();
        let column_names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();

        let mut columns: Vec<Vec<AnyValueAsString>> = vec![Vec::new(); column_count];
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            for i in 0..column_count {
                let value: rusqlite::types::Value = row.get(i)?;
                columns[i].push(AnyValueAsString(value));
            }
        }

        let series: Vec<Series> = column_names
            .iter()
            .zip(columns)
            .map(|(name, values)| Series::new(name, values.into_iter().map(|v| v.as_string()).collect::<Vec<_>>()))
            .collect();

        DataFrame::new(series).map_err(MeteoError::Polars)
    }
}

struct AnyValueAsString(rusqlite::types::Value);

impl AnyValueAsString {
    fn as_string(self) -> Option<String> {
        use rusqlite::types::Value;
        match self.0 {
            Value::Null => None,
            Value::Integer(i) => Some(i.to_string()),
            Value::Real(f) => Some(f.to_string()),
            Value::Text(s) => Some(s),
            Value::Blob(_) => None,
        }
    }
}

fn parse_parameter(id: &str) -> Option<Parameter> {
    use Parameter::*;
    Some(match id {
        "temp" => Temp,
        "tmin" => Tmin,
        "tmax" => Tmax,
        "dwpt" => Dwpt,
        "rhum" => Rhum,
        "prcp" => Prcp,
        "snwd" => Snwd,
        "wdir" => Wdir,
        "wspd" => Wspd,
        "wpgt" => Wpgt,
        "pres" => Pres,
        "tsun" => Tsun,
        "cldc" => Cldc,
        "coco" => Coco,
        _ => return None,
    })
}

fn parse_granularity(id: &str) -> Option<Granularity> {
    Some(match id {
        "hourly" => Granularity::Hourly,
        "daily" => Granularity::Daily,
        "monthly" => Granularity::Monthly,
        "normals" => Granularity::Normals,
        _ => return None,
    })
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

use rusqlite::OptionalExtension;

#[cfg(test)]
mod tests {
    use super::*;

    fn in_memory_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        Stations::register_math_functions(&conn).unwrap();
        conn
    }

    #[test]
    fn acos_is_clamped_for_identical_points() {
        let conn = in_memory_conn();
        conn.execute("CREATE TABLE stations (id TEXT, latitude REAL, longitude REAL)", []).unwrap();
        conn.execute("INSERT INTO stations VALUES ('POLE1', 90.0, 0.0)", []).unwrap();

        let distance: f64 = conn
            .query_row(
                "SELECT 6371000 * acos(cos(radians(90.0)) * cos(radians(latitude)) *
                        cos(radians(longitude) - radians(0.0)) + sin(radians(90.0)) * sin(radians(latitude)))
                 FROM stations",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(distance < 1.0);
    }

    #[test]
    fn acos_is_clamped_for_antipodal_points() {
        let conn = in_memory_conn();
        conn.execute("CREATE TABLE stations (id TEXT, latitude REAL, longitude REAL)", []).unwrap();
        conn.execute("INSERT INTO stations VALUES ('T1', 45.0, 0.0)", []).unwrap();

        let distance: f64 = conn
            .query_row(
                "SELECT 6371000 * acos(cos(radians(-45.0)) * cos(radians(latitude)) *
                        cos(radians(longitude) - radians(180.0)) + sin(radians(-45.0)) * sin(radians(latitude)))
                 FROM stations",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(distance > 19_000_000.0);
    }

    #[test]
    fn haversine_query_matches_expected_distance() {
        let conn = in_memory_conn();
        conn.execute("CREATE TABLE stations (id TEXT, latitude REAL, longitude REAL)", []).unwrap();
        conn.execute("INSERT INTO stations VALUES ('TEST1', 50.1155, 8.6842)", []).unwrap();

        let distance: f64 = conn
            .query_row(
                "SELECT 6371000 * acos(cos(radians(50.05)) * cos(radians(latitude)) *
                        cos(radians(longitude) - radians(8.6)) + sin(radians(50.05)) * sin(radians(latitude)))
                 FROM stations",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(distance > 9000.0 && distance < 11000.0);
    }

    #[test]
    fn parse_parameter_rejects_unknown_id() {
        assert!(parse_parameter("bogus").is_none());
    }

    #[test]
    fn parse_granularity_rejects_unknown_id() {
        assert!(parse_granularity("bogus").is_none());
    }
}
