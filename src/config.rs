//! Process-wide configuration.
//!
//! The upstream Python implementation walks its config class's type
//! annotations at runtime to decide how to parse each `MS_*` override
//! (`meteostat/api/config.py::ConfigService._parse_env_value`). A systems
//! language has no such runtime reflection, so per spec's design notes we
//! replace it with an explicit schema: a table of `(key, setter)` entries,
//! each responsible for parsing and validating its own environment
//! variable. Unknown keys are logged and dropped; parse/validate failures
//! keep the default and log — they never abort `Config::load`.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::parameter::Parameter;

const ENV_PREFIX: &str = "MS_";

#[derive(Debug, Clone)]
pub struct Config {
    pub block_large_requests: bool,

    pub cache_enable: bool,
    pub cache_directory: PathBuf,
    pub cache_ttl: Duration,
    pub cache_autoclean: bool,

    pub stations_db_ttl: Duration,
    pub stations_db_endpoints: Vec<String>,
    pub stations_db_file: PathBuf,

    pub lapse_rate_parameters: Vec<Parameter>,

    pub meteostat_hourly_endpoint: String,
    pub meteostat_daily_endpoint: String,
    pub meteostat_monthly_endpoint: String,

    pub dwd_ftp_host: String,

    pub aviationweather_endpoint: String,
    pub aviationweather_user_agent: Option<String>,

    pub metno_forecast_endpoint: String,
    pub metno_user_agent: Option<String>,

    pub gsa_api_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs_home();
        Self {
            block_large_requests: true,

            cache_enable: true,
            cache_directory: home.join(".meteostat").join("cache"),
            cache_ttl: Duration::from_secs(30 * 24 * 3600),
            cache_autoclean: true,

            stations_db_ttl: Duration::from_secs(7 * 24 * 3600),
            stations_db_endpoints: vec![
                "https://data.meteostat.net/stations.db".to_string(),
                "https://raw.githubusercontent.com/meteostat/weather-stations/master/stations.db"
                    .to_string(),
            ],
            stations_db_file: home.join(".meteostat").join("stations.db"),

            lapse_rate_parameters: vec![Parameter::Temp, Parameter::Tmin, Parameter::Tmax],

            meteostat_hourly_endpoint: "https://data.meteostat.net/hourly/{year}/{station}.csv.gz"
                .to_string(),
            meteostat_daily_endpoint: "https://data.meteostat.net/daily/{year}/{station}.csv.gz"
                .to_string(),
            meteostat_monthly_endpoint: "https://data.meteostat.net/monthly/{station}.csv.gz"
                .to_string(),

            dwd_ftp_host: "opendata.dwd.de".to_string(),

            aviationweather_endpoint: "https://aviationweather.gov/api/data/metar?ids={station}&format=raw&taf=false&hours=24".to_string(),
            aviationweather_user_agent: None,

            metno_forecast_endpoint: "https://api.met.no/weatherapi/locationforecast/2.0/compact?lat={latitude}&lon={longitude}&altitude={elevation}".to_string(),
            metno_user_agent: None,

            gsa_api_base_url: "https://dataset.api.hub.geosphere.at/v1".to_string(),
        }
    }
}

fn dirs_home() -> PathBuf {
    env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

type Setter = fn(&mut Config, &str) -> std::result::Result<(), String>;

struct SchemaEntry {
    key: &'static str,
    set: Setter,
}

fn parse_bool(raw: &str) -> std::result::Result<bool, String> {
    serde_json::from_str::<bool>(raw).map_err(|e| e.to_string())
}

fn parse_u64_seconds(raw: &str) -> std::result::Result<u64, String> {
    serde_json::from_str::<u64>(raw).map_err(|e| e.to_string())
}

fn parse_string_list(raw: &str) -> std::result::Result<Vec<String>, String> {
    serde_json::from_str::<Vec<String>>(raw).map_err(|e| e.to_string())
}

const SCHEMA: &[SchemaEntry] = &[
    SchemaEntry {
        key: "BLOCK_LARGE_REQUESTS",
        set: |c, v| {
            c.block_large_requests = parse_bool(v)?;
            Ok(())
        },
    },
    SchemaEntry {
        key: "CACHE_ENABLE",
        set: |c, v| {
            c.cache_enable = parse_bool(v)?;
            Ok(())
        },
    },
    SchemaEntry {
        key: "CACHE_DIRECTORY",
        set: |c, v| {
            c.cache_directory = PathBuf::from(v);
            Ok(())
        },
    },
    SchemaEntry {
        key: "CACHE_TTL",
        set: |c, v| {
            c.cache_ttl = Duration::from_secs(parse_u64_seconds(v)?);
            Ok(())
        },
    },
    SchemaEntry {
        key: "CACHE_AUTOCLEAN",
        set: |c, v| {
            c.cache_autoclean = parse_bool(v)?;
            Ok(())
        },
    },
    SchemaEntry {
        key: "STATIONS_DB_TTL",
        set: |c, v| {
            c.stations_db_ttl = Duration::from_secs(parse_u64_seconds(v)?);
            Ok(())
        },
    },
    SchemaEntry {
        key: "STATIONS_DB_ENDPOINTS",
        set: |c, v| {
            c.stations_db_endpoints = parse_string_list(v)?;
            Ok(())
        },
    },
    SchemaEntry {
        key: "STATIONS_DB_FILE",
        set: |c, v| {
            c.stations_db_file = PathBuf::from(v);
            Ok(())
        },
    },
    SchemaEntry {
        key: "DWD_FTP_HOST",
        set: |c, v| {
            c.dwd_ftp_host = v.to_string();
            Ok(())
        },
    },
    SchemaEntry {
        key: "AVIATIONWEATHER_ENDPOINT",
        set: |c, v| {
            c.aviationweather_endpoint = v.to_string();
            Ok(())
        },
    },
    SchemaEntry {
        key: "AVIATIONWEATHER_USER_AGENT",
        set: |c, v| {
            c.aviationweather_user_agent = Some(v.to_string());
            Ok(())
        },
    },
    SchemaEntry {
        key: "METNO_FORECAST_ENDPOINT",
        set: |c, v| {
            c.metno_forecast_endpoint = v.to_string();
            Ok(())
        },
    },
    SchemaEntry {
        key: "METNO_USER_AGENT",
        set: |c, v| {
            c.metno_user_agent = Some(v.to_string());
            Ok(())
        },
    },
    SchemaEntry {
        key: "GSA_API_BASE_URL",
        set: |c, v| {
            c.gsa_api_base_url = v.to_string();
            Ok(())
        },
    },
];

impl Config {
    /// Build the default configuration, then apply `MS_*` environment
    /// overrides. Invalid overrides are logged and ignored; the default
    /// stays in effect for that key.
    pub fn load() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        for entry in SCHEMA {
            let var_name = format!("{ENV_PREFIX}{}", entry.key);
            let Ok(raw) = env::var(&var_name) else {
                continue;
            };
            if let Err(err) = (entry.set)(self, &raw) {
                tracing::warn!(
                    key = var_name,
                    error = err,
                    "ignoring invalid environment override, keeping default"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let c = Config::default();
        assert!(c.block_large_requests);
        assert!(c.cache_enable);
        assert_eq!(c.cache_ttl, Duration::from_secs(30 * 24 * 3600));
    }

    #[test]
    fn invalid_bool_override_keeps_default() {
        std::env::set_var("MS_CACHE_ENABLE", "not-a-bool");
        let c = Config::load();
        assert!(c.cache_enable);
        std::env::remove_var("MS_CACHE_ENABLE");
    }

    #[test]
    fn valid_override_applies() {
        std::env::set_var("MS_CACHE_ENABLE", "false");
        let c = Config::load();
        assert!(!c.cache_enable);
        std::env::remove_var("MS_CACHE_ENABLE");
    }

    #[test]
    fn unknown_env_key_is_ignored_not_fatal() {
        std::env::set_var("MS_SOME_UNKNOWN_KEY", "whatever");
        let c = Config::load();
        assert!(c.block_large_requests);
        std::env::remove_var("MS_SOME_UNKNOWN_KEY");
    }
}
