//! Meteorological data retrieval, merge, and spatial interpolation engine.
//!
//! The public surface mirrors the upstream Python package's module shape
//! (`meteostat.hourly`, `meteostat.daily`, `meteostat.stations`, ...) rather
//! than collapsing everything behind a single client object, keeping the
//! same flat top-level-function style.

pub mod cache;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod frame;
pub mod geo;
pub mod granularity;
pub mod interpolate;
pub mod inventory;
pub mod logging;
pub mod merge;
pub mod network;
pub mod normals;
pub mod parameter;
pub mod parsers;
pub mod point;
pub mod provider;
pub mod request;
pub mod station;
pub mod stations;
pub mod timeseries;
pub mod units;
pub mod validate;
pub mod validator;

use std::sync::Arc;

use chrono::NaiveDate;

pub use config::Config;
pub use error::{MeteoError, Result};
pub use granularity::Granularity;
pub use interpolate::{interpolate as interpolate_point, InterpolationOptions};
pub use merge::merge;
pub use parameter::Parameter;
pub use point::Point;
pub use station::Station;
pub use timeseries::{FetchOptions, TimeSeries};

use dispatch::{dispatch, DispatchContext};
use request::Request;
use stations::Stations;

/// Shared handle bundling config, HTTP client, fetch cache, and the station
/// catalog so a caller doesn't thread each through `hourly`/`daily`/...
/// individually.
#[derive(Clone)]
pub struct Client {
    config: Arc<Config>,
    stations: Arc<Stations>,
    dispatch_ctx: DispatchContext,
}

impl Client {
    pub fn new() -> Self {
        Self::with_config(Config::load())
    }

    pub fn with_config(config: Config) -> Self {
        let config = Arc::new(config);
        let dispatch_ctx = DispatchContext {
            client: network::NetworkClient::new(),
            cache: cache::Cache::new(config.cache_directory.clone(), config.cache_enable),
            config: config.clone(),
        };
        Self {
            stations: Arc::new(Stations::new(config.clone())),
            config,
            dispatch_ctx,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stations(&self) -> &Stations {
        &self.stations
    }

    async fn resolve_stations(&self, station_ids: &[String]) -> Vec<Station> {
        let mut resolved = Vec::with_capacity(station_ids.len());
        for id in station_ids {
            if let Ok(Some(station)) = self.stations.meta(id) {
                resolved.push(station);
            } else {
                tracing::warn!(station_id = id, "unknown station id, skipping");
            }
        }
        resolved
    }

    async fn fetch(
        &self,
        mut request: Request,
        providers: Option<&[&str]>,
    ) -> Result<TimeSeries> {
        let (start, end) = validate::validate(&mut request, &self.config)?;
        let stations = self.resolve_stations(&request.station_ids).await;
        let dispatch_end = end.unwrap_or_else(|| chrono::Utc::now().date_naive());

        let frame = dispatch(&request, &stations, start, dispatch_end, providers, &self.dispatch_ctx).await;

        Ok(TimeSeries::new(frame, stations, request.granularity, Some(start), end))
    }

    /// Hourly observations for one or more stations.
    pub async fn hourly(
        &self,
        station_ids: Vec<String>,
        start: NaiveDate,
        end: Option<NaiveDate>,
        providers: Option<&[&str]>,
    ) -> Result<TimeSeries> {
        let mut request = Request::new(station_ids, Granularity::Hourly).with_start(start);
        if let Some(end) = end {
            request = request.with_end(end);
        }
        self.fetch(request, providers).await
    }

    /// Daily observations for one or more stations.
    pub async fn daily(
        &self,
        station_ids: Vec<String>,
        start: NaiveDate,
        end: Option<NaiveDate>,
        providers: Option<&[&str]>,
    ) -> Result<TimeSeries> {
        let mut request = Request::new(station_ids, Granularity::Daily).with_start(start);
        if let Some(end) = end {
            request = request.with_end(end);
        }
        self.fetch(request, providers).await
    }

    /// Monthly observations for one or more stations. `start`/`end` are
    /// optional — an unbounded monthly request returns everything a provider
    /// has.
    pub async fn monthly(
        &self,
        station_ids: Vec<String>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        providers: Option<&[&str]>,
    ) -> Result<TimeSeries> {
        let mut request = Request::new(station_ids, Granularity::Monthly);
        if let Some(start) = start {
            request = request.with_start(start);
        }
        if let Some(end) = end {
            request = request.with_end(end);
        }
        self.fetch(request, providers).await
    }

    /// Climate normals for one or more stations: monthly observations over
    /// `[start_year, end_year]` reduced to 12 rows, one per calendar month,
    /// each parameter averaged across the years in range.
    pub async fn normals(
        &self,
        station_ids: Vec<String>,
        start_year: i32,
        end_year: i32,
        parameters: Option<Vec<Parameter>>,
        providers: Option<&[&str]>,
    ) -> Result<TimeSeries> {
        let start = NaiveDate::from_ymd_opt(start_year, 1, 1)
            .ok_or_else(|| MeteoError::InvalidRequest(format!("{start_year} is not a valid start year")))?;
        let end = NaiveDate::from_ymd_opt(end_year, 12, 31)
            .ok_or_else(|| MeteoError::InvalidRequest(format!("{end_year} is not a valid end year")))?;

        let mut request = Request::new(station_ids, Granularity::Monthly).with_start(start).with_end(end);
        if let Some(parameters) = parameters {
            request = request.with_parameters(parameters);
        }

        let monthly = self.fetch(request, providers).await?;
        normals::reduce_to_monthly_normals(monthly)
    }

    /// Interpolate a fetched series to an arbitrary point.
    pub fn interpolate(
        &self,
        series: &TimeSeries,
        point: Point,
        options: &InterpolationOptions,
    ) -> Result<TimeSeries> {
        interpolate_point(series, point, options)
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}
