//! Error taxonomy.
//!
//! Only failures that must be surfaced to the caller are represented here.
//! Everything else (cache I/O, upstream HTTP/parse failures, a missing
//! station identifier for one provider, an invalid env override) is
//! recovered locally: logged at warn/error and turned into an empty result
//! by the component that hit it.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MeteoError {
    /// Validator rejected a request (length, station count, missing start).
    #[error("{message} (set block_large_requests=false to disable)")]
    RequestTooLarge { message: String },

    /// `stations.query` used a provider id the registry doesn't know.
    #[error("unknown provider id: {0}")]
    UnknownProvider(String),

    /// `merge()` was asked to combine time series of different granularities.
    #[error("cannot merge time series of divergent granularity")]
    IncompatibleMerge,

    /// `merge()` was called with an empty list.
    #[error("cannot merge empty list of time series")]
    EmptyMerge,

    /// A caller-supplied argument was structurally invalid (e.g. a year
    /// that doesn't correspond to a real calendar date).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A config key was read that isn't part of the schema.
    #[error("unknown configuration key: {0}")]
    UnknownConfigKey(String),

    #[error("sql error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ftp error: {0}")]
    Ftp(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("tabular engine error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MeteoError>;
