//! Caller-facing and provider-facing request shapes.

use chrono::NaiveDate;

use crate::granularity::Granularity;
use crate::parameter::Parameter;

/// What a caller asks of `hourly`/`daily`/`monthly`/`normals`.
#[derive(Debug, Clone)]
pub struct Request {
    pub station_ids: Vec<String>,
    pub granularity: Granularity,
    pub parameters: Vec<Parameter>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl Request {
    pub fn new(station_ids: Vec<String>, granularity: Granularity) -> Self {
        let parameters = match granularity {
            Granularity::Hourly => Parameter::HOURLY_DEFAULTS.to_vec(),
            Granularity::Daily => Parameter::DAILY_DEFAULTS.to_vec(),
            Granularity::Monthly | Granularity::Normals => Parameter::MONTHLY_DEFAULTS.to_vec(),
        };
        Self {
            station_ids,
            granularity,
            parameters,
            start: None,
            end: None,
        }
    }

    pub fn with_parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_start(mut self, start: NaiveDate) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_end(mut self, end: NaiveDate) -> Self {
        self.end = Some(end);
        self
    }
}

/// The slice of a [`Request`] handed to a single provider for a single
/// station, after dispatch has already decided the provider is a candidate.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub station_id: String,
    pub granularity: Granularity,
    pub parameters: Vec<Parameter>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}
