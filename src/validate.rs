//! Request size/range gate, grounded in
//! `original_source/meteostat/api/daily.py::_validate_request` and exercised
//! by `tests/unit/test_validators.py`.
//!
//! All checks here are bypassable via `Config::block_large_requests = false`
//! — they exist to stop accidental multi-decade/all-station requests, not to
//! enforce a hard protocol limit.

use chrono::{Datelike, NaiveDate, Utc};

use crate::config::Config;
use crate::error::{MeteoError, Result};
use crate::granularity::Granularity;
use crate::request::Request;

const MAX_STATIONS: usize = 10;
const MAX_HOURLY_SPAN_YEARS: i32 = 3;
const MAX_DAILY_SPAN_YEARS: i32 = 30;

/// Validate and normalize a request in place: an absent `end` is filled in
/// with today's date (hourly/daily only — monthly/normals tolerate an open
/// end). Returns the request's effective `[start, end]` window.
pub fn validate(request: &mut Request, config: &Config) -> Result<(NaiveDate, Option<NaiveDate>)> {
    if config.block_large_requests && request.station_ids.len() > MAX_STATIONS {
        return Err(MeteoError::RequestTooLarge {
            message: format!(
                "request spans {} stations, maximum is {MAX_STATIONS}",
                request.station_ids.len()
            ),
        });
    }

    match request.granularity {
        Granularity::Hourly | Granularity::Daily => {
            let start = request.start.ok_or_else(|| MeteoError::RequestTooLarge {
                message: format!("{} requests require a start date", request.granularity),
            })?;
            if request.end.is_none() {
                request.end = Some(Utc::now().date_naive());
            }
            let end = request.end.unwrap();

            if config.block_large_requests {
                let max_span_years = match request.granularity {
                    Granularity::Hourly => MAX_HOURLY_SPAN_YEARS,
                    Granularity::Daily => MAX_DAILY_SPAN_YEARS,
                    _ => unreachable!(),
                };
                // Calendar year difference, not a day count: a request from
                // 1990-01-01 to 2020-12-31 is a 30-year span even though it
                // covers more than 30*365 days once leap days are counted.
                if end.year() - start.year() > max_span_years {
                    return Err(MeteoError::RequestTooLarge {
                        message: format!(
                            "{} request spans more than {} years",
                            request.granularity, max_span_years
                        ),
                    });
                }
            }

            Ok((start, Some(end)))
        }
        Granularity::Monthly | Granularity::Normals => {
            let start = request
                .start
                .unwrap_or_else(|| NaiveDate::from_ymd_opt(1, 1, 1).unwrap());
            Ok((start, request.end))
        }
    }
}
