//! Post-dispatch façade, grounded in
//! `original_source/meteostat/typing.py::TimeSeries` and exercised by
//! `tests/unit/test_timeseries.py`.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use polars::prelude::*;

use crate::error::Result;
use crate::frame::{Frame, STATION_COL, TIME_COL};
use crate::granularity::Granularity;
use crate::merge::squash as squash_frame;
use crate::parameter::Parameter;
use crate::station::Station;
use crate::units::{convert, UnitSystem};

#[derive(Debug, Clone)]
pub struct TimeSeries {
    frame: Frame,
    stations: Vec<Station>,
    granularity: Granularity,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

/// Options for [`TimeSeries::fetch`]. All fields optional; defaults match
/// the upstream Python API's keyword defaults.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub sources: bool,
    pub fill: bool,
    pub squash: bool,
    pub units: Option<UnitSystem>,
}

impl TimeSeries {
    pub fn new(
        frame: Frame,
        stations: Vec<Station>,
        granularity: Granularity,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Self {
        Self {
            frame,
            stations,
            granularity,
            start,
            end,
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn into_frame(self) -> Frame {
        self.frame
    }

    pub fn empty(&self) -> bool {
        self.frame.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.empty()
    }

    pub fn parameters(&self) -> Vec<Parameter> {
        self.frame.parameters()
    }

    /// Non-`NaN` count, overall or for one column.
    pub fn count(&self, parameter: Option<Parameter>) -> usize {
        match parameter {
            Some(p) => self.frame.count_non_null(p),
            None => self.frame.parameters().iter().map(|p| self.frame.count_non_null(*p)).sum(),
        }
    }

    fn expected_rows(&self) -> Option<i64> {
        let (start, end) = (self.start?, self.end?);
        let span_days = (end - start).num_days() + 1;
        Some(match self.granularity {
            Granularity::Hourly => span_days * 24,
            Granularity::Daily => span_days,
            Granularity::Monthly | Granularity::Normals => {
                let months = (end.year() - start.year()) as i64 * 12 + (end.month() as i64 - start.month() as i64) + 1;
                months.max(1)
            }
        })
    }

    /// Non-`NaN` count divided by `expected_rows × stations × columns`.
    /// `None` when either bound is unset; `0.0` when bounds are set but the
    /// frame is empty.
    pub fn completeness(&self, parameter: Option<Parameter>) -> Option<f64> {
        let expected_rows = self.expected_rows()?;
        let station_count = self.stations.len().max(1) as f64;

        let parameters: Vec<Parameter> = match parameter {
            Some(p) => vec![p],
            None => self.frame.parameters(),
        };
        if parameters.is_empty() || expected_rows == 0 {
            return Some(0.0);
        }

        let denominator = expected_rows as f64 * station_count * parameters.len() as f64;
        if denominator == 0.0 {
            return Some(0.0);
        }
        if self.frame.is_empty() {
            return Some(0.0);
        }

        let non_null: usize = parameters.iter().map(|p| self.frame.count_non_null(*p)).sum();
        Some(non_null as f64 / denominator)
    }

    /// Apply each populated parameter's validator to its column, returning
    /// `true` only if every value is within range (NaN counts as invalid).
    pub fn validate(&self) -> bool {
        let df = self.frame.as_dataframe();
        for parameter in self.frame.parameters() {
            let Ok(col) = df.column(parameter.id()) else {
                continue;
            };
            let Ok(floats) = col.cast(&DataType::Float64) else {
                continue;
            };
            let Ok(ca) = floats.f64() else { continue };
            for value in ca.into_iter().flatten() {
                if !parameter.validate(value) {
                    return false;
                }
            }
        }
        true
    }

    /// The only materialization operation. `fill` inserts rows missing
    /// from the canonical time grid; `squash` collapses multi-source rows;
    /// `units` converts every populated column; `sources` keeps the
    /// `<param>_source` attribution columns in the output.
    pub fn fetch(&self, options: FetchOptions) -> Result<DataFrame> {
        let working = if options.squash {
            squash_frame(&self.frame)?
        } else {
            self.frame.clone()
        };

        let working = if options.fill {
            self.fill_grid(working)?
        } else {
            working
        };

        let mut df = working.into_dataframe();

        if let Some(system) = options.units {
            for parameter in working_parameters(&df) {
                if let Ok(col) = df.column(parameter.id()) {
                    if let Ok(floats) = col.f64() {
                        let converted: Vec<Option<f64>> = floats.into_iter().map(|v| v.map(|x| convert(parameter, x, system))).collect();
                        df.with_column(Series::new(parameter.id(), converted))?;
                    }
                }
            }
        }

        if !options.sources {
            let drop: Vec<String> = df
                .get_column_names()
                .iter()
                .filter(|n| n.ends_with("_source"))
                .map(|n| n.to_string())
                .collect();
            for name in drop {
                df = df.drop(&name)?;
            }
        }

        Ok(df)
    }

    fn fill_grid(&self, frame: Frame) -> Result<Frame> {
        let (Some(start), Some(end)) = (self.start, self.end) else {
            return Ok(frame);
        };
        if self.stations.is_empty() {
            return Ok(frame);
        }

        let step = match self.granularity {
            Granularity::Hourly => Duration::hours(1),
            Granularity::Daily => Duration::days(1),
            Granularity::Monthly | Granularity::Normals => Duration::days(30),
        };

        let mut grid_station = Vec::new();
        let mut grid_time: Vec<NaiveDateTime> = Vec::new();
        for station in &self.stations {
            let mut cursor = start.and_hms_opt(0, 0, 0).unwrap();
            let end_dt = end.and_hms_opt(23, 59, 59).unwrap();
            while cursor <= end_dt {
                grid_station.push(station.id.clone());
                grid_time.push(cursor);
                cursor += step;
            }
        }

        let grid_df = DataFrame::new(vec![
            Series::new(STATION_COL, grid_station),
            Series::new(
                TIME_COL,
                grid_time.iter().map(|t| t.and_utc().timestamp_millis()).collect::<Vec<_>>(),
            )
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?,
        ])?;

        let joined = grid_df.left_join(frame.as_dataframe(), [STATION_COL, TIME_COL], [STATION_COL, TIME_COL])?;
        Frame::from_dataframe(joined).map_err(Into::into)
    }
}

fn working_parameters(df: &DataFrame) -> Vec<Parameter> {
    let names = df.get_column_names();
    [
        Parameter::Temp,
        Parameter::Tmin,
        Parameter::Tmax,
        Parameter::Dwpt,
        Parameter::Rhum,
        Parameter::Prcp,
        Parameter::Snwd,
        Parameter::Wspd,
        Parameter::Wpgt,
        Parameter::Pres,
        Parameter::Tsun,
        Parameter::Cldc,
    ]
    .into_iter()
    .filter(|p| names.contains(&p.id()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_series() -> TimeSeries {
        TimeSeries::new(Frame::empty(), vec![], Granularity::Daily, None, None)
    }

    #[test]
    fn completeness_is_none_when_bounds_unset() {
        assert_eq!(empty_series().completeness(None), None);
    }

    #[test]
    fn completeness_is_zero_when_frame_empty_but_bounds_set() {
        let ts = TimeSeries::new(
            Frame::empty(),
            vec![],
            Granularity::Daily,
            Some(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()),
            Some(NaiveDate::from_ymd_opt(2020, 1, 31).unwrap()),
        );
        assert_eq!(ts.completeness(None), Some(0.0));
    }

    #[test]
    fn empty_and_len_reflect_frame_height() {
        let ts = empty_series();
        assert!(ts.empty());
        assert_eq!(ts.len(), 0);
    }
}
