//! Tabular data carrier, grounded in
//! `original_source/meteostat/typing.py` and exercised by
//! `tests/unit/test_data.py`.
//!
//! Python's reference implementation indexes rows by a `(station, time[,
//! source])` `MultiIndex`; polars has no native equivalent, so `station`,
//! `time`, and (before squashing) `source` are carried as ordinary leading
//! columns instead. `source` names the provider that contributed the whole
//! row, making `(station, time, source)` unique pre-squash the same way it
//! would be as an index level. Every data column `<param>` that was
//! populated by more than one candidate provider is additionally paired
//! with a `<param>_source` `Utf8` column holding the per-cell contributing
//! provider id, which the squash engine reads to decide precedence and
//! which callers can inspect after `fetch()`.

use std::collections::HashMap;

use polars::prelude::*;

use crate::parameter::Parameter;

pub const STATION_COL: &str = "station";
pub const TIME_COL: &str = "time";
pub const SOURCE_COL: &str = "source";
pub const SOURCE_SUFFIX: &str = "_source";

pub fn source_column(parameter: Parameter) -> String {
    format!("{}{}", parameter.id(), SOURCE_SUFFIX)
}

/// A `(station, time[, source])`-keyed table of parameter columns, each
/// optionally paired with a `<param>_source` attribution column.
#[derive(Debug, Clone)]
pub struct Frame {
    df: DataFrame,
}

impl Frame {
    pub fn from_dataframe(df: DataFrame) -> PolarsResult<Self> {
        for required in [STATION_COL, TIME_COL] {
            if df.column(required).is_err() {
                polars_bail!(SchemaMismatch: "frame is missing required column `{}`", required);
            }
        }
        Ok(Self { df })
    }

    pub fn empty() -> Self {
        let df = DataFrame::new(vec![
            Series::new(STATION_COL, Vec::<String>::new()),
            Series::new(TIME_COL, Vec::<i64>::new())
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
                .unwrap(),
        ])
        .unwrap();
        Self { df }
    }

    pub fn as_dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn into_dataframe(self) -> DataFrame {
        self.df
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn parameters(&self) -> Vec<Parameter> {
        let names = self.df.get_column_names();
        [
            Parameter::Temp,
            Parameter::Tmin,
            Parameter::Tmax,
            Parameter::Dwpt,
            Parameter::Rhum,
            Parameter::Prcp,
            Parameter::Snwd,
            Parameter::Wdir,
            Parameter::Wspd,
            Parameter::Wpgt,
            Parameter::Pres,
            Parameter::Tsun,
            Parameter::Cldc,
            Parameter::Coco,
        ]
        .into_iter()
        .filter(|p| names.contains(&p.id()))
        .collect()
    }

    pub fn has_parameter(&self, parameter: Parameter) -> bool {
        self.df.column(parameter.id()).is_ok()
    }

    /// Tag every already-populated parameter column with a constant source
    /// id, adding the `<param>_source` column if it doesn't yet exist, and
    /// stamp the row-level `source` column with the same id. Used right
    /// after a single-provider fetch, before concatenation with other
    /// providers' frames.
    pub fn stamp_source(mut self, provider_id: &str) -> PolarsResult<Self> {
        let height = self.df.height();
        let param_cols: Vec<Parameter> = self.parameters();
        for parameter in param_cols {
            let col = source_column(parameter);
            if self.df.column(&col).is_err() {
                let values = self
                    .df
                    .column(parameter.id())?
                    .is_not_null()
                    .into_iter()
                    .map(|present| present.unwrap_or(false).then(|| provider_id.to_string()))
                    .collect::<Vec<_>>();
                let series = Series::new(&col, values);
                self.df.with_column(series)?;
            }
            debug_assert_eq!(self.df.height(), height);
        }

        let source_series = Series::new(SOURCE_COL, vec![provider_id.to_string(); height]);
        self.df.with_column(source_series)?;
        Ok(self)
    }

    /// Vertically stack frames from independent providers: a union of the
    /// same granularity, with no collapsing. Missing columns in any one
    /// frame are filled with nulls so the
    /// concatenation has a uniform schema.
    pub fn concat(frames: Vec<Frame>) -> PolarsResult<Frame> {
        let mut frames: Vec<Frame> = frames.into_iter().filter(|f| !f.is_empty()).collect();
        if frames.is_empty() {
            return Ok(Frame::empty());
        }
        if frames.len() == 1 {
            return Ok(frames.remove(0));
        }

        let mut all_columns: Vec<String> = Vec::new();
        let mut dtypes: HashMap<String, DataType> = HashMap::new();
        for frame in &frames {
            for name in frame.df.get_column_names() {
                if !all_columns.iter().any(|c| c == name) {
                    all_columns.push(name.to_string());
                    dtypes.insert(name.to_string(), frame.df.column(name)?.dtype().clone());
                }
            }
        }

        let mut lazy_frames = Vec::with_capacity(frames.len());
        for frame in frames {
            let mut df = frame.df;
            for col in &all_columns {
                if df.column(col).is_err() {
                    let dtype = dtypes.get(col).unwrap_or(&DataType::Float64);
                    let null_series = Series::full_null(col, df.height(), dtype);
                    df.with_column(null_series)?;
                }
            }
            let df = df.select(&all_columns)?;
            lazy_frames.push(df.lazy());
        }

        let combined = concat(lazy_frames, UnionArgs::default())?.collect()?;
        Frame::from_dataframe(combined)
    }

    /// Sort rows by `(station, time)` ascending — the deterministic output
    /// order every public operation presents. This is a pre-sort, not a
    /// reflection of completion order.
    pub fn sort_by_station_time(mut self) -> PolarsResult<Self> {
        self.df = self
            .df
            .sort([STATION_COL, TIME_COL], SortMultipleOptions::default())?;
        Ok(self)
    }

    pub fn select_parameters(&self, parameters: &[Parameter]) -> PolarsResult<Frame> {
        let mut cols = vec![STATION_COL.to_string(), TIME_COL.to_string()];
        for p in parameters {
            if self.df.column(p.id()).is_ok() {
                cols.push(p.id().to_string());
            }
            let src = source_column(*p);
            if self.df.column(&src).is_ok() {
                cols.push(src);
            }
        }
        Frame::from_dataframe(self.df.select(&cols)?)
    }

    pub fn count_non_null(&self, parameter: Parameter) -> usize {
        match self.df.column(parameter.id()) {
            Ok(s) => (s.len() - s.null_count()),
            Err(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample(station: &str, temp: Vec<Option<f64>>) -> Frame {
        let n = temp.len();
        let times: Vec<i64> = (0..n as i64)
            .map(|i| NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp_millis() + i * 3_600_000)
            .collect();
        let df = DataFrame::new(vec![
            Series::new(STATION_COL, vec![station; n]),
            Series::new(TIME_COL, times)
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
                .unwrap(),
            Series::new("temp", temp),
        ])
        .unwrap();
        Frame::from_dataframe(df).unwrap()
    }

    #[test]
    fn empty_frame_has_zero_height() {
        assert_eq!(Frame::empty().height(), 0);
    }

    #[test]
    fn stamp_source_only_tags_present_values() {
        let frame = sample("10637", vec![Some(1.0), None, Some(3.0)])
            .stamp_source("dwd")
            .unwrap();
        let src = frame.as_dataframe().column("temp_source").unwrap();
        assert_eq!(src.get(0).unwrap(), AnyValue::Utf8("dwd"));
        assert!(matches!(src.get(1).unwrap(), AnyValue::Null));
    }

    #[test]
    fn concat_unions_rows_and_fills_missing_columns_with_null() {
        let a = sample("A", vec![Some(1.0)]);
        let b = sample("B", vec![Some(2.0)]).stamp_source("dwd").unwrap();
        let combined = Frame::concat(vec![a, b]).unwrap();
        assert_eq!(combined.height(), 2);
        assert!(combined.as_dataframe().column("temp_source").is_ok());
    }

    #[test]
    fn concat_fills_missing_utf8_source_column_with_utf8_nulls_not_floats() {
        let a = sample("A", vec![Some(1.0)]);
        let b = sample("B", vec![Some(2.0)]).stamp_source("dwd").unwrap();
        let combined = Frame::concat(vec![a, b]).unwrap();
        let source = combined.as_dataframe().column(SOURCE_COL).unwrap();
        assert_eq!(*source.dtype(), DataType::Utf8);
        assert!(matches!(source.get(0).unwrap(), AnyValue::Null));
        assert_eq!(source.get(1).unwrap(), AnyValue::Utf8("dwd"));
    }

    #[test]
    fn stamp_source_sets_row_level_source_column() {
        let frame = sample("10637", vec![Some(1.0), Some(2.0)]).stamp_source("dwd_hourly").unwrap();
        let source = frame.as_dataframe().column(SOURCE_COL).unwrap();
        assert_eq!(source.get(0).unwrap(), AnyValue::Utf8("dwd_hourly"));
        assert_eq!(source.get(1).unwrap(), AnyValue::Utf8("dwd_hourly"));
    }

    #[test]
    fn concat_of_single_frame_is_identity() {
        let a = sample("A", vec![Some(1.0)]);
        let combined = Frame::concat(vec![a]).unwrap();
        assert_eq!(combined.height(), 1);
    }

    #[test]
    fn count_non_null_ignores_missing_column() {
        let a = sample("A", vec![Some(1.0), None]);
        assert_eq!(a.count_non_null(Parameter::Temp), 1);
        assert_eq!(a.count_non_null(Parameter::Pres), 0);
    }
}
