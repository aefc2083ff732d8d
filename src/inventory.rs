//! Per-station, per-granularity data availability.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::granularity::Granularity;
use crate::parameter::Parameter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InventoryKey {
    pub parameter: Parameter,
    pub granularity: Granularity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct Inventory {
    entries: HashMap<(Parameter, Granularity), DateRange>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, parameter: Parameter, granularity: Granularity, range: DateRange) {
        self.entries.insert((parameter, granularity), range);
    }

    pub fn get(&self, parameter: Parameter, granularity: Granularity) -> Option<DateRange> {
        self.entries.get(&(parameter, granularity)).copied()
    }

    /// Does this station have any data for `parameter`/`granularity`
    /// overlapping `[start, end]`?
    pub fn covers(
        &self,
        parameter: Parameter,
        granularity: Granularity,
        start: NaiveDate,
        end: NaiveDate,
    ) -> bool {
        match self.get(parameter, granularity) {
            Some(DateRange {
                start: Some(s),
                end: Some(e),
            }) => s <= end && e >= start,
            // Missing bounds mean "unknown availability" — optimistically
            // let the dispatch engine try the provider rather than excluding it.
            _ => true,
        }
    }
}
