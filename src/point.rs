//! Geographic point.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
    /// Elevation in meters. `None` means "unknown", not "sea level" —
    /// `Some(0.0)` is a distinct, valid value (a coastal station at sea
    /// level). Never test this field for truthiness; always match on
    /// `Option::is_some`/`is_none`.
    pub elevation: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointError(pub String);

impl fmt::Display for PointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PointError {}

impl Point {
    pub fn new(latitude: f64, longitude: f64, elevation: Option<f64>) -> Result<Self, PointError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(PointError("Latitude must be between -90 and 90".to_string()));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(PointError(
                "Longitude must be between -180 and 180".to_string(),
            ));
        }
        Ok(Self {
            latitude,
            longitude,
            elevation,
        })
    }

    pub fn without_elevation(latitude: f64, longitude: f64) -> Result<Self, PointError> {
        Self::new(latitude, longitude, None)
    }
}
