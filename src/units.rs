//! Unit conversion tables, grounded in
//! `original_source/meteostat/utils/conversions.py` and
//! `original_source/meteostat/units.py`, carried in minimal form since
//! `TimeSeries::fetch(units=...)` depends on it directly.

use crate::parameter::Parameter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitSystem {
    Metric,
    Imperial,
    Si,
}

pub fn celsius_to_fahrenheit(v: f64) -> f64 {
    round1((v * 9.0 / 5.0) + 32.0)
}

pub fn celsius_to_kelvin(v: f64) -> f64 {
    v + 273.15
}

pub fn millimeters_to_inches(v: f64) -> f64 {
    round3(v / 25.4)
}

pub fn meters_to_feet(v: f64) -> f64 {
    round1(v / 0.3048)
}

pub fn kmh_to_ms(v: f64) -> f64 {
    round1(v / 3.6)
}

pub fn kmh_to_mph(v: f64) -> f64 {
    round1(v * 0.621371)
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Convert one value of `parameter` from the native (metric) unit into
/// `system`. Parameters with no mapping for the requested system (e.g.
/// categorical codes) are returned unchanged. `NaN` passes through as `NaN`.
pub fn convert(parameter: Parameter, value: f64, system: UnitSystem) -> f64 {
    if value.is_nan() {
        return value;
    }
    match (parameter, system) {
        (Parameter::Temp | Parameter::Tmin | Parameter::Tmax | Parameter::Dwpt, UnitSystem::Imperial) => {
            celsius_to_fahrenheit(value)
        }
        (Parameter::Temp | Parameter::Tmin | Parameter::Tmax | Parameter::Dwpt, UnitSystem::Si) => {
            celsius_to_kelvin(value)
        }
        (Parameter::Prcp, UnitSystem::Imperial) => millimeters_to_inches(value),
        (Parameter::Snwd, UnitSystem::Imperial) => millimeters_to_inches(value),
        (Parameter::Wspd | Parameter::Wpgt, UnitSystem::Si) => kmh_to_ms(value),
        (Parameter::Wspd | Parameter::Wpgt, UnitSystem::Imperial) => kmh_to_mph(value),
        _ => value,
    }
}

/// Wind direction in degrees to an 8-point compass label, grounded in
/// `meteostat/units.py::to_direction`.
pub fn to_direction(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        return None;
    }
    let v = value.rem_euclid(360.0);
    Some(if (337.0..=360.0).contains(&v) || v <= 23.0 {
        "N"
    } else if (24.0..=68.0).contains(&v) {
        "NE"
    } else if (69.0..=113.0).contains(&v) {
        "E"
    } else if (114.0..=158.0).contains(&v) {
        "SE"
    } else if (159.0..=203.0).contains(&v) {
        "S"
    } else if (204.0..=248.0).contains(&v) {
        "SW"
    } else if (249.0..=293.0).contains(&v) {
        "W"
    } else {
        "NW"
    })
}

const CONDITIONS: [&str; 27] = [
    "Clear",
    "Fair",
    "Cloudy",
    "Overcast",
    "Fog",
    "Freezing Fog",
    "Light Rain",
    "Rain",
    "Heavy Rain",
    "Freezing Rain",
    "Heavy Freezing Rain",
    "Sleet",
    "Heavy Sleet",
    "Light Snowfall",
    "Snowfall",
    "Heavy Snowfall",
    "Rain Shower",
    "Heavy Rain Shower",
    "Sleet Shower",
    "Heavy Sleet Shower",
    "Snow Shower",
    "Heavy Snow Shower",
    "Lightning",
    "Hail",
    "Thunderstorm",
    "Heavy Thunderstorm",
    "Storm",
];

/// Meteostat condition code (1-27) to descriptive string, grounded in
/// `meteostat/units.py::to_condition`.
pub fn to_condition(value: u8) -> Option<&'static str> {
    if value < 1 || value > 27 {
        return None;
    }
    Some(CONDITIONS[(value - 1) as usize])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn celsius_conversions() {
        assert_eq!(celsius_to_fahrenheit(0.0), 32.0);
        assert_eq!(celsius_to_kelvin(0.0), 273.15);
    }

    #[test]
    fn wind_direction_north_wraps() {
        assert_eq!(to_direction(0.0), Some("N"));
        assert_eq!(to_direction(350.0), Some("N"));
        assert_eq!(to_direction(360.0), Some("N"));
    }

    #[test]
    fn condition_code_roundtrip() {
        assert_eq!(to_condition(1), Some("Clear"));
        assert_eq!(to_condition(27), Some("Storm"));
        assert_eq!(to_condition(0), None);
        assert_eq!(to_condition(28), None);
    }

    #[test]
    fn nan_passes_through_convert() {
        assert!(convert(Parameter::Temp, f64::NAN, UnitSystem::Imperial).is_nan());
    }
}
