//! Immutable station record, grounded in
//! `original_source/meteostat/typing.py::Station` (as exercised by
//! `tests/unit/test_data.py::TestStationsToDf`).

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub country: String,
    pub region: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    pub timezone: String,
    /// Alternate identifiers used to index into individual providers
    /// (`wmo`, `icao`, `national`, `mosmix`, ...).
    pub identifiers: HashMap<String, String>,
}

impl Station {
    /// Does this station carry every identifier a provider depends on?
    pub fn satisfies(&self, dependencies: &[&str]) -> bool {
        dependencies.iter().all(|d| self.identifiers.contains_key(*d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Station {
        Station {
            id: "10637".to_string(),
            name: "Frankfurt".to_string(),
            country: "DE".to_string(),
            region: Some("HE".to_string()),
            latitude: 50.0379,
            longitude: 8.5622,
            elevation: 111.0,
            timezone: "Europe/Berlin".to_string(),
            identifiers: [("wmo".to_string(), "10637".to_string())]
                .into_iter()
                .collect(),
        }
    }

    #[test]
    fn satisfies_present_dependency() {
        assert!(sample().satisfies(&["wmo"]));
    }

    #[test]
    fn fails_missing_dependency() {
        assert!(!sample().satisfies(&["icao"]));
    }
}
