//! Static provider catalog with the two lookups the dispatch and squash
//! engines need: by id, and by `(granularity, parameter)` ordered by
//! descending priority.

use chrono::NaiveDate;

use crate::granularity::Granularity;
use crate::parameter::Parameter;
use crate::provider::Provider;

const fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    // `NaiveDate::from_ymd_opt` isn't `const`; these constants are all
    // valid calendar dates so the unwrap never panics.
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(d) => d,
        None => unreachable!(),
    }
}

pub static REGISTRY: &[Provider] = &[
    Provider {
        id: "meteostat_hourly",
        name: "Meteostat bulk archive (hourly)",
        granularity: Granularity::Hourly,
        parameters: &[
            Parameter::Temp,
            Parameter::Dwpt,
            Parameter::Rhum,
            Parameter::Prcp,
            Parameter::Wdir,
            Parameter::Wspd,
            Parameter::Wpgt,
            Parameter::Pres,
            Parameter::Tsun,
            Parameter::Coco,
        ],
        priority: 10,
        countries: None,
        coverage_start: None,
        coverage_end: None,
        identifier_dependencies: &[],
    },
    Provider {
        id: "meteostat_daily",
        name: "Meteostat bulk archive (daily)",
        granularity: Granularity::Daily,
        parameters: Parameter::DAILY_DEFAULTS,
        priority: 10,
        countries: None,
        coverage_start: None,
        coverage_end: None,
        identifier_dependencies: &[],
    },
    Provider {
        id: "meteostat_monthly",
        name: "Meteostat bulk archive (monthly)",
        granularity: Granularity::Monthly,
        parameters: Parameter::MONTHLY_DEFAULTS,
        priority: 10,
        countries: None,
        coverage_start: None,
        coverage_end: None,
        identifier_dependencies: &[],
    },
    Provider {
        id: "dwd_hourly",
        name: "Deutscher Wetterdienst (hourly, FTP open data)",
        granularity: Granularity::Hourly,
        parameters: &[
            Parameter::Temp,
            Parameter::Rhum,
            Parameter::Prcp,
            Parameter::Wdir,
            Parameter::Wspd,
            Parameter::Pres,
            Parameter::Tsun,
        ],
        priority: 30,
        countries: Some(&["DE"]),
        coverage_start: Some(date(1893, 1, 1)),
        coverage_end: None,
        identifier_dependencies: &["national"],
    },
    Provider {
        id: "dwd_daily",
        name: "Deutscher Wetterdienst (daily, FTP open data)",
        granularity: Granularity::Daily,
        parameters: &[
            Parameter::Temp,
            Parameter::Tmin,
            Parameter::Tmax,
            Parameter::Prcp,
            Parameter::Snwd,
            Parameter::Wspd,
            Parameter::Wpgt,
            Parameter::Pres,
            Parameter::Tsun,
        ],
        priority: 30,
        countries: Some(&["DE"]),
        coverage_start: Some(date(1781, 1, 1)),
        coverage_end: None,
        identifier_dependencies: &["national"],
    },
    Provider {
        id: "eccc_hourly",
        name: "Environment and Climate Change Canada (hourly)",
        granularity: Granularity::Hourly,
        parameters: &[Parameter::Temp, Parameter::Rhum, Parameter::Wdir, Parameter::Wspd, Parameter::Prcp],
        priority: 30,
        countries: Some(&["CA"]),
        coverage_start: None,
        coverage_end: None,
        identifier_dependencies: &["national"],
    },
    Provider {
        id: "gsa_hourly",
        name: "GeoSphere Austria Data Hub (hourly)",
        granularity: Granularity::Hourly,
        parameters: &[
            Parameter::Temp,
            Parameter::Prcp,
            Parameter::Pres,
            Parameter::Wspd,
            Parameter::Wdir,
            Parameter::Rhum,
            Parameter::Tsun,
        ],
        priority: 30,
        countries: Some(&["AT"]),
        coverage_start: Some(date(1991, 1, 1)),
        coverage_end: None,
        identifier_dependencies: &["national"],
    },
    Provider {
        id: "gsa_daily",
        name: "GeoSphere Austria Data Hub (daily)",
        granularity: Granularity::Daily,
        parameters: &[
            Parameter::Temp,
            Parameter::Tmin,
            Parameter::Tmax,
            Parameter::Prcp,
            Parameter::Wspd,
            Parameter::Pres,
        ],
        priority: 30,
        countries: Some(&["AT"]),
        coverage_start: Some(date(1991, 1, 1)),
        coverage_end: None,
        identifier_dependencies: &["national"],
    },
    Provider {
        id: "gsa_monthly",
        name: "GeoSphere Austria Data Hub (monthly)",
        granularity: Granularity::Monthly,
        parameters: &[Parameter::Temp, Parameter::Tmin, Parameter::Tmax, Parameter::Prcp],
        priority: 30,
        countries: Some(&["AT"]),
        coverage_start: Some(date(1991, 1, 1)),
        coverage_end: None,
        identifier_dependencies: &["national"],
    },
    Provider {
        id: "noaa_metar",
        name: "NOAA Aviation Weather Center (METAR)",
        granularity: Granularity::Hourly,
        parameters: &[
            Parameter::Temp,
            Parameter::Dwpt,
            Parameter::Wdir,
            Parameter::Wspd,
            Parameter::Pres,
            Parameter::Coco,
        ],
        priority: 20,
        countries: None,
        coverage_start: None,
        coverage_end: None,
        identifier_dependencies: &["icao"],
    },
    Provider {
        id: "metno_forecast",
        name: "MET Norway Locationforecast",
        granularity: Granularity::Hourly,
        parameters: &[
            Parameter::Temp,
            Parameter::Rhum,
            Parameter::Pres,
            Parameter::Wdir,
            Parameter::Wspd,
            Parameter::Cldc,
        ],
        priority: 5,
        countries: None,
        coverage_start: None,
        coverage_end: None,
        identifier_dependencies: &[],
    },
];

pub fn by_id(id: &str) -> Option<&'static Provider> {
    REGISTRY.iter().find(|p| p.id == id)
}

pub fn priority(id: &str) -> Option<i32> {
    by_id(id).map(|p| p.priority)
}

/// Providers supporting `granularity` and `parameter`, ordered by
/// descending priority then ascending id (deterministic tie-break).
pub fn for_granularity_parameter(granularity: Granularity, parameter: Parameter) -> Vec<&'static Provider> {
    let mut matches: Vec<&'static Provider> = REGISTRY
        .iter()
        .filter(|p| p.granularity == granularity && p.supports_parameter(parameter))
        .collect();
    matches.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.id.cmp(b.id)));
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_id_finds_known_provider() {
        assert!(by_id("dwd_hourly").is_some());
        assert!(by_id("does_not_exist").is_none());
    }

    #[test]
    fn priority_lookup_matches_registry_entry() {
        assert_eq!(priority("dwd_hourly"), Some(30));
    }

    #[test]
    fn granularity_parameter_lookup_is_priority_ordered() {
        let matches = for_granularity_parameter(Granularity::Hourly, Parameter::Temp);
        assert!(!matches.is_empty());
        for pair in matches.windows(2) {
            assert!(pair[0].priority >= pair[1].priority);
        }
    }

    #[test]
    fn dwd_only_applies_to_germany() {
        let dwd = by_id("dwd_hourly").unwrap();
        assert!(dwd.supports_country("DE"));
        assert!(!dwd.supports_country("CA"));
    }

    #[test]
    fn meteostat_bulk_applies_worldwide() {
        let m = by_id("meteostat_hourly").unwrap();
        assert!(m.supports_country("CA"));
        assert!(m.supports_country("AT"));
    }
}
