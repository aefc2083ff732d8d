//! Request validator boundary tests: exactly-30-year daily request passes;
//! 30 years + 1 day fails; `block_large_requests=false` disables both
//! gates.

use chrono::NaiveDate;
use meteostat::config::Config;
use meteostat::granularity::Granularity;
use meteostat::request::Request;
use meteostat::validate::validate;

#[test]
fn exactly_thirty_year_daily_request_passes() {
    let start = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2020, 12, 31).unwrap();
    let mut req = Request::new(vec!["10637".to_string()], Granularity::Daily)
        .with_start(start)
        .with_end(end);
    assert!(validate(&mut req, &Config::default()).is_ok());
}

#[test]
fn thirty_one_year_span_is_blocked() {
    let start = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2021, 12, 31).unwrap();
    let mut req = Request::new(vec!["10637".to_string()], Granularity::Daily)
        .with_start(start)
        .with_end(end);
    assert!(validate(&mut req, &Config::default()).is_err());
}

#[test]
fn block_large_requests_false_disables_span_and_station_count_gates() {
    let mut config = Config::default();
    config.block_large_requests = false;

    let mut long_span = Request::new(vec!["10637".to_string()], Granularity::Daily)
        .with_start(NaiveDate::from_ymd_opt(1990, 1, 1).unwrap())
        .with_end(NaiveDate::from_ymd_opt(2021, 12, 31).unwrap());
    assert!(validate(&mut long_span, &config).is_ok());

    let ids: Vec<String> = (0..20).map(|i| i.to_string()).collect();
    let mut many_stations = Request::new(ids, Granularity::Monthly);
    assert!(validate(&mut many_stations, &config).is_ok());
}

#[test]
fn hourly_three_year_span_is_the_boundary() {
    let mut req = Request::new(vec!["10637".to_string()], Granularity::Hourly)
        .with_start(NaiveDate::from_ymd_opt(2019, 1, 1).unwrap())
        .with_end(NaiveDate::from_ymd_opt(2022, 12, 31).unwrap());
    assert!(validate(&mut req, &Config::default()).is_ok());

    let mut over = Request::new(vec!["10637".to_string()], Granularity::Hourly)
        .with_start(NaiveDate::from_ymd_opt(2019, 1, 1).unwrap())
        .with_end(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
    assert!(validate(&mut over, &Config::default()).is_err());
}

#[test]
fn monthly_request_ignores_the_span_cap_entirely() {
    let mut req = Request::new(vec!["10637".to_string()], Granularity::Monthly)
        .with_start(NaiveDate::from_ymd_opt(1990, 1, 1).unwrap())
        .with_end(NaiveDate::from_ymd_opt(2021, 12, 31).unwrap());
    assert!(validate(&mut req, &Config::default()).is_ok());
}
