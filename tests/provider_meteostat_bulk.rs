//! End-to-end adapter test: a gzip-compressed CSV served from a mock HTTP
//! endpoint round-trips through the bulk-archive provider, the fetch cache,
//! and into a canonical `Frame`.

use std::io::Write;

use chrono::NaiveDate;
use flate2::write::GzEncoder;
use flate2::Compression;
use meteostat::cache::Cache;
use meteostat::config::Config;
use meteostat::granularity::Granularity;
use meteostat::network::NetworkClient;
use meteostat::provider::meteostat_bulk;
use meteostat::request::ProviderRequest;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gzip(csv: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(csv.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

#[tokio::test]
async fn fetches_and_caches_one_years_hourly_csv() {
    let server = MockServer::start().await;
    let csv = "2020-01-01,0,5.4,2.1,88,0.0,,270,12.0,,1013.2,,3\n\
               2020-01-01,1,5.1,1.9,89,0.0,,265,11.5,,1013.5,,3\n";

    Mock::given(method("GET"))
        .and(path("/hourly/2020/10637.csv.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(csv)))
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.meteostat_hourly_endpoint = format!("{}/hourly/{{year}}/{{station}}.csv.gz", server.uri());

    let cache_dir = tempfile::tempdir().unwrap();
    let cache = Cache::new(cache_dir.path(), true);
    let client = NetworkClient::new();

    let request = ProviderRequest {
        station_id: "10637".to_string(),
        granularity: Granularity::Hourly,
        start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        end: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        parameters: vec![],
    };

    let frame = meteostat_bulk::fetch(&request, &client, &cache, &config).await;
    assert_eq!(frame.height(), 2);
    assert!(frame.has_parameter(meteostat::Parameter::Temp));

    let df = frame.as_dataframe();
    let temp = df.column("temp").unwrap().f64().unwrap().get(0);
    assert_eq!(temp, Some(5.4));
}

#[tokio::test]
async fn repeated_fetch_within_ttl_hits_cache_not_the_network() {
    let server = MockServer::start().await;
    let csv = "2020-01-01,0,10.0,,,,,,,,,,\n";

    Mock::given(method("GET"))
        .and(path("/hourly/2021/72202.csv.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(csv)))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.meteostat_hourly_endpoint = format!("{}/hourly/{{year}}/{{station}}.csv.gz", server.uri());

    let cache_dir = tempfile::tempdir().unwrap();
    let cache = Cache::new(cache_dir.path(), true);
    let client = NetworkClient::new();

    let request = ProviderRequest {
        station_id: "72202".to_string(),
        granularity: Granularity::Hourly,
        start: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
        end: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
        parameters: vec![],
    };

    let first = meteostat_bulk::fetch(&request, &client, &cache, &config).await;
    let second = meteostat_bulk::fetch(&request, &client, &cache, &config).await;
    assert_eq!(first.height(), second.height());
    // wiremock's `.expect(1)` on the mock is verified when `server` drops.
}
