use std::time::Duration;

use camino::Utf8PathBuf;

use wonder_registry::domain::DiscoveryKind;
use wonder_registry::error::WonderError;
use wonder_registry::probe::{PageResponse, RedirectHop, WonderClient};
use wonder_registry::progress::{ProgressEvent, ProgressSink};
use wonder_registry::scan::{self, ScanOptions};
use wonder_registry::store::Store;

struct SilentSink;

impl ProgressSink for SilentSink {
    fn event(&self, _event: ProgressEvent) {}
}

/// Scripted WONDER frontend covering the discovery outcomes the scanner
/// has to cope with: header redirects, body-level redirects, server errors
/// and transport failures.
struct MockWonder;

impl WonderClient for MockWonder {
    fn fetch_page(&self, url: &str) -> Result<PageResponse, WonderError> {
        match url {
            "https://wonder.cdc.gov/controller/datarequest/D1" => Ok(PageResponse {
                final_url: "https://wonder.cdc.gov/ucd-icd10.html".to_string(),
                status: 200,
                hops: vec![RedirectHop {
                    url: url.to_string(),
                    location: "/ucd-icd10.html".to_string(),
                }],
                location: None,
                content_type: "text/html;charset=utf-8".to_string(),
                body: "<html></html>".to_string(),
            }),
            "https://wonder.cdc.gov/controller/datarequest/D2" => Ok(PageResponse {
                final_url: url.to_string(),
                status: 200,
                hops: Vec::new(),
                location: None,
                content_type: "text/html".to_string(),
                body: r#"<meta http-equiv="refresh" content="0;url=/natality-expanded-current.html">"#
                    .to_string(),
            }),
            "https://wonder.cdc.gov/controller/datarequest/D3" => Ok(PageResponse {
                final_url: url.to_string(),
                status: 500,
                hops: Vec::new(),
                location: None,
                content_type: "text/plain".to_string(),
                body: "internal error".to_string(),
            }),
            _ => Err(WonderError::WonderHttp("connection refused".to_string())),
        }
    }
}

fn scan_rows() -> Vec<wonder_registry::domain::DatasetProbe> {
    let options = ScanOptions {
        start: 1,
        end: 4,
        delay: Duration::ZERO,
    };
    scan::map_range(&MockWonder, &options, &SilentSink)
}

#[test]
fn discovery_outcomes_are_recorded_per_row() {
    let rows = scan_rows();
    assert_eq!(rows.len(), 4);

    assert_eq!(rows[0].id, "D1");
    assert_eq!(rows[0].discovery, DiscoveryKind::Redirect);
    assert_eq!(rows[0].final_url, "https://wonder.cdc.gov/ucd-icd10.html");
    assert_eq!(rows[0].page_name, "ucd-icd10.html");

    assert_eq!(rows[1].discovery, DiscoveryKind::Redirect);
    assert_eq!(rows[1].page_name, "natality-expanded-current.html");

    assert_eq!(rows[2].discovery, DiscoveryKind::Http(500));
    assert_eq!(rows[2].http_status, "500");
    assert!(rows[2].final_url.is_empty());

    assert_eq!(rows[3].discovery, DiscoveryKind::Error);
    assert_eq!(rows[3].http_status, "error");
    assert!(rows[3].error.contains("connection refused"));
}

#[test]
fn dataset_map_survives_a_csv_round_trip() {
    let temp = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    let store = Store::new_with_root(root);
    let path = store.dataset_map_path();

    let rows = scan_rows();
    Store::write_dataset_map(&path, &rows).unwrap();
    let reloaded = Store::read_dataset_map(&path).unwrap();

    assert_eq!(reloaded, rows);
}

#[test]
fn summary_reflects_the_mixed_outcomes() {
    let rows = scan_rows();
    let summary = scan::summarize(&rows, "dataset_map.csv".to_string());

    assert_eq!(summary.probed, 4);
    assert_eq!(summary.resolved, 2);
    assert_eq!(summary.errors, 1);
}
