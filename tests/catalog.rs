use camino::Utf8PathBuf;

use wonder_registry::catalog;
use wonder_registry::domain::{DatasetProbe, DiscoveryKind};
use wonder_registry::report;
use wonder_registry::store::Store;
use wonder_registry::taxonomy::Taxonomy;

const TAXONOMY: &str = r#"{
    "health": [
        {
            "category": "Vital Statistics",
            "topics": [
                { "name": "Mortality" },
                { "name": "Birth & Natality" }
            ]
        },
        {
            "category": "Prevention",
            "topics": [
                { "name": "Vaccinations & Immunizations" }
            ]
        }
    ]
}"#;

fn resolved(id: &str, page_name: &str, years: &str) -> DatasetProbe {
    DatasetProbe {
        id: id.to_string(),
        controller_url: format!("https://wonder.cdc.gov/controller/datarequest/{id}"),
        http_status: "200".to_string(),
        discovery: DiscoveryKind::Redirect,
        final_url: format!("https://wonder.cdc.gov/{page_name}"),
        page_name: page_name.to_string(),
        years: years.to_string(),
        error: String::new(),
    }
}

fn error_row(id: &str) -> DatasetProbe {
    DatasetProbe {
        id: id.to_string(),
        controller_url: format!("https://wonder.cdc.gov/controller/datarequest/{id}"),
        http_status: "error".to_string(),
        discovery: DiscoveryKind::Error,
        final_url: String::new(),
        page_name: String::new(),
        years: String::new(),
        error: "timed out".to_string(),
    }
}

fn sample_rows() -> Vec<DatasetProbe> {
    vec![
        resolved("D176", "ucd-icd10.html", "1999-2020"),
        resolved("D8", "natality-2016.html", "2016"),
        resolved("D21", "vaers.html", ""),
        resolved("D66", "unknown-page.html", ""),
        error_row("D3"),
    ]
}

#[test]
fn pipeline_classifies_and_sorts_the_document() {
    let taxonomy: Taxonomy = serde_json::from_str(TAXONOMY).unwrap();
    let (mappings, unmapped) = catalog::catalog_datasets(&sample_rows(), &taxonomy);
    let document = report::build_topics_mapping(mappings, unmapped);

    assert_eq!(document.total_mapped, 3);
    assert_eq!(document.total_unmapped, 1);

    let ids: Vec<&str> = document
        .mappings
        .iter()
        .map(|m| m.dataset_id.as_str())
        .collect();
    assert_eq!(ids, ["D8", "D21", "D176"]);

    let mortality = document
        .mappings
        .iter()
        .find(|m| m.dataset_id == "D176")
        .unwrap();
    assert_eq!(mortality.topic, "Mortality");
    assert_eq!(mortality.category, "Vital Statistics");
    assert_eq!(mortality.years, "1999-2020");
    assert!(mortality.reason.contains("D176"));
    assert!(mortality.reason.contains("ucd-icd10.html"));

    let vaers = document
        .mappings
        .iter()
        .find(|m| m.dataset_id == "D21")
        .unwrap();
    assert_eq!(vaers.topic, "Vaccinations & Immunizations");
    assert_eq!(vaers.category, "Prevention");

    assert_eq!(document.unmapped[0].dataset_id, "D66");
    assert!(document.unmapped[0].reason.contains("could not be mapped"));
}

#[test]
fn document_round_trips_through_the_store() {
    let temp = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    let store = Store::new_with_root(root);
    let path = store.topics_mapping_path();

    let taxonomy: Taxonomy = serde_json::from_str(TAXONOMY).unwrap();
    let (mappings, unmapped) = catalog::catalog_datasets(&sample_rows(), &taxonomy);
    let document = report::build_topics_mapping(mappings, unmapped);

    Store::write_topics_mapping(&path, &document).unwrap();
    let reloaded = Store::read_topics_mapping(&path).unwrap();

    assert_eq!(
        serde_json::to_value(&reloaded).unwrap(),
        serde_json::to_value(&document).unwrap()
    );

    let raw = std::fs::read_to_string(path.as_std_path()).unwrap();
    assert!(raw.starts_with("{\n  \"description\": \"CDC Wonder dataset to health topic mappings\""));
    assert!(raw.ends_with("}\n"));
}

#[test]
fn rerun_is_stable_apart_from_the_timestamp() {
    let taxonomy: Taxonomy = serde_json::from_str(TAXONOMY).unwrap();

    let (mappings, unmapped) = catalog::catalog_datasets(&sample_rows(), &taxonomy);
    let first = report::build_topics_mapping(mappings, unmapped);

    let (mappings, unmapped) = catalog::catalog_datasets(&sample_rows(), &taxonomy);
    let second = report::build_topics_mapping(mappings, unmapped);

    let mut first = serde_json::to_value(&first).unwrap();
    let mut second = serde_json::to_value(&second).unwrap();
    first.as_object_mut().unwrap().remove("generated_at");
    second.as_object_mut().unwrap().remove("generated_at");

    assert_eq!(first, second);
}
