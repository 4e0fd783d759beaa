use std::fs;

use camino::{Utf8Path, Utf8PathBuf};

use crate::domain::DatasetProbe;
use crate::error::WonderError;
use crate::harvest::HarvestedLink;
use crate::report::TopicsMapping;
use crate::taxonomy::Taxonomy;

/// Project-local data layout. Everything the pipeline produces or consumes
/// lives under `data/raw/` relative to the project root.
#[derive(Debug, Clone)]
pub struct Store {
    root: Utf8PathBuf,
}

impl Store {
    pub fn new() -> Result<Self, WonderError> {
        let cwd = std::env::current_dir().map_err(|err| WonderError::Filesystem(err.to_string()))?;
        let root = Utf8PathBuf::from_path_buf(cwd)
            .map_err(|_| WonderError::Filesystem("invalid project path".to_string()))?;
        Ok(Self { root })
    }

    pub fn new_with_root(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn dataset_map_path(&self) -> Utf8PathBuf {
        self.root
            .join("data")
            .join("raw")
            .join("wonder")
            .join("dataset_map.csv")
    }

    pub fn taxonomy_path(&self) -> Utf8PathBuf {
        self.root
            .join("data")
            .join("raw")
            .join("health-data-topics.json")
    }

    pub fn topics_mapping_path(&self) -> Utf8PathBuf {
        self.root
            .join("data")
            .join("raw")
            .join("wonder")
            .join("topics_mapping.json")
    }

    pub fn link_harvest_path(&self) -> Utf8PathBuf {
        self.root
            .join("data")
            .join("raw")
            .join("wonder")
            .join("link_harvest.csv")
    }

    pub fn write_bytes_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), WonderError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent.as_std_path())
                .map_err(|err| WonderError::Filesystem(err.to_string()))?;
        }
        let tmp_path = path.with_extension("tmp");
        fs::write(tmp_path.as_std_path(), content)
            .map_err(|err| WonderError::Filesystem(err.to_string()))?;
        fs::rename(tmp_path.as_std_path(), path.as_std_path())
            .map_err(|err| WonderError::Filesystem(err.to_string()))?;
        Ok(())
    }

    pub fn write_dataset_map(path: &Utf8Path, rows: &[DatasetProbe]) -> Result<(), WonderError> {
        let bytes = to_csv(rows)?;
        Self::write_bytes_atomic(path, &bytes)
    }

    pub fn read_dataset_map(path: &Utf8Path) -> Result<Vec<DatasetProbe>, WonderError> {
        if !path.as_std_path().exists() {
            return Err(WonderError::MissingDatasetMap(path.to_owned()));
        }
        let content = read_to_string(path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(content.as_bytes());
        let mut rows = Vec::new();
        for record in reader.deserialize() {
            let row: DatasetProbe = record.map_err(|err| WonderError::StoreParse {
                path: path.to_owned(),
                message: err.to_string(),
            })?;
            rows.push(row);
        }
        Ok(rows)
    }

    pub fn read_taxonomy(path: &Utf8Path) -> Result<Taxonomy, WonderError> {
        if !path.as_std_path().exists() {
            return Err(WonderError::MissingTaxonomy(path.to_owned()));
        }
        let content = read_to_string(path)?;
        serde_json::from_str(&content).map_err(|err| WonderError::StoreParse {
            path: path.to_owned(),
            message: err.to_string(),
        })
    }

    pub fn write_topics_mapping(
        path: &Utf8Path,
        document: &TopicsMapping,
    ) -> Result<(), WonderError> {
        let mut content = serde_json::to_vec_pretty(document)
            .map_err(|err| WonderError::Filesystem(err.to_string()))?;
        content.push(b'\n');
        Self::write_bytes_atomic(path, &content)
    }

    pub fn read_topics_mapping(path: &Utf8Path) -> Result<TopicsMapping, WonderError> {
        if !path.as_std_path().exists() {
            return Err(WonderError::MissingTopicsMapping(path.to_owned()));
        }
        let content = read_to_string(path)?;
        serde_json::from_str(&content).map_err(|err| WonderError::StoreParse {
            path: path.to_owned(),
            message: err.to_string(),
        })
    }

    /// Rows are written in URL order so reruns produce comparable files.
    pub fn write_link_harvest(path: &Utf8Path, links: &[HarvestedLink]) -> Result<(), WonderError> {
        let mut sorted: Vec<&HarvestedLink> = links.iter().collect();
        sorted.sort_by(|a, b| a.url.cmp(&b.url));
        let bytes = to_csv(&sorted)?;
        Self::write_bytes_atomic(path, &bytes)
    }
}

fn read_to_string(path: &Utf8Path) -> Result<String, WonderError> {
    fs::read_to_string(path.as_std_path()).map_err(|err| WonderError::StoreRead {
        path: path.to_owned(),
        message: err.to_string(),
    })
}

fn to_csv<T: serde::Serialize>(rows: &[T]) -> Result<Vec<u8>, WonderError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer
            .serialize(row)
            .map_err(|err| WonderError::Filesystem(err.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|err| WonderError::Filesystem(err.to_string()))
}
