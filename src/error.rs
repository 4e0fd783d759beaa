use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum WonderError {
    #[error("invalid dataset id: {0}")]
    InvalidDatasetId(String),

    #[error("invalid discovery kind: {0}")]
    InvalidDiscoveryKind(String),

    #[error("WONDER request failed: {0}")]
    WonderHttp(String),

    #[error("redirect chain did not settle for {0}")]
    TooManyRedirects(String),

    #[error("missing dataset map at {0} (run `wonder-registry scan` first)")]
    MissingDatasetMap(Utf8PathBuf),

    #[error("missing topic taxonomy at {0}")]
    MissingTaxonomy(Utf8PathBuf),

    #[error("missing topics mapping at {0} (run `wonder-registry catalog` first)")]
    MissingTopicsMapping(Utf8PathBuf),

    #[error("failed to read {path}: {message}")]
    StoreRead { path: Utf8PathBuf, message: String },

    #[error("failed to parse {path}: {message}")]
    StoreParse { path: Utf8PathBuf, message: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
