use std::path::PathBuf;
use thiserror::Error;

use crate::terrain::TerrainError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("reading scenario {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parsing scenario {path}: {source}")]
    ParseConfig {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid scenario: {0}")]
    Config(String),

    #[error(transparent)]
    Code(#[from] itm::InputError),

    #[error("terrain for site {site}: {source}")]
    Terrain {
        site: String,
        source: TerrainError,
    },

    #[error("writing {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
