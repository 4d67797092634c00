use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OntologyError>;

#[derive(Debug, Error)]
pub enum OntologyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read ontology {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid OBO Graphs JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid OBO Graphs JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown index operation `{0}` (expected closure, id2name, id2alias or name2id)")]
    UnknownOperation(String),
}
