//! Errors outside the call contract.
//!
//! Calls into the tree answer with Error values; this type covers the
//! failures around it: reading and parsing tree descriptions, and mounting
//! the nodes they describe.

use std::path::PathBuf;

use thiserror::Error;


#[derive(Debug, Error)]
pub enum CtlError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid tree config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("node '{path}': {reason}")]
    InvalidNode { path: String, reason: String },
}

impl CtlError {
    pub fn invalid_node(path: impl Into<String>, reason: impl Into<String>) -> Self {
        CtlError::InvalidNode {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
