//! Cloud resource error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Network not found: {0}")]
    NetworkNotFound(String),

    #[error("Lookup failed: {0}")]
    LookupFailed(String),

    #[error("Invalid ARN: {0}")]
    InvalidArn(String),

    #[error("Resource node already exists: {0}")]
    DuplicateNode(String),

    #[error("Resource node '{node}' depends on '{dependency}', which is not in the graph yet")]
    DanglingDependency { node: String, dependency: String },

    #[error("Resource node not found: {0}")]
    NodeNotFound(String),

    #[error("Context file error: {0}")]
    ContextError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;
