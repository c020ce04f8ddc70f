//! Configuration error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StackError {
    #[error("KDL parse error: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    ConfigValidation(String),

    #[error("Autoscaling bounds are inverted: min_capacity {min} > max_capacity {max}")]
    AutoscalingBounds { min: u32, max: u32 },

    #[error("Stage not found: {0}")]
    StageNotFound(String),
}

pub type Result<T> = std::result::Result<T, StackError>;
