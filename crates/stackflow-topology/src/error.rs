use stackflow_cloud::CloudError;
use stackflow_core::StackError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TopologyError {
    #[error(transparent)]
    Config(#[from] StackError),

    #[error("Configuration error: {0}")]
    ConfigValidation(String),

    #[error("No hosted zone resolves for '{0}'")]
    MissingHostedZone(String),

    #[error(
        "Environment variable '{variable}' is bound to {existing_arn}#{existing_key} and {arn}#{key}"
    )]
    DuplicateSecretVariable {
        variable: String,
        existing_arn: String,
        existing_key: String,
        arn: String,
        key: String,
    },

    #[error(transparent)]
    Cloud(#[from] CloudError),
}

pub type Result<T> = std::result::Result<T, TopologyError>;
