use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found")]
    ConfigDirNotFound,

    #[error(
        "No configuration file found. Looked in:\n\
        - STACKFLOW_CONFIG_PATH\n\
        - current directory: stack.local.kdl, stack.kdl, cdk.config.json\n\
        - ./.stackflow/ directory\n\
        - ~/.config/stackflow/stack.kdl"
    )]
    ConfigFileNotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
