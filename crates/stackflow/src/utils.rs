use colored::Colorize;
use stackflow_cloud::ContextStore;
use stackflow_core::DeployConfig;
use std::path::{Path, PathBuf};

/// Loads the configuration from `path` or the discovered file
pub fn load_config(path: Option<&Path>) -> anyhow::Result<(PathBuf, DeployConfig)> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => stackflow_config::find_config_file()?,
    };
    tracing::debug!(path = %path.display(), "Loading configuration");

    let config = stackflow_core::load_config_file(&path)
        .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
    Ok((path, config))
}

/// Picks the stage: explicit argument, else `default`, else the only stage
pub fn determine_stage_name(
    stage: Option<String>,
    config: &DeployConfig,
) -> anyhow::Result<String> {
    if let Some(s) = stage {
        return Ok(s);
    }
    if config.stages.contains_key("default") {
        return Ok("default".to_string());
    }
    if let [only] = config.stage_names().as_slice() {
        return Ok(only.to_string());
    }
    Err(anyhow::anyhow!(
        "Specify a stage: stack <command> <stage> or STACKFLOW_STAGE=<stage>\nAvailable stages: {}",
        config.stage_names().join(", ")
    ))
}

/// Context store for the project the configuration belongs to
pub fn context_store(config: Option<&Path>) -> ContextStore {
    let root = match config {
        Some(path) => stackflow_config::project_root(path),
        None => stackflow_config::find_config_file()
            .map(|path| stackflow_config::project_root(&path))
            .unwrap_or_else(|_| PathBuf::from(".")),
    };
    ContextStore::new(root)
}

pub fn print_error(title: &str, error: &dyn std::fmt::Display) {
    eprintln!();
    eprintln!("{}", format!("✗ {}", title).red().bold());
    eprintln!("  {}", error);
}
