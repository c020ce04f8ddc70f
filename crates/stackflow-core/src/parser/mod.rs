//! Configuration parsers
//!
//! `stack.kdl` is the native format. The `cdk.config.json` layout is accepted
//! as well so existing configurations can be compiled unchanged.

mod container;
mod stage;

use container::parse_container;
use stage::parse_stage;

use crate::error::{Result, StackError};
use crate::model::{BuildStrategy, DeployConfig};
use kdl::{KdlDocument, KdlNode, KdlValue};
use std::path::Path;
use tracing::{debug, instrument};

/// Loads a configuration file, choosing the parser by extension
#[instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn load_config_file<P: AsRef<Path>>(path: P) -> Result<DeployConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;

    let config = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => parse_json_string(&content)?,
        _ => parse_kdl_string(&content)?,
    };

    debug!(
        app = %config.app,
        stages = config.stages.len(),
        "Configuration loaded"
    );
    Ok(config)
}

/// Parses the `cdk.config.json` layout
pub fn parse_json_string(content: &str) -> Result<DeployConfig> {
    let config: DeployConfig = serde_json::from_str(content)?;
    if config.app.trim().is_empty() {
        return Err(StackError::ConfigValidation(
            "application name is required".to_string(),
        ));
    }
    Ok(config)
}

/// Parses a KDL document into a [`DeployConfig`]
pub fn parse_kdl_string(content: &str) -> Result<DeployConfig> {
    let doc: KdlDocument = content.parse()?;
    let mut config = DeployConfig::default();

    for node in doc.nodes() {
        match node.name().value() {
            "app" | "project" => {
                config.app = first_string(node).ok_or_else(|| {
                    StackError::ConfigValidation("app requires a name".to_string())
                })?;
            }
            "strategy" => {
                let value = first_string(node).unwrap_or_default();
                config.strategy = BuildStrategy::parse(&value).ok_or_else(|| {
                    StackError::ConfigValidation(format!(
                        "unknown build strategy '{}' (expected managed or explicit)",
                        value
                    ))
                })?;
            }
            "container" => {
                let container = parse_container(node)?;
                config.container.merge(container);
            }
            "stage" => {
                let (name, stage) = parse_stage(node)?;
                if config.stages.contains_key(&name) {
                    return Err(StackError::ConfigValidation(format!(
                        "stage '{}' is defined more than once",
                        name
                    )));
                }
                config.stages.insert(name, stage);
            }
            other => {
                debug!(node = other, "Skipping unknown top-level node");
            }
        }
    }

    if config.app.trim().is_empty() {
        return Err(StackError::ConfigValidation(
            "app node is required".to_string(),
        ));
    }

    Ok(config)
}

// ============ KDL helpers ============

fn first_string(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn positional_strings(node: &KdlNode) -> Vec<String> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .filter_map(|e| e.value().as_string().map(|s| s.to_string()))
        .collect()
}

fn prop<'a>(node: &'a KdlNode, key: &str) -> Option<&'a KdlValue> {
    node.entries()
        .iter()
        .find(|e| e.name().map(|n| n.value()) == Some(key))
        .map(|e| e.value())
}

fn prop_string(node: &KdlNode, key: &str) -> Option<String> {
    prop(node, key)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}

fn prop_bool(node: &KdlNode, key: &str) -> Option<bool> {
    prop(node, key).and_then(|v| v.as_bool())
}

fn prop_u32(node: &KdlNode, key: &str) -> Result<Option<u32>> {
    match prop(node, key) {
        Some(value) => value_u32(node, key, value).map(Some),
        None => Ok(None),
    }
}

fn prop_f64(node: &KdlNode, key: &str) -> Option<f64> {
    prop(node, key).and_then(|v| v.as_float().or_else(|| v.as_integer().map(|i| i as f64)))
}

fn value_u32(node: &KdlNode, key: &str, value: &KdlValue) -> Result<u32> {
    value
        .as_integer()
        .and_then(|i| u32::try_from(i).ok())
        .ok_or_else(|| {
            StackError::ConfigValidation(format!(
                "{}.{} must be a non-negative integer",
                node.name().value(),
                key
            ))
        })
}

/// Reads `{ KEY "value" }` children into a map
fn string_map(node: &KdlNode) -> std::collections::BTreeMap<String, String> {
    let mut map = std::collections::BTreeMap::new();
    if let Some(children) = node.children() {
        for child in children.nodes() {
            let key = child.name().value().to_string();
            let value = first_string(child).unwrap_or_default();
            map.insert(key, value);
        }
    }
    map
}

#[cfg(test)]
mod tests;
