//! Whole-file configuration: global section plus stages

use super::container::ContainerSpec;
use super::stage::StageConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How the load-balancing layer is assembled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildStrategy {
    /// Load balancer, listener, target group and health check as one unit
    #[default]
    Managed,
    /// Independently wired nodes, TLS on 443, image pushed to a private registry
    Explicit,
}

impl BuildStrategy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "managed" | "managed-pattern" => Some(Self::Managed),
            "explicit" | "explicit-assembly" => Some(Self::Explicit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Managed => "managed",
            Self::Explicit => "explicit",
        }
    }
}

impl std::fmt::Display for BuildStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deployment configuration file
///
/// One global section (application name, build strategy, default container)
/// and one [`StageConfig`] per stage name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Application name as written (e.g. `my-api`)
    #[serde(rename = "name", alias = "app")]
    pub app: String,

    #[serde(default)]
    pub strategy: BuildStrategy,

    /// Container defaults shared by every stage
    #[serde(default)]
    pub container: ContainerSpec,

    #[serde(default)]
    pub stages: BTreeMap<String, StageConfig>,
}

impl DeployConfig {
    pub fn stage(&self, name: &str) -> Option<&StageConfig> {
        self.stages.get(name)
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.keys().map(|s| s.as_str()).collect()
    }
}
