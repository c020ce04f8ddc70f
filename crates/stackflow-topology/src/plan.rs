//! Deployment plan handed to the provisioning layer

use crate::certificate::CertificateDecision;
use crate::secrets::SecretBinding;
use serde::{Deserialize, Serialize};
use stackflow_cloud::{GraphSummary, NodeId, ResourceKind, ResourceNode};
use stackflow_core::BuildStrategy;
use std::collections::BTreeMap;

/// Complete, immutable result of one compilation
///
/// `nodes` are in build order; every node's dependencies precede it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentPlan {
    pub stack_name: String,
    pub app_name: String,
    pub stage: String,
    pub strategy: BuildStrategy,
    pub certificate: CertificateDecision,
    pub secrets: SecretBinding,
    pub tags: BTreeMap<String, String>,
    pub nodes: Vec<ResourceNode>,
}

impl DeploymentPlan {
    pub fn node(&self, id: &str) -> Option<&ResourceNode> {
        self.nodes.iter().find(|n| n.id.as_str() == id)
    }

    pub fn by_kind(&self, kind: ResourceKind) -> Vec<&ResourceNode> {
        self.nodes.iter().filter(|n| n.kind == kind).collect()
    }

    pub fn node_ids(&self) -> Vec<&NodeId> {
        self.nodes.iter().map(|n| &n.id).collect()
    }

    pub fn summary(&self) -> GraphSummary {
        GraphSummary::of(&self.nodes)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
