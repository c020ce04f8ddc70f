//! Dependency-ordered resource graph
//!
//! Nodes are appended in build order and may only depend on nodes that are
//! already present, so insertion order is always a valid topological order.

use crate::error::{CloudError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Logical identifier of a node (e.g. `LoadBalancer`, `AlarmCpuUtilization`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Kind of resource a node describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Network,
    HostedZone,
    Certificate,
    Secret,
    Cluster,
    LoadBalancer,
    Listener,
    TargetGroup,
    ImagePush,
    TaskDefinition,
    Service,
    DnsRecord,
    ScalableTarget,
    ScalingPolicy,
    Alarm,
    Dashboard,
    DashboardWidget,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Network => "network",
            ResourceKind::HostedZone => "hosted-zone",
            ResourceKind::Certificate => "certificate",
            ResourceKind::Secret => "secret",
            ResourceKind::Cluster => "cluster",
            ResourceKind::LoadBalancer => "load-balancer",
            ResourceKind::Listener => "listener",
            ResourceKind::TargetGroup => "target-group",
            ResourceKind::ImagePush => "image-push",
            ResourceKind::TaskDefinition => "task-definition",
            ResourceKind::Service => "service",
            ResourceKind::DnsRecord => "dns-record",
            ResourceKind::ScalableTarget => "scalable-target",
            ResourceKind::ScalingPolicy => "scaling-policy",
            ResourceKind::Alarm => "alarm",
            ResourceKind::Dashboard => "dashboard",
            ResourceKind::DashboardWidget => "dashboard-widget",
        }
    }

    /// Whether the node refers to a resource that already exists
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            ResourceKind::Network | ResourceKind::HostedZone | ResourceKind::Secret
        )
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single resource in the plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceNode {
    pub id: NodeId,

    pub kind: ResourceKind,

    /// Nodes that must exist before this one
    #[serde(default)]
    pub depends_on: BTreeSet<NodeId>,

    /// Resource-specific properties consumed by the provisioning layer
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,

    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl ResourceNode {
    pub fn new(id: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            id: NodeId::new(id),
            kind,
            depends_on: BTreeSet::new(),
            properties: serde_json::Map::new(),
            tags: BTreeMap::new(),
        }
    }

    pub fn depends_on(mut self, id: &NodeId) -> Self {
        self.depends_on.insert(id.clone());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.properties.insert(key.into(), value);
    }

    /// Get a property as a specific type
    pub fn get_property<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.properties
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Append-only graph of [`ResourceNode`]s
#[derive(Debug, Clone, Default)]
pub struct ResourceGraph {
    nodes: Vec<ResourceNode>,
    index: HashMap<NodeId, usize>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node whose dependencies are all already present
    pub fn add(&mut self, node: ResourceNode) -> Result<NodeId> {
        if self.index.contains_key(&node.id) {
            return Err(CloudError::DuplicateNode(node.id.to_string()));
        }
        if let Some(missing) = node.depends_on.iter().find(|d| !self.index.contains_key(*d)) {
            return Err(CloudError::DanglingDependency {
                node: node.id.to_string(),
                dependency: missing.to_string(),
            });
        }

        let id = node.id.clone();
        tracing::trace!(node = %id, kind = %node.kind, "Adding resource node");
        self.index.insert(id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(id)
    }

    /// Adds a dependency edge `from -> to` after both nodes exist
    ///
    /// `to` must have been added before `from`, which keeps insertion order
    /// topological.
    pub fn link(&mut self, from: &NodeId, to: &NodeId) -> Result<()> {
        let from_idx = *self
            .index
            .get(from)
            .ok_or_else(|| CloudError::NodeNotFound(from.to_string()))?;
        let to_idx = *self
            .index
            .get(to)
            .ok_or_else(|| CloudError::NodeNotFound(to.to_string()))?;

        if to_idx >= from_idx {
            return Err(CloudError::DanglingDependency {
                node: from.to_string(),
                dependency: to.to_string(),
            });
        }

        self.nodes[from_idx].depends_on.insert(to.clone());
        Ok(())
    }

    pub fn get(&self, id: &NodeId) -> Option<&ResourceNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn get_mut(&mut self, id: &NodeId) -> Option<&mut ResourceNode> {
        self.index.get(id).map(|&i| &mut self.nodes[i])
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceNode> {
        self.nodes.iter()
    }

    pub fn by_kind(&self, kind: ResourceKind) -> Vec<&ResourceNode> {
        self.nodes.iter().filter(|n| n.kind == kind).collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Applies the tags to every node; existing keys are overwritten
    pub fn apply_tags(&mut self, tags: &BTreeMap<String, String>) {
        for node in &mut self.nodes {
            for (key, value) in tags {
                node.tags.insert(key.clone(), value.clone());
            }
        }
    }

    pub fn summary(&self) -> GraphSummary {
        GraphSummary::of(&self.nodes)
    }

    pub fn into_nodes(self) -> Vec<ResourceNode> {
        self.nodes
    }
}

/// Node counts per kind
#[derive(Debug, Clone)]
pub struct GraphSummary {
    pub total: usize,
    pub lookups: usize,
    pub counts: BTreeMap<ResourceKind, usize>,
}

impl GraphSummary {
    pub fn of<'a>(nodes: impl IntoIterator<Item = &'a ResourceNode>) -> Self {
        let mut summary = GraphSummary {
            total: 0,
            lookups: 0,
            counts: BTreeMap::new(),
        };
        for node in nodes {
            summary.total += 1;
            if node.kind.is_lookup() {
                summary.lookups += 1;
            }
            *summary.counts.entry(node.kind).or_insert(0) += 1;
        }
        summary
    }
}

impl std::fmt::Display for GraphSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} resources ({} to create, {} looked up)",
            self.total,
            self.total - self.lookups,
            self.lookups
        )
    }
}
