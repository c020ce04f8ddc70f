//! Lookup context cache
//!
//! Manages `.stackflow/context.json`, the cache of existing networks and
//! hosted zones that plan compilation resolves against.

use crate::error::{CloudError, Result};
use crate::lookup::{HostedZoneInfo, NetworkInfo, NetworkQuery, ResourceLookup, normalize_domain};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

const CONTEXT_VERSION: u32 = 1;
const CONTEXT_DIR: &str = ".stackflow";
const CONTEXT_FILE: &str = "context.json";
const CONTEXT_BACKUP: &str = "context.json.backup";

/// Cached lookup results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupContext {
    /// Context file version
    pub version: u32,

    /// Last modified timestamp
    pub updated_at: DateTime<Utc>,

    /// Networks indexed by id
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkInfo>,

    /// Hosted zones indexed by normalized domain
    #[serde(default)]
    pub hosted_zones: BTreeMap<String, HostedZoneInfo>,
}

impl Default for LookupContext {
    fn default() -> Self {
        Self {
            version: CONTEXT_VERSION,
            updated_at: Utc::now(),
            networks: BTreeMap::new(),
            hosted_zones: BTreeMap::new(),
        }
    }
}

impl LookupContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_network(mut self, network: NetworkInfo) -> Self {
        self.add_network(network);
        self
    }

    pub fn with_hosted_zone(mut self, zone: HostedZoneInfo) -> Self {
        self.add_hosted_zone(zone);
        self
    }

    /// Add or replace a network
    pub fn add_network(&mut self, network: NetworkInfo) {
        self.networks.insert(network.id.clone(), network);
        self.updated_at = Utc::now();
    }

    /// Add or replace the zone for a domain
    pub fn add_hosted_zone(&mut self, zone: HostedZoneInfo) {
        let zone = HostedZoneInfo {
            domain: normalize_domain(&zone.domain),
            ..zone
        };
        self.hosted_zones.insert(zone.domain.clone(), zone);
        self.updated_at = Utc::now();
    }

    pub fn remove_network(&mut self, id: &str) -> Option<NetworkInfo> {
        let result = self.networks.remove(id);
        if result.is_some() {
            self.updated_at = Utc::now();
        }
        result
    }
}

impl ResourceLookup for LookupContext {
    fn lookup_network(&self, query: &NetworkQuery) -> Result<NetworkInfo> {
        match query {
            NetworkQuery::Id(id) => self
                .networks
                .get(id)
                .cloned()
                .ok_or_else(|| CloudError::NetworkNotFound(query.to_string())),
            NetworkQuery::Name(name) => {
                let matches: Vec<&NetworkInfo> = self
                    .networks
                    .values()
                    .filter(|n| n.name.as_deref() == Some(name.as_str()))
                    .collect();
                match matches.as_slice() {
                    [network] => Ok((*network).clone()),
                    [] => Err(CloudError::NetworkNotFound(query.to_string())),
                    _ => Err(CloudError::LookupFailed(format!(
                        "{} networks match {}",
                        matches.len(),
                        query
                    ))),
                }
            }
        }
    }

    fn lookup_hosted_zone(&self, domain: &str) -> Result<Option<HostedZoneInfo>> {
        if domain.trim().is_empty() {
            return Ok(None);
        }
        Ok(self.hosted_zones.get(&normalize_domain(domain)).cloned())
    }
}

/// Reads and writes the context file
pub struct ContextStore {
    /// Project root directory
    project_root: PathBuf,
}

impl ContextStore {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
        }
    }

    fn context_dir(&self) -> PathBuf {
        self.project_root.join(CONTEXT_DIR)
    }

    pub fn context_path(&self) -> PathBuf {
        self.context_dir().join(CONTEXT_FILE)
    }

    fn backup_path(&self) -> PathBuf {
        self.context_dir().join(CONTEXT_BACKUP)
    }

    async fn ensure_context_dir(&self) -> Result<()> {
        let dir = self.context_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
            tracing::debug!("Created context directory: {}", dir.display());
        }
        Ok(())
    }

    /// Load the context; a missing file yields an empty context
    pub async fn load(&self) -> Result<LookupContext> {
        let path = self.context_path();
        if !path.exists() {
            tracing::debug!("Context file not found, returning empty context");
            return Ok(LookupContext::new());
        }

        let content = fs::read_to_string(&path).await?;
        let context: LookupContext = serde_json::from_str(&content)?;

        if context.version > CONTEXT_VERSION {
            return Err(CloudError::ContextError(format!(
                "Context file version {} is newer than supported version {}",
                context.version, CONTEXT_VERSION
            )));
        }

        tracing::debug!(
            networks = context.networks.len(),
            hosted_zones = context.hosted_zones.len(),
            "Loaded lookup context"
        );
        Ok(context)
    }

    /// Save the context, keeping the previous file as a backup
    pub async fn save(&self, context: &LookupContext) -> Result<()> {
        self.ensure_context_dir().await?;

        let path = self.context_path();
        let backup = self.backup_path();

        if path.exists() {
            if backup.exists() {
                fs::remove_file(&backup).await?;
            }
            fs::rename(&path, &backup).await?;
            tracing::debug!("Created context backup");
        }

        let content = serde_json::to_string_pretty(context)?;
        fs::write(&path, content).await?;

        tracing::debug!("Saved lookup context");
        Ok(())
    }
}
