//! Lookup seam for resources that already exist

use crate::error::{CloudError, Result};
use serde::{Deserialize, Serialize};

/// How a network is identified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkQuery {
    Id(String),
    Name(String),
}

impl std::fmt::Display for NetworkQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkQuery::Id(id) => write!(f, "id={}", id),
            NetworkQuery::Name(name) => write!(f, "name={}", name),
        }
    }
}

/// Resolved network
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    /// Subnets tasks are placed in
    #[serde(default)]
    pub private_subnets: Vec<String>,

    /// Subnets the internet-facing load balancer is placed in
    #[serde(default)]
    pub public_subnets: Vec<String>,
}

/// Resolved DNS zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedZoneInfo {
    pub zone_id: String,
    pub domain: String,
}

/// Secret-store entry identified by its complete ARN
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretInfo {
    pub arn: String,
    pub name: String,
}

/// Blocking lookups answered by the provisioning collaborator's cache
///
/// Implementations must not retry; a failure aborts plan construction.
pub trait ResourceLookup {
    fn lookup_network(&self, query: &NetworkQuery) -> Result<NetworkInfo>;

    /// `Ok(None)` when no zone is known for the domain
    fn lookup_hosted_zone(&self, domain: &str) -> Result<Option<HostedZoneInfo>>;

    /// Secrets are referenced by complete ARN and need no remote call
    fn lookup_secret(&self, arn: &str) -> Result<SecretInfo> {
        parse_secret_arn(arn)
    }
}

/// Parses `arn:<partition>:secretsmanager:<region>:<account>:secret:<name>`
pub fn parse_secret_arn(arn: &str) -> Result<SecretInfo> {
    let parts: Vec<&str> = arn.splitn(7, ':').collect();

    match parts.as_slice() {
        ["arn", _partition, "secretsmanager", _region, account, "secret", name]
            if !account.is_empty() && !name.is_empty() =>
        {
            Ok(SecretInfo {
                arn: arn.to_string(),
                name: name.to_string(),
            })
        }
        _ => Err(CloudError::InvalidArn(arn.to_string())),
    }
}

/// Domain names compare case-insensitively and without the trailing dot
pub(crate) fn normalize_domain(domain: &str) -> String {
    domain.trim().trim_end_matches('.').to_lowercase()
}
