//! Per-stage configuration

use super::container::ContainerSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Target account and region
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsAccount {
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub region: String,
    #[serde(default, rename = "account_name")]
    pub account_name: Option<String>,
}

/// Network lookup key; `id` wins when both are set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// DNS binding
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsSpec {
    #[serde(default)]
    pub enable: bool,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub hostname: String,
}

/// TLS certificate source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateSpec {
    #[serde(default = "default_true")]
    pub create: bool,
    #[serde(default)]
    pub arn: Option<String>,
}

impl Default for CertificateSpec {
    fn default() -> Self {
        Self {
            create: true,
            arn: None,
        }
    }
}

impl CertificateSpec {
    /// ARN with empty strings treated as absent
    pub fn arn(&self) -> Option<&str> {
        self.arn.as_deref().filter(|arn| !arn.trim().is_empty())
    }
}

fn default_true() -> bool {
    true
}

/// One secret-store entry exposing several keys as environment variables
///
/// `variables` maps the key inside the secret to the injected variable name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretReference {
    pub arn: String,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

/// Task sizing; unset fields receive defaults during normalization
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpec {
    #[serde(default)]
    pub desired_count: Option<u32>,
    #[serde(default)]
    pub cpu: Option<u32>,
    #[serde(default, rename = "memoryLimitMiB", alias = "memory")]
    pub memory: Option<u32>,
    /// Run on discounted spot capacity with an on-demand fallback
    #[serde(default)]
    pub spot: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoscalingSpec {
    #[serde(default)]
    pub min_capacity: Option<u32>,
    #[serde(default)]
    pub max_capacity: Option<u32>,
    #[serde(default, rename = "cpuTargetUtilizationPercent", alias = "cpuTarget")]
    pub cpu_target: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerSpec {
    #[serde(default)]
    pub healthcheck_path: Option<String>,
}

/// Per-metric alarm override
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmOverride {
    #[serde(default, rename = "alarmThreshold", alias = "threshold")]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub evaluation_periods: Option<u32>,
    #[serde(default)]
    pub datapoints_to_alarm: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmSpec {
    #[serde(default)]
    pub cpu: Option<AlarmOverride>,
    #[serde(default)]
    pub memory: Option<AlarmOverride>,
    #[serde(default)]
    pub task_count: Option<AlarmOverride>,
}

/// Extra statement attached to the task role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyStatement {
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomTag {
    pub key: String,
    pub value: String,
}

/// Stage definition
///
/// Field names on the wire follow the `cdk.config.json` layout
/// (`route53`, `acm`, `secretsManager`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageConfig {
    #[serde(default)]
    pub aws: AwsAccount,
    #[serde(default)]
    pub vpc: NetworkRef,
    #[serde(default, rename = "route53")]
    pub dns: DnsSpec,
    #[serde(default, rename = "acm")]
    pub certificate: Option<CertificateSpec>,
    #[serde(default, rename = "secretsManager")]
    pub secrets: Vec<SecretReference>,
    /// Stage override merged over the global container spec
    #[serde(default)]
    pub container: Option<ContainerSpec>,
    #[serde(default)]
    pub task: TaskSpec,
    #[serde(default)]
    pub autoscaling: Option<AutoscalingSpec>,
    #[serde(default)]
    pub load_balancer: Option<LoadBalancerSpec>,
    #[serde(default, rename = "cloudWatchAlarm")]
    pub alarms: Option<AlarmSpec>,
    #[serde(default)]
    pub extra_policies: Vec<PolicyStatement>,
    #[serde(default, rename = "customTags")]
    pub custom_tag: Option<CustomTag>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_certificate_defaults_to_create() {
        let spec = CertificateSpec::default();
        assert!(spec.create);
        assert!(spec.arn().is_none());
    }

    #[test]
    fn test_certificate_blank_arn_is_absent() {
        let spec = CertificateSpec {
            create: false,
            arn: Some("  ".to_string()),
        };
        assert!(spec.arn().is_none());
    }
}
