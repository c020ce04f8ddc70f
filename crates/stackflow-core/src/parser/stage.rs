//! stage node parsing

use super::container::parse_container;
use super::{
    first_string, positional_strings, prop_bool, prop_f64, prop_string, prop_u32, string_map,
};
use crate::error::{Result, StackError};
use crate::model::{
    AlarmOverride, AlarmSpec, AutoscalingSpec, AwsAccount, CertificateSpec, CustomTag, DnsSpec,
    LoadBalancerSpec, NetworkRef, PolicyStatement, SecretReference, StageConfig, TaskSpec,
};
use kdl::KdlNode;

/// Parses a `stage "name" { ... }` node
pub fn parse_stage(node: &KdlNode) -> Result<(String, StageConfig)> {
    let name = first_string(node)
        .ok_or_else(|| StackError::ConfigValidation("stage requires a name".to_string()))?;

    let mut stage = StageConfig::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "aws" => {
                    stage.aws = AwsAccount {
                        account: prop_string(child, "account").unwrap_or_default(),
                        region: prop_string(child, "region").unwrap_or_default(),
                        account_name: prop_string(child, "account-name")
                            .or_else(|| prop_string(child, "account_name")),
                    };
                }
                "vpc" | "network" => {
                    stage.vpc = NetworkRef {
                        id: prop_string(child, "id"),
                        name: prop_string(child, "name"),
                    };
                }
                "route53" | "dns" => {
                    let defaults = DnsSpec::default();
                    stage.dns = DnsSpec {
                        enable: prop_bool(child, "enable").unwrap_or(defaults.enable),
                        domain: prop_string(child, "domain").unwrap_or_default(),
                        hostname: prop_string(child, "hostname").unwrap_or_default(),
                    };
                }
                "acm" | "certificate" => {
                    let defaults = CertificateSpec::default();
                    stage.certificate = Some(CertificateSpec {
                        create: prop_bool(child, "create").unwrap_or(defaults.create),
                        arn: prop_string(child, "arn").or(defaults.arn),
                    });
                }
                "secret" => {
                    stage.secrets.push(parse_secret(child)?);
                }
                "container" => {
                    stage.container = Some(parse_container(child)?);
                }
                "task" => {
                    stage.task = TaskSpec {
                        desired_count: prop_u32(child, "desired-count")?,
                        cpu: prop_u32(child, "cpu")?,
                        memory: prop_u32(child, "memory")?,
                        spot: prop_bool(child, "spot").unwrap_or(false),
                    };
                }
                "autoscaling" => {
                    stage.autoscaling = Some(AutoscalingSpec {
                        min_capacity: prop_u32(child, "min")?,
                        max_capacity: prop_u32(child, "max")?,
                        cpu_target: prop_u32(child, "cpu-target")?,
                    });
                }
                "load-balancer" | "load_balancer" => {
                    stage.load_balancer = Some(LoadBalancerSpec {
                        healthcheck_path: prop_string(child, "healthcheck-path"),
                    });
                }
                "alarms" => {
                    stage.alarms = Some(parse_alarms(child)?);
                }
                "policy" => {
                    stage.extra_policies.push(parse_policy(child));
                }
                "tag" => {
                    stage.custom_tag = Some(parse_tag(child)?);
                }
                _ => {}
            }
        }
    }

    Ok((name, stage))
}

/// `secret "arn" { KEY "ENV_VAR" }`
fn parse_secret(node: &KdlNode) -> Result<SecretReference> {
    let arn = first_string(node)
        .or_else(|| prop_string(node, "arn"))
        .ok_or_else(|| StackError::ConfigValidation("secret requires an ARN".to_string()))?;

    Ok(SecretReference {
        arn,
        variables: string_map(node),
    })
}

fn parse_alarms(node: &KdlNode) -> Result<AlarmSpec> {
    let mut alarms = AlarmSpec::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            let alarm = AlarmOverride {
                threshold: prop_f64(child, "threshold"),
                evaluation_periods: prop_u32(child, "evaluation-periods")?,
                datapoints_to_alarm: prop_u32(child, "datapoints-to-alarm")?,
            };
            match child.name().value() {
                "cpu" => alarms.cpu = Some(alarm),
                "memory" => alarms.memory = Some(alarm),
                "task-count" | "task_count" => alarms.task_count = Some(alarm),
                other => {
                    return Err(StackError::ConfigValidation(format!(
                        "unknown alarm metric '{}' (expected cpu, memory or task-count)",
                        other
                    )));
                }
            }
        }
    }

    Ok(alarms)
}

fn parse_policy(node: &KdlNode) -> PolicyStatement {
    let mut policy = PolicyStatement::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "resources" | "resource" => policy.resources.extend(positional_strings(child)),
                "actions" | "action" => policy.actions.extend(positional_strings(child)),
                _ => {}
            }
        }
    }

    policy
}

/// `tag "Key" "value"` or `tag key="Key" value="value"`
fn parse_tag(node: &KdlNode) -> Result<CustomTag> {
    let positional = positional_strings(node);
    let key = prop_string(node, "key").or_else(|| positional.first().cloned());
    let value = prop_string(node, "value").or_else(|| positional.get(1).cloned());

    match (key, value) {
        (Some(key), Some(value)) if !key.is_empty() => Ok(CustomTag { key, value }),
        _ => Err(StackError::ConfigValidation(
            "tag requires a key and a value".to_string(),
        )),
    }
}
