//! Configuration normalization
//!
//! Merges the global and stage sections, validates invariants, applies every
//! default, and derives the computed names (stack name, full domain, image
//! reference). The output is immutable and carries no optional fields that
//! later stages would have to default again.

use crate::defaults;
use crate::error::{Result, StackError};
use crate::model::{
    AlarmOverride, AwsAccount, BuildStrategy, CertificateSpec, CustomTag, DeployConfig,
    PolicyStatement, SecretReference, StageConfig,
};
use crate::naming::{capitalize_first_letter, to_camel};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Process-level inputs supplied by the bootstrap layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    /// Selected stage name (e.g. `prod`, `preview`)
    pub stage: String,
    /// Build revision; only meaningful for the preview stage naming
    pub revision: Option<String>,
}

impl BuildContext {
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            revision: None,
        }
    }

    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        let revision = revision.into();
        self.revision = (!revision.trim().is_empty()).then_some(revision);
        self
    }

    pub fn is_preview(&self) -> bool {
        self.stage == defaults::PREVIEW_STAGE
    }
}

/// How the network is looked up
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum NetworkSelector {
    Id(String),
    Name(String),
}

impl std::fmt::Display for NetworkSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkSelector::Id(id) => write!(f, "id={}", id),
            NetworkSelector::Name(name) => write!(f, "name={}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDns {
    pub enabled: bool,
    pub domain: String,
    /// Hostname with the preview revision suffix already applied
    pub hostname: String,
    /// `hostname.domain`, when both parts are known
    pub full_domain: Option<String>,
}

/// Fully resolved image reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    pub uri: String,
    pub tag: String,
}

impl ImageRef {
    pub fn reference(&self) -> String {
        format!("{}:{}", self.uri, self.tag)
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.uri, self.tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedContainer {
    pub port: u16,
    pub image: ImageRef,
    pub build_args: BTreeMap<String, String>,
    pub environment: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedTask {
    pub desired_count: u32,
    pub cpu: u32,
    pub memory: u32,
    pub spot: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedAutoscaling {
    pub min_capacity: u32,
    pub max_capacity: u32,
    pub cpu_target: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlarmThreshold {
    pub threshold: f64,
    pub evaluation_periods: u32,
    pub datapoints_to_alarm: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedAlarms {
    pub cpu: AlarmThreshold,
    pub memory: AlarmThreshold,
    pub task_count: AlarmThreshold,
}

/// Fully defaulted configuration for one stage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedConfig {
    /// Canonical application name (e.g. `MyApi`)
    pub app_name: String,
    pub stage: String,
    pub revision: Option<String>,
    pub stack_name: String,
    pub strategy: BuildStrategy,
    pub aws: AwsAccount,
    pub network: NetworkSelector,
    pub dns: ResolvedDns,
    pub certificate: CertificateSpec,
    pub secrets: Vec<SecretReference>,
    pub container: ResolvedContainer,
    pub task: ResolvedTask,
    pub autoscaling: ResolvedAutoscaling,
    pub healthcheck_path: String,
    pub alarms: ResolvedAlarms,
    pub extra_policies: Vec<PolicyStatement>,
    pub custom_tag: Option<CustomTag>,
}

/// Single normalization pass over a [`DeployConfig`]
pub struct ConfigResolver<'a> {
    config: &'a DeployConfig,
}

impl<'a> ConfigResolver<'a> {
    pub fn new(config: &'a DeployConfig) -> Self {
        Self { config }
    }

    #[instrument(skip(self), fields(app = %self.config.app))]
    pub fn resolve(&self, ctx: &BuildContext) -> Result<NormalizedConfig> {
        let stage = self
            .config
            .stage(&ctx.stage)
            .ok_or_else(|| StackError::StageNotFound(ctx.stage.clone()))?;

        if ctx.is_preview() && ctx.revision.is_none() {
            return Err(StackError::ConfigValidation(format!(
                "stage '{}' requires a revision",
                ctx.stage
            )));
        }

        let strategy = self.config.strategy;
        let app_name = app_name(&self.config.app);
        let stack_name = stack_name(&app_name, ctx);
        debug!(%stack_name, %strategy, "Derived stack name");

        let network = resolve_network(stage)?;
        let dns = resolve_dns(stage, ctx)?;
        let container = self.resolve_container(stage, ctx)?;
        let task = resolve_task(stage)?;
        let autoscaling = resolve_autoscaling(stage, strategy)?;
        let alarms = resolve_alarms(stage, &autoscaling)?;

        let healthcheck_path = stage
            .load_balancer
            .as_ref()
            .and_then(|lb| lb.healthcheck_path.clone())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| defaults::HEALTHCHECK_PATH.to_string());

        let certificate = stage.certificate.clone().unwrap_or_default();
        let certificate = CertificateSpec {
            create: certificate.create,
            arn: certificate.arn().map(|s| s.to_string()),
        };

        Ok(NormalizedConfig {
            app_name,
            stage: ctx.stage.clone(),
            revision: ctx.revision.clone(),
            stack_name,
            strategy,
            aws: stage.aws.clone(),
            network,
            dns,
            certificate,
            secrets: stage.secrets.clone(),
            container,
            task,
            autoscaling,
            healthcheck_path,
            alarms,
            extra_policies: stage.extra_policies.clone(),
            custom_tag: stage.custom_tag.clone(),
        })
    }

    fn resolve_container(
        &self,
        stage: &StageConfig,
        ctx: &BuildContext,
    ) -> Result<ResolvedContainer> {
        let mut spec = self.config.container.clone();
        if let Some(over) = &stage.container {
            spec.merge(over.clone());
        }

        let image = spec
            .image
            .filter(|image| !image.uri.trim().is_empty())
            .ok_or_else(|| {
                StackError::ConfigValidation("container image uri is required".to_string())
            })?;

        let tag = image
            .version
            .filter(|v| !v.is_empty())
            .or_else(|| ctx.revision.clone())
            .unwrap_or_else(|| defaults::IMAGE_TAG.to_string());

        Ok(ResolvedContainer {
            port: spec.port.unwrap_or(defaults::CONTAINER_PORT),
            image: ImageRef {
                uri: image.uri,
                tag,
            },
            build_args: spec.build_args,
            environment: spec.environment,
        })
    }
}

/// `capitalize(to_camel(name))`, e.g. `my-api` -> `MyApi`
pub fn app_name(raw: &str) -> String {
    capitalize_first_letter(&to_camel(raw))
}

/// `EcsApp{App}{Stage}{Revision?}Stack`; the revision only for preview stages
pub fn stack_name(app_name: &str, ctx: &BuildContext) -> String {
    let revision = if ctx.is_preview() {
        ctx.revision.as_deref().unwrap_or("")
    } else {
        ""
    };
    let name = format!(
        "{}{}{}",
        app_name,
        capitalize_first_letter(&ctx.stage),
        revision
    );
    to_camel(&format!("Ecs-App-{}-Stack", name))
}

fn resolve_network(stage: &StageConfig) -> Result<NetworkSelector> {
    let id = stage.vpc.id.as_deref().filter(|s| !s.trim().is_empty());
    let name = stage.vpc.name.as_deref().filter(|s| !s.trim().is_empty());

    match (id, name) {
        (Some(id), _) => Ok(NetworkSelector::Id(id.to_string())),
        (None, Some(name)) => Ok(NetworkSelector::Name(name.to_string())),
        (None, None) => Err(StackError::ConfigValidation(
            "either vpc id or vpc name must be set".to_string(),
        )),
    }
}

fn resolve_dns(stage: &StageConfig, ctx: &BuildContext) -> Result<ResolvedDns> {
    let spec = &stage.dns;

    if spec.enable && (spec.hostname.trim().is_empty() || spec.domain.trim().is_empty()) {
        return Err(StackError::ConfigValidation(
            "route53 is enabled but hostname or domain is empty".to_string(),
        ));
    }

    let hostname = match (&ctx.revision, ctx.is_preview()) {
        (Some(revision), true) if !spec.hostname.is_empty() => {
            format!("{}-{}", spec.hostname, revision)
        }
        _ => spec.hostname.clone(),
    };

    let full_domain = (!hostname.is_empty() && !spec.domain.is_empty())
        .then(|| format!("{}.{}", hostname, spec.domain));

    Ok(ResolvedDns {
        enabled: spec.enable,
        domain: spec.domain.clone(),
        hostname,
        full_domain,
    })
}

fn resolve_task(stage: &StageConfig) -> Result<ResolvedTask> {
    let task = &stage.task;
    Ok(ResolvedTask {
        desired_count: positive("task.desired_count", task.desired_count)?
            .unwrap_or(defaults::DESIRED_COUNT),
        cpu: positive("task.cpu", task.cpu)?.unwrap_or(defaults::CPU_UNITS),
        memory: positive("task.memory", task.memory)?.unwrap_or(defaults::MEMORY_MIB),
        spot: task.spot,
    })
}

fn resolve_autoscaling(
    stage: &StageConfig,
    strategy: BuildStrategy,
) -> Result<ResolvedAutoscaling> {
    let spec = stage.autoscaling.clone().unwrap_or_default();

    let min_capacity = spec.min_capacity.unwrap_or(defaults::MIN_CAPACITY);
    let max_capacity = positive("autoscaling.max_capacity", spec.max_capacity)?
        .unwrap_or_else(|| defaults::max_capacity(strategy));
    let cpu_target = spec.cpu_target.unwrap_or(defaults::CPU_TARGET_PERCENT);

    if min_capacity > max_capacity {
        return Err(StackError::AutoscalingBounds {
            min: min_capacity,
            max: max_capacity,
        });
    }
    if cpu_target == 0 || cpu_target > 100 {
        return Err(StackError::ConfigValidation(format!(
            "autoscaling cpu target must be within 1..=100, got {}",
            cpu_target
        )));
    }

    Ok(ResolvedAutoscaling {
        min_capacity,
        max_capacity,
        cpu_target,
    })
}

fn resolve_alarms(
    stage: &StageConfig,
    autoscaling: &ResolvedAutoscaling,
) -> Result<ResolvedAlarms> {
    let spec = stage.alarms.clone().unwrap_or_default();

    Ok(ResolvedAlarms {
        cpu: alarm_threshold("cpu", spec.cpu.as_ref(), defaults::CPU_ALARM_THRESHOLD)?,
        memory: alarm_threshold(
            "memory",
            spec.memory.as_ref(),
            defaults::MEMORY_ALARM_THRESHOLD,
        )?,
        task_count: alarm_threshold(
            "task_count",
            spec.task_count.as_ref(),
            f64::from(autoscaling.min_capacity),
        )?,
    })
}

fn alarm_threshold(
    metric: &str,
    spec: Option<&AlarmOverride>,
    default_threshold: f64,
) -> Result<AlarmThreshold> {
    let evaluation_periods = positive(
        &format!("alarms.{}.evaluation_periods", metric),
        spec.and_then(|s| s.evaluation_periods),
    )?
    .unwrap_or(defaults::EVALUATION_PERIODS);

    Ok(AlarmThreshold {
        threshold: spec.and_then(|s| s.threshold).unwrap_or(default_threshold),
        evaluation_periods,
        datapoints_to_alarm: spec.and_then(|s| s.datapoints_to_alarm),
    })
}

fn positive(field: &str, value: Option<u32>) -> Result<Option<u32>> {
    match value {
        Some(0) => Err(StackError::ConfigValidation(format!(
            "{} must be positive when set",
            field
        ))),
        other => Ok(other),
    }
}
