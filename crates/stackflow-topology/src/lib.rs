//! stackflow topology compiler
//!
//! Turns a [`NormalizedConfig`] into a [`DeploymentPlan`]: an ordered graph of
//! resource nodes for an internet-facing container service (network, load
//! balancing, compute, DNS, autoscaling, alarms).
//!
//! The compiler is pure. Existing resources are resolved through a
//! [`ResourceLookup`] and the output is either a complete plan or an error.

pub mod alarms;
pub mod autoscaling;
pub mod builder;
pub mod certificate;
pub mod error;
pub mod plan;
pub mod secrets;
pub mod tagging;

pub use builder::{Topology, TopologyBuilder};
pub use certificate::{CertificateDecision, Protocol};
pub use error::{Result, TopologyError};
pub use plan::DeploymentPlan;
pub use secrets::{SecretBinding, SecretSource, map_secrets};

use stackflow_cloud::ResourceLookup;
use stackflow_core::{BuildContext, ConfigResolver, DeployConfig, NormalizedConfig};
use tracing::{info, instrument};

/// Resolves the stage and compiles it
pub fn compile<L: ResourceLookup + ?Sized>(
    config: &DeployConfig,
    ctx: &BuildContext,
    lookup: &L,
) -> Result<DeploymentPlan> {
    let normalized = ConfigResolver::new(config).resolve(ctx)?;
    build_plan(&normalized, lookup)
}

/// Compiles an already normalized configuration
#[instrument(skip_all, fields(stack = %config.stack_name, stage = %config.stage))]
pub fn build_plan<L: ResourceLookup + ?Sized>(
    config: &NormalizedConfig,
    lookup: &L,
) -> Result<DeploymentPlan> {
    let Topology {
        mut graph,
        certificate,
        secrets,
        service,
        load_balancer,
        ..
    } = TopologyBuilder::new(config, lookup).build()?;

    autoscaling::attach(&mut graph, &config.autoscaling, &service)?;
    alarms::attach(&mut graph, config, &service)?;
    alarms::attach_dashboard(&mut graph, &service, &load_balancer)?;

    let tags = tagging::tag_set(config);
    tagging::apply(&mut graph, &tags);

    let plan = DeploymentPlan {
        stack_name: config.stack_name.clone(),
        app_name: config.app_name.clone(),
        stage: config.stage.clone(),
        strategy: config.strategy,
        certificate,
        secrets,
        tags,
        nodes: graph.into_nodes(),
    };

    info!(summary = %plan.summary(), "Deployment plan compiled");
    Ok(plan)
}
