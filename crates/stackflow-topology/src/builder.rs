//! Dependency-ordered topology construction
//!
//! One builder serves both build strategies. The explicit-assembly strategy
//! differs only in requiring TLS on 443 and in pushing the image to a private
//! registry before the task definition is created.

use crate::certificate::{self, CertificateDecision, Protocol};
use crate::error::{Result, TopologyError};
use crate::secrets::{self, SecretBinding};
use serde_json::{Value, json};
use stackflow_cloud::{
    CloudError, HostedZoneInfo, NetworkInfo, NetworkQuery, NodeId, ResourceGraph, ResourceKind,
    ResourceLookup, ResourceNode,
};
use stackflow_core::{BuildStrategy, NetworkSelector, NormalizedConfig};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

pub const DEREGISTRATION_DELAY_SECONDS: u32 = 60;
pub const SPOT_WEIGHT: u32 = 4;
pub const ON_DEMAND_WEIGHT: u32 = 1;

/// Logical ids of the nodes the builder emits
pub mod ids {
    pub const NETWORK: &str = "Vpc";
    pub const HOSTED_ZONE: &str = "HostedZone";
    pub const CERTIFICATE: &str = "Certificate";
    pub const LOAD_BALANCER: &str = "LoadBalancer";
    pub const TARGET_GROUP: &str = "TargetGroup";
    pub const LISTENER: &str = "Listener";
    pub const IMAGE_PUSH: &str = "ImagePush";
    pub const TASK_DEFINITION: &str = "TaskDefinition";
    pub const CLUSTER: &str = "Cluster";
    pub const SERVICE: &str = "Service";
    pub const DNS_RECORD: &str = "DnsRecord";
}

/// Graph produced by [`TopologyBuilder::build`] with the handles later
/// policies attach to
#[derive(Debug)]
pub struct Topology {
    pub graph: ResourceGraph,
    pub certificate: CertificateDecision,
    pub secrets: SecretBinding,
    pub service: NodeId,
    pub load_balancer: NodeId,
    pub target_group: NodeId,
}

struct LoadBalancing {
    load_balancer: NodeId,
    listener: NodeId,
    target_group: NodeId,
}

pub struct TopologyBuilder<'a, L: ResourceLookup + ?Sized> {
    config: &'a NormalizedConfig,
    lookup: &'a L,
    graph: ResourceGraph,
}

impl<'a, L: ResourceLookup + ?Sized> TopologyBuilder<'a, L> {
    pub fn new(config: &'a NormalizedConfig, lookup: &'a L) -> Self {
        Self {
            config,
            lookup,
            graph: ResourceGraph::new(),
        }
    }

    /// Runs the build steps in order; the first failure discards the graph
    #[instrument(
        skip_all,
        fields(stack = %self.config.stack_name, strategy = %self.config.strategy)
    )]
    pub fn build(mut self) -> Result<Topology> {
        let (network_id, network) = self.resolve_network()?;
        let zone = self.resolve_hosted_zone()?;
        let certificate = self.resolve_certificate(zone.as_ref())?;
        let lb = self.build_load_balancing(&network_id, &network, &certificate)?;

        let secrets = secrets::map_secrets(&self.config.secrets)?;
        let task_definition = self.build_task_definition(&secrets)?;

        let service = self.build_service(&network_id, &network, &task_definition)?;
        self.apply_capacity_strategy(&service)?;
        self.attach_to_load_balancer(&service, &lb)?;
        self.build_dns_record(zone.as_ref(), &lb.load_balancer)?;

        debug!(nodes = self.graph.len(), "Topology built");
        Ok(Topology {
            graph: self.graph,
            certificate,
            secrets,
            service,
            load_balancer: lb.load_balancer,
            target_group: lb.target_group,
        })
    }

    fn resolve_network(&mut self) -> Result<(NodeId, NetworkInfo)> {
        let query = match &self.config.network {
            NetworkSelector::Id(id) => NetworkQuery::Id(id.clone()),
            NetworkSelector::Name(name) => NetworkQuery::Name(name.clone()),
        };
        let network = self.lookup.lookup_network(&query)?;
        debug!(vpc = %network.id, "Resolved network");

        let id = self.graph.add(
            ResourceNode::new(ids::NETWORK, ResourceKind::Network)
                .with_property("vpcId", json!(network.id))
                .with_property("vpcName", json!(network.name))
                .with_property("privateSubnets", json!(network.private_subnets))
                .with_property("publicSubnets", json!(network.public_subnets)),
        )?;
        Ok((id, network))
    }

    fn resolve_hosted_zone(&mut self) -> Result<Option<HostedZoneInfo>> {
        let dns = &self.config.dns;
        if !dns.enabled && !certificate::requires_creation(&self.config.certificate) {
            return Ok(None);
        }

        let zone = self.lookup.lookup_hosted_zone(&dns.domain)?;
        match &zone {
            Some(zone) => {
                debug!(zone_id = %zone.zone_id, domain = %zone.domain, "Resolved hosted zone");
                self.graph.add(
                    ResourceNode::new(ids::HOSTED_ZONE, ResourceKind::HostedZone)
                        .with_property("zoneId", json!(zone.zone_id))
                        .with_property("zoneName", json!(zone.domain)),
                )?;
            }
            None if dns.enabled => {
                return Err(TopologyError::MissingHostedZone(dns.domain.clone()));
            }
            None => {}
        }
        Ok(zone)
    }

    fn resolve_certificate(
        &mut self,
        zone: Option<&HostedZoneInfo>,
    ) -> Result<CertificateDecision> {
        let decision = certificate::decide(&self.config.certificate, &self.config.dns, zone)?;

        if self.config.strategy == BuildStrategy::Explicit && decision.is_none() {
            return Err(TopologyError::ConfigValidation(
                "the explicit strategy terminates TLS on port 443 and needs a certificate \
                 (set acm.arn or acm.create)"
                    .to_string(),
            ));
        }
        debug!(decision = decision.kind(), "Certificate decided");

        match &decision {
            CertificateDecision::None => {}
            CertificateDecision::Imported { arn } => {
                self.graph.add(
                    ResourceNode::new(ids::CERTIFICATE, ResourceKind::Certificate)
                        .with_property("source", json!("imported"))
                        .with_property("certificateArn", json!(arn)),
                )?;
            }
            CertificateDecision::Created { domain, zone } => {
                self.graph.add(
                    ResourceNode::new(ids::CERTIFICATE, ResourceKind::Certificate)
                        .depends_on(&NodeId::new(ids::HOSTED_ZONE))
                        .with_property("source", json!("created"))
                        .with_property("domainName", json!(domain))
                        .with_property("validation", json!("DNS"))
                        .with_property("hostedZoneId", json!(zone.zone_id)),
                )?;
            }
        }
        Ok(decision)
    }

    fn build_load_balancing(
        &mut self,
        network_id: &NodeId,
        network: &NetworkInfo,
        decision: &CertificateDecision,
    ) -> Result<LoadBalancing> {
        let protocol = match self.config.strategy {
            BuildStrategy::Managed => decision.protocol(),
            BuildStrategy::Explicit => Protocol::Https,
        };
        let assembly = json!(self.config.strategy.as_str());

        let load_balancer = self.graph.add(
            ResourceNode::new(ids::LOAD_BALANCER, ResourceKind::LoadBalancer)
                .depends_on(network_id)
                .with_property("assembly", assembly.clone())
                .with_property("scheme", json!("internet-facing"))
                .with_property("subnets", json!(network.public_subnets)),
        )?;

        let target_group = self.graph.add(
            ResourceNode::new(ids::TARGET_GROUP, ResourceKind::TargetGroup)
                .depends_on(network_id)
                .with_property("assembly", assembly.clone())
                .with_property("protocol", json!(Protocol::Http))
                .with_property("port", json!(self.config.container.port))
                .with_property("targetType", json!("ip"))
                .with_property(
                    "healthCheck",
                    json!({ "path": self.config.healthcheck_path }),
                )
                .with_property(
                    "attributes",
                    json!({
                        "deregistration_delay.timeout_seconds":
                            DEREGISTRATION_DELAY_SECONDS.to_string()
                    }),
                ),
        )?;

        let mut listener = ResourceNode::new(ids::LISTENER, ResourceKind::Listener)
            .depends_on(&load_balancer)
            .depends_on(&target_group)
            .with_property("assembly", assembly)
            .with_property("protocol", json!(protocol))
            .with_property("port", json!(protocol.port()))
            .with_property(
                "defaultAction",
                json!({ "forward": target_group.as_str() }),
            );
        if !decision.is_none() {
            let certificate = NodeId::new(ids::CERTIFICATE);
            listener = listener
                .depends_on(&certificate)
                .with_property("certificate", json!(certificate.as_str()));
        }
        let listener = self.graph.add(listener)?;
        debug!(%protocol, port = protocol.port(), "Load balancing layer built");

        Ok(LoadBalancing {
            load_balancer,
            listener,
            target_group,
        })
    }

    fn build_task_definition(&mut self, binding: &SecretBinding) -> Result<NodeId> {
        let config = self.config;
        let mut dependencies = Vec::new();

        let mut image = config.container.image.reference();
        if config.strategy == BuildStrategy::Explicit {
            let destination = registry_destination(config);
            let push = self.graph.add(
                ResourceNode::new(ids::IMAGE_PUSH, ResourceKind::ImagePush)
                    .with_property("source", json!(image))
                    .with_property("destination", json!(destination))
                    .with_property("buildArgs", json!(config.container.build_args)),
            )?;
            dependencies.push(push);
            image = destination;
        }

        let mut secret_nodes: BTreeMap<&str, NodeId> = BTreeMap::new();
        for (index, reference) in config.secrets.iter().enumerate() {
            let info = self.lookup.lookup_secret(&reference.arn)?;
            let id = self.graph.add(
                ResourceNode::new(format!("Secret{}", index), ResourceKind::Secret)
                    .with_property("secretArn", json!(info.arn))
                    .with_property("secretName", json!(info.name)),
            )?;
            secret_nodes.entry(reference.arn.as_str()).or_insert_with(|| id.clone());
            dependencies.push(id);
        }

        let container_secrets: serde_json::Map<String, Value> = binding
            .iter()
            .map(|(variable, source)| {
                let node = secret_nodes
                    .get(source.arn.as_str())
                    .map(|id| id.as_str().to_string());
                (
                    variable.clone(),
                    json!({
                        "secret": node,
                        "key": source.key,
                        "valueFrom": format!("{}:{}::", source.arn, source.key),
                    }),
                )
            })
            .collect();

        let task_role_policy: Vec<Value> = config
            .extra_policies
            .iter()
            .map(|p| statement(&p.actions, &p.resources))
            .collect();

        let mut node = ResourceNode::new(ids::TASK_DEFINITION, ResourceKind::TaskDefinition)
            .with_property("family", json!(config.stack_name))
            .with_property("cpu", json!(config.task.cpu))
            .with_property("memoryLimitMiB", json!(config.task.memory))
            .with_property(
                "container",
                json!({
                    "name": config.app_name,
                    "image": image,
                    "containerPort": config.container.port,
                    "environment": config.container.environment,
                    "buildArgs": config.container.build_args,
                    "secrets": container_secrets,
                }),
            )
            .with_property(
                "executionRolePolicy",
                json!([statement(&["ecr:*".to_string()], &["*".to_string()])]),
            )
            .with_property("taskRolePolicy", json!(task_role_policy));
        for dependency in &dependencies {
            node = node.depends_on(dependency);
        }

        let id = self.graph.add(node)?;
        debug!(secrets = binding.len(), %image, "Task definition built");
        Ok(id)
    }

    fn build_service(
        &mut self,
        network_id: &NodeId,
        network: &NetworkInfo,
        task_definition: &NodeId,
    ) -> Result<NodeId> {
        let cluster = self.graph.add(
            ResourceNode::new(ids::CLUSTER, ResourceKind::Cluster)
                .depends_on(network_id)
                .with_property("vpcId", json!(network.id))
                .with_property("containerInsights", json!("enabled")),
        )?;

        let service = self.graph.add(
            ResourceNode::new(ids::SERVICE, ResourceKind::Service)
                .depends_on(network_id)
                .depends_on(&cluster)
                .depends_on(task_definition)
                .with_property("serviceName", json!(self.config.stack_name))
                .with_property("desiredCount", json!(self.config.task.desired_count))
                .with_property("launchType", json!("FARGATE"))
                .with_property(
                    "circuitBreaker",
                    json!({ "enable": true, "rollback": true }),
                )
                .with_property("enableEcsManagedTags", json!(true))
                .with_property("enableExecuteCommand", json!(true))
                .with_property("assignPublicIp", json!(false))
                .with_property("subnets", json!(network.private_subnets)),
        )?;
        Ok(service)
    }

    fn apply_capacity_strategy(&mut self, service: &NodeId) -> Result<()> {
        if !self.config.task.spot {
            return Ok(());
        }

        let node = self.node_mut(service)?;
        node.properties.remove("launchType");
        node.set_property(
            "capacityProviderStrategy",
            json!([
                { "capacityProvider": "FARGATE_SPOT", "weight": SPOT_WEIGHT },
                { "capacityProvider": "FARGATE", "weight": ON_DEMAND_WEIGHT }
            ]),
        );
        debug!("Spot capacity strategy selected");
        Ok(())
    }

    fn attach_to_load_balancer(&mut self, service: &NodeId, lb: &LoadBalancing) -> Result<()> {
        self.graph.link(service, &lb.target_group)?;
        self.graph.link(service, &lb.listener)?;

        let container_name = self.config.app_name.clone();
        let container_port = self.config.container.port;
        let target_group = lb.target_group.as_str().to_string();

        self.node_mut(service)?.set_property(
            "loadBalancers",
            json!([{
                "targetGroup": target_group,
                "containerName": container_name,
                "containerPort": container_port,
            }]),
        );
        Ok(())
    }

    fn build_dns_record(
        &mut self,
        zone: Option<&HostedZoneInfo>,
        load_balancer: &NodeId,
    ) -> Result<()> {
        let dns = &self.config.dns;
        if !dns.enabled {
            return Ok(());
        }

        let (Some(zone), Some(full_domain)) = (zone, dns.full_domain.as_ref()) else {
            return Err(TopologyError::MissingHostedZone(dns.domain.clone()));
        };

        self.graph.add(
            ResourceNode::new(ids::DNS_RECORD, ResourceKind::DnsRecord)
                .depends_on(&NodeId::new(ids::HOSTED_ZONE))
                .depends_on(load_balancer)
                .with_property("recordName", json!(full_domain))
                .with_property("recordType", json!("A"))
                .with_property("hostedZoneId", json!(zone.zone_id))
                .with_property("aliasTarget", json!(load_balancer.as_str())),
        )?;
        debug!(%full_domain, "DNS alias record built");
        Ok(())
    }

    fn node_mut(&mut self, id: &NodeId) -> Result<&mut ResourceNode> {
        self.graph
            .get_mut(id)
            .ok_or_else(|| CloudError::NodeNotFound(id.to_string()).into())
    }
}

/// IAM-style allow statement
pub(crate) fn statement(actions: &[String], resources: &[String]) -> Value {
    json!({
        "effect": "Allow",
        "actions": actions,
        "resources": resources,
    })
}

/// Private registry location the explicit strategy pushes the image to
fn registry_destination(config: &NormalizedConfig) -> String {
    format!(
        "{}.dkr.ecr.{}.amazonaws.com/{}:{}",
        config.aws.account,
        config.aws.region,
        config.app_name.to_lowercase(),
        config.container.image.tag
    )
}
