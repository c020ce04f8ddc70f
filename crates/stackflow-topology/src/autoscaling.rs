//! Service autoscaling

use crate::error::Result;
use serde_json::json;
use stackflow_cloud::{NodeId, ResourceGraph, ResourceKind, ResourceNode};
use stackflow_core::ResolvedAutoscaling;

pub const SCALABLE_TARGET: &str = "ScalableTarget";
pub const CPU_SCALING: &str = "CpuScaling";

/// Adds the scalable target and the CPU target-tracking policy
pub fn attach(
    graph: &mut ResourceGraph,
    autoscaling: &ResolvedAutoscaling,
    service: &NodeId,
) -> Result<NodeId> {
    let target = graph.add(
        ResourceNode::new(SCALABLE_TARGET, ResourceKind::ScalableTarget)
            .depends_on(service)
            .with_property("serviceNamespace", json!("ecs"))
            .with_property("scalableDimension", json!("ecs:service:DesiredCount"))
            .with_property("minCapacity", json!(autoscaling.min_capacity))
            .with_property("maxCapacity", json!(autoscaling.max_capacity)),
    )?;

    graph.add(
        ResourceNode::new(CPU_SCALING, ResourceKind::ScalingPolicy)
            .depends_on(&target)
            .with_property("policyType", json!("TargetTrackingScaling"))
            .with_property("predefinedMetric", json!("ECSServiceAverageCPUUtilization"))
            .with_property("targetValue", json!(autoscaling.cpu_target)),
    )?;

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_after_service() {
        let mut graph = ResourceGraph::new();
        let service = graph
            .add(ResourceNode::new("Service", ResourceKind::Service))
            .unwrap();

        let autoscaling = ResolvedAutoscaling {
            min_capacity: 2,
            max_capacity: 6,
            cpu_target: 70,
        };
        let target = attach(&mut graph, &autoscaling, &service).unwrap();

        let node = graph.get(&target).unwrap();
        assert_eq!(node.get_property::<u32>("minCapacity"), Some(2));
        assert_eq!(node.get_property::<u32>("maxCapacity"), Some(6));

        let policy = graph.get(&NodeId::new(CPU_SCALING)).unwrap();
        assert_eq!(policy.get_property::<u32>("targetValue"), Some(70));
        assert!(policy.depends_on.contains(&target));
    }

    #[test]
    fn test_attach_without_service_fails() {
        let mut graph = ResourceGraph::new();
        let autoscaling = ResolvedAutoscaling {
            min_capacity: 1,
            max_capacity: 8,
            cpu_target: 80,
        };
        assert!(attach(&mut graph, &autoscaling, &NodeId::new("Service")).is_err());
    }
}
