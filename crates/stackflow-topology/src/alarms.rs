//! Standard service alarms and the monitoring dashboard

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::json;
use stackflow_cloud::{NodeId, ResourceGraph, ResourceKind, ResourceNode};
use stackflow_core::{AlarmThreshold, NormalizedConfig};

/// Alarm comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    GreaterThanOrEqualToThreshold,
    LessThanThreshold,
}

/// Metric an alarm or graph watches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRef {
    pub namespace: String,
    pub metric_name: String,
    pub statistic: String,
    /// Node the metric dimensions come from
    pub source: String,
}

impl MetricRef {
    fn new(namespace: &str, metric_name: &str, statistic: &str, source: &NodeId) -> Self {
        Self {
            namespace: namespace.to_string(),
            metric_name: metric_name.to_string(),
            statistic: statistic.to_string(),
            source: source.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmDefinition {
    /// Logical node id
    pub id: String,
    pub alarm_name: String,
    pub metric: MetricRef,
    pub comparison: Comparison,
    pub threshold: f64,
    pub evaluation_periods: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datapoints_to_alarm: Option<u32>,
    pub description: String,
}

impl AlarmDefinition {
    fn new(
        metric_id: &str,
        config: &NormalizedConfig,
        metric: MetricRef,
        comparison: Comparison,
        settings: &AlarmThreshold,
        description: String,
    ) -> Self {
        Self {
            id: format!("Alarm{}", metric_id),
            alarm_name: format!("Alarm{}{}", config.stack_name, metric_id),
            metric,
            comparison,
            threshold: settings.threshold,
            evaluation_periods: settings.evaluation_periods,
            datapoints_to_alarm: settings.datapoints_to_alarm,
            description,
        }
    }
}

/// The three standard alarms, in a fixed order
pub fn standard_alarms(config: &NormalizedConfig, service: &NodeId) -> Vec<AlarmDefinition> {
    let alarms = &config.alarms;
    let app = &config.app_name;

    vec![
        AlarmDefinition::new(
            "CpuUtilization",
            config,
            MetricRef::new("AWS/ECS", "CPUUtilization", "Average", service),
            Comparison::GreaterThanOrEqualToThreshold,
            &alarms.cpu,
            format!(
                "Alarming CPU Utilization higher than {} for service {}",
                alarms.cpu.threshold, app
            ),
        ),
        AlarmDefinition::new(
            "MemoryUtilization",
            config,
            MetricRef::new("AWS/ECS", "MemoryUtilization", "Average", service),
            Comparison::GreaterThanOrEqualToThreshold,
            &alarms.memory,
            format!(
                "Alarming Memory Utilization higher than {} for service {}",
                alarms.memory.threshold, app
            ),
        ),
        AlarmDefinition::new(
            "RunningTaskCount",
            config,
            MetricRef::new("ECS/ContainerInsights", "RunningTaskCount", "Average", service),
            Comparison::LessThanThreshold,
            &alarms.task_count,
            format!(
                "Alarming Tasks running below {} for service {}",
                alarms.task_count.threshold, app
            ),
        ),
    ]
}

/// Adds the standard alarms after the service
pub fn attach(
    graph: &mut ResourceGraph,
    config: &NormalizedConfig,
    service: &NodeId,
) -> Result<Vec<NodeId>> {
    standard_alarms(config, service)
        .into_iter()
        .map(|alarm| -> Result<NodeId> {
            let mut node = ResourceNode::new(alarm.id, ResourceKind::Alarm)
                .depends_on(service)
                .with_property("alarmName", json!(alarm.alarm_name))
                .with_property("metric", json!(alarm.metric))
                .with_property("comparisonOperator", json!(alarm.comparison))
                .with_property("threshold", json!(alarm.threshold))
                .with_property("evaluationPeriods", json!(alarm.evaluation_periods))
                .with_property("alarmDescription", json!(alarm.description));
            if let Some(datapoints) = alarm.datapoints_to_alarm {
                node = node.with_property("datapointsToAlarm", json!(datapoints));
            }
            Ok(graph.add(node)?)
        })
        .collect()
}

const LOAD_BALANCER_MARKDOWN: &str = "# Load Balancer\n\
    metrics to monitor load balancer metrics:\n\
    * Amount of incoming requests\n\
    * Latency with an alarm if max accepted latency exceeded.";
const SERVICE_MARKDOWN: &str =
    "# ECS Service\nmetrics to monitor service metrics:\n* CPU Utilization\n* Memory Utilization";

const TEXT_WIDTH: u32 = 6;
const TEXT_HEIGHT: u32 = 6;
const GRAPH_WIDTH: u32 = 9;

/// Adds a two-row dashboard: load balancer traffic, then service utilization
pub fn attach_dashboard(
    graph: &mut ResourceGraph,
    service: &NodeId,
    load_balancer: &NodeId,
) -> Result<NodeId> {
    let rows = [
        (
            "LoadBalancer",
            LOAD_BALANCER_MARKDOWN,
            load_balancer,
            [
                (
                    "Requests",
                    MetricRef::new("AWS/ApplicationELB", "RequestCount", "Sum", load_balancer),
                ),
                (
                    "Latency",
                    MetricRef::new(
                        "AWS/ApplicationELB",
                        "TargetResponseTime",
                        "Average",
                        load_balancer,
                    ),
                ),
            ],
        ),
        (
            "Service",
            SERVICE_MARKDOWN,
            service,
            [
                (
                    "Cpu Utilization",
                    MetricRef::new("AWS/ECS", "CPUUtilization", "Average", service),
                ),
                (
                    "Memory Utilization",
                    MetricRef::new("AWS/ECS", "MemoryUtilization", "Average", service),
                ),
            ],
        ),
    ];

    let mut layout = Vec::new();
    let mut widgets = Vec::new();

    for (row, (name, markdown, source, graphs)) in rows.into_iter().enumerate() {
        let mut row_ids = Vec::new();

        let text = graph.add(
            ResourceNode::new(format!("Dashboard{}Text", name), ResourceKind::DashboardWidget)
                .depends_on(source)
                .with_property("type", json!("text"))
                .with_property("row", json!(row))
                .with_property("markdown", json!(markdown))
                .with_property("width", json!(TEXT_WIDTH))
                .with_property("height", json!(TEXT_HEIGHT)),
        )?;
        row_ids.push(text.to_string());
        widgets.push(text);

        for (title, metric) in graphs {
            let id = format!("Dashboard{}Graph", title.replace(' ', ""));
            let widget = graph.add(
                ResourceNode::new(id, ResourceKind::DashboardWidget)
                    .depends_on(source)
                    .with_property("type", json!("graph"))
                    .with_property("row", json!(row))
                    .with_property("title", json!(title))
                    .with_property("width", json!(GRAPH_WIDTH))
                    .with_property("left", json!([metric])),
            )?;
            row_ids.push(widget.to_string());
            widgets.push(widget);
        }

        layout.push(row_ids);
    }

    let mut dashboard = ResourceNode::new("Dashboard", ResourceKind::Dashboard)
        .with_property("rows", json!(layout));
    for widget in &widgets {
        dashboard = dashboard.depends_on(widget);
    }
    Ok(graph.add(dashboard)?)
}
