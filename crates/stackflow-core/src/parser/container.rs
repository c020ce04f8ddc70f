//! container node parsing

use super::{first_string, prop, prop_string, string_map, value_u32};
use crate::error::{Result, StackError};
use crate::model::{ContainerSpec, ImageSpec};
use kdl::KdlNode;

pub fn parse_container(node: &KdlNode) -> Result<ContainerSpec> {
    let mut container = ContainerSpec::default();

    if let Some(port) = prop(node, "port") {
        container.port = Some(port_value(node, port)?);
    }

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "port" => {
                    let value = child.entries().first().map(|e| e.value()).ok_or_else(|| {
                        StackError::ConfigValidation("container.port requires a value".to_string())
                    })?;
                    container.port = Some(port_value(child, value)?);
                }
                "image" => {
                    let uri = first_string(child)
                        .or_else(|| prop_string(child, "uri"))
                        .unwrap_or_default();
                    container.image = Some(ImageSpec {
                        uri,
                        version: prop_string(child, "version"),
                    });
                }
                "build-args" | "build_args" => {
                    container.build_args = string_map(child);
                }
                "env" | "environment" => {
                    container.environment = string_map(child);
                }
                _ => {}
            }
        }
    }

    Ok(container)
}

fn port_value(node: &KdlNode, value: &kdl::KdlValue) -> Result<u16> {
    let port = value_u32(node, "port", value)?;
    u16::try_from(port)
        .ok()
        .filter(|p| *p > 0)
        .ok_or_else(|| StackError::ConfigValidation(format!("invalid container port: {}", port)))
}
