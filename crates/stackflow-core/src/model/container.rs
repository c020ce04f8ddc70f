//! Container definition

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Container image source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSpec {
    /// Registry URI without tag (e.g. `public.ecr.aws/acme/api`)
    #[serde(default)]
    pub uri: String,
    /// Explicit version tag; falls back to the revision, then `latest`
    #[serde(default)]
    pub version: Option<String>,
}

/// Container definition
///
/// KDL:
/// ```kdl
/// container {
///     port 8080
///     image "public.ecr.aws/acme/api" version="1.4.2"
///     build-args {
///         NODE_ENV "production"
///     }
///     env {
///         LOG_LEVEL "info"
///     }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSpec {
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub image: Option<ImageSpec>,
    #[serde(default)]
    pub build_args: BTreeMap<String, String>,
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

impl ContainerSpec {
    /// Merges a stage-level override into this spec.
    ///
    /// Present fields of `other` win; maps are merged key-wise with `other`
    /// taking precedence.
    pub fn merge(&mut self, other: ContainerSpec) {
        if other.port.is_some() {
            self.port = other.port;
        }
        if let Some(image) = other.image {
            match &mut self.image {
                Some(existing) => {
                    if !image.uri.is_empty() {
                        existing.uri = image.uri;
                    }
                    if image.version.is_some() {
                        existing.version = image.version;
                    }
                }
                None => self.image = Some(image),
            }
        }

        for (key, value) in other.build_args {
            self.build_args.insert(key, value);
        }
        for (key, value) in other.environment {
            self.environment.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ContainerSpec {
        ContainerSpec {
            port: Some(80),
            image: Some(ImageSpec {
                uri: "public.ecr.aws/acme/api".to_string(),
                version: None,
            }),
            build_args: [("NODE_ENV".to_string(), "production".to_string())]
                .into_iter()
                .collect(),
            environment: BTreeMap::new(),
        }
    }

    #[test]
    fn test_merge_overrides_present_fields() {
        let mut spec = base();
        spec.merge(ContainerSpec {
            port: Some(9000),
            image: Some(ImageSpec {
                uri: String::new(),
                version: Some("2.0.0".to_string()),
            }),
            ..Default::default()
        });

        assert_eq!(spec.port, Some(9000));
        let image = spec.image.unwrap();
        // uri untouched when the override leaves it empty
        assert_eq!(image.uri, "public.ecr.aws/acme/api");
        assert_eq!(image.version.as_deref(), Some("2.0.0"));
    }

    #[test]
    fn test_merge_maps_key_wise() {
        let mut spec = base();
        spec.merge(ContainerSpec {
            build_args: [
                ("NODE_ENV".to_string(), "staging".to_string()),
                ("FEATURE".to_string(), "on".to_string()),
            ]
            .into_iter()
            .collect(),
            ..Default::default()
        });

        assert_eq!(spec.port, Some(80));
        assert_eq!(spec.build_args.len(), 2);
        assert_eq!(spec.build_args["NODE_ENV"], "staging");
    }
}
