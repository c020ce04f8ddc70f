//! TLS certificate decision

use crate::error::{Result, TopologyError};
use serde::{Deserialize, Serialize};
use stackflow_cloud::HostedZoneInfo;
use stackflow_core::{CertificateSpec, ResolvedDns};

/// How the listener obtains its certificate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "kebab-case")]
pub enum CertificateDecision {
    /// Plain HTTP, no certificate
    None,
    Imported {
        arn: String,
    },
    /// DNS-validated certificate issued in the zone
    Created {
        domain: String,
        zone: HostedZoneInfo,
    },
}

/// Listener protocol implied by a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    pub fn port(&self) -> u16 {
        match self {
            Protocol::Http => 80,
            Protocol::Https => 443,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "HTTP",
            Protocol::Https => "HTTPS",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CertificateDecision {
    pub fn protocol(&self) -> Protocol {
        match self {
            CertificateDecision::None => Protocol::Http,
            _ => Protocol::Https,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, CertificateDecision::None)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CertificateDecision::None => "none",
            CertificateDecision::Imported { .. } => "imported",
            CertificateDecision::Created { .. } => "created",
        }
    }
}

/// Whether the settings fall through to issuing a new certificate
pub fn requires_creation(spec: &CertificateSpec) -> bool {
    spec.create && spec.arn().is_none()
}

/// Evaluates the three-way certificate decision
///
/// `zone` is the hosted zone resolved for `dns.domain`, if any.
pub fn decide(
    spec: &CertificateSpec,
    dns: &ResolvedDns,
    zone: Option<&HostedZoneInfo>,
) -> Result<CertificateDecision> {
    if !spec.create && spec.arn().is_none() {
        return Ok(CertificateDecision::None);
    }

    if let Some(arn) = spec.arn() {
        return Ok(CertificateDecision::Imported {
            arn: arn.to_string(),
        });
    }

    let Some(domain) = dns.full_domain.clone() else {
        return Err(TopologyError::MissingHostedZone(
            "certificate creation needs route53 hostname and domain".to_string(),
        ));
    };
    let zone = zone
        .cloned()
        .ok_or_else(|| TopologyError::MissingHostedZone(dns.domain.clone()))?;

    Ok(CertificateDecision::Created { domain, zone })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dns() -> ResolvedDns {
        ResolvedDns {
            enabled: true,
            domain: "example.com".to_string(),
            hostname: "api".to_string(),
            full_domain: Some("api.example.com".to_string()),
        }
    }

    fn zone() -> HostedZoneInfo {
        HostedZoneInfo {
            zone_id: "Z0123".to_string(),
            domain: "example.com".to_string(),
        }
    }

    #[test]
    fn test_no_create_and_empty_arn_is_none() {
        let spec = CertificateSpec {
            create: false,
            arn: Some(String::new()),
        };
        let decision = decide(&spec, &dns(), Some(&zone())).unwrap();
        assert_eq!(decision, CertificateDecision::None);
        assert_eq!(decision.protocol(), Protocol::Http);
        assert_eq!(decision.protocol().port(), 80);
    }

    #[test]
    fn test_arn_is_imported_regardless_of_create() {
        let arn = "arn:aws:acm:eu-west-1:123456789012:certificate/abc";
        for create in [true, false] {
            let spec = CertificateSpec {
                create,
                arn: Some(arn.to_string()),
            };
            let decision = decide(&spec, &dns(), None).unwrap();
            assert_eq!(
                decision,
                CertificateDecision::Imported {
                    arn: arn.to_string()
                }
            );
        }
    }

    #[test]
    fn test_create_with_zone() {
        let spec = CertificateSpec {
            create: true,
            arn: None,
        };
        let decision = decide(&spec, &dns(), Some(&zone())).unwrap();
        assert_eq!(
            decision,
            CertificateDecision::Created {
                domain: "api.example.com".to_string(),
                zone: zone(),
            }
        );
        assert_eq!(decision.protocol(), Protocol::Https);
    }

    #[test]
    fn test_create_without_zone_fails() {
        let spec = CertificateSpec::default();
        let result = decide(&spec, &dns(), None);
        assert!(matches!(result, Err(TopologyError::MissingHostedZone(_))));
    }

    #[test]
    fn test_create_without_domain_fails() {
        let dns = ResolvedDns {
            enabled: false,
            domain: String::new(),
            hostname: String::new(),
            full_domain: None,
        };
        let result = decide(&CertificateSpec::default(), &dns, Some(&zone()));
        assert!(matches!(result, Err(TopologyError::MissingHostedZone(_))));
    }

    #[test]
    fn test_requires_creation() {
        assert!(requires_creation(&CertificateSpec::default()));
        assert!(!requires_creation(&CertificateSpec {
            create: true,
            arn: Some("arn:aws:acm:x".to_string()),
        }));
        assert!(!requires_creation(&CertificateSpec {
            create: false,
            arn: None,
        }));
    }
}
