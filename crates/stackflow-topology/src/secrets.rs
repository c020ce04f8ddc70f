//! Secret-to-environment mapping

use crate::error::{Result, TopologyError};
use serde::{Deserialize, Serialize};
use stackflow_core::SecretReference;
use std::collections::BTreeMap;

/// Secret entry a variable is read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretSource {
    pub arn: String,
    pub key: String,
}

/// Environment variable name to secret entry
pub type SecretBinding = BTreeMap<String, SecretSource>;

/// Flattens secret references into a binding keyed by variable name
///
/// Binding the same variable twice to the same entry is accepted; binding it
/// to a different entry is an error.
pub fn map_secrets(references: &[SecretReference]) -> Result<SecretBinding> {
    let mut binding = SecretBinding::new();

    for reference in references {
        for (key, variable) in &reference.variables {
            let source = SecretSource {
                arn: reference.arn.clone(),
                key: key.clone(),
            };

            match binding.get(variable) {
                Some(existing) if *existing != source => {
                    return Err(TopologyError::DuplicateSecretVariable {
                        variable: variable.clone(),
                        existing_arn: existing.arn.clone(),
                        existing_key: existing.key.clone(),
                        arn: source.arn,
                        key: source.key,
                    });
                }
                Some(_) => {}
                None => {
                    binding.insert(variable.clone(), source);
                }
            }
        }
    }

    Ok(binding)
}
