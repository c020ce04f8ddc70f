//! stackflow core
//!
//! Deployment configuration model and the normalization pass that turns a
//! raw per-stage configuration into a fully defaulted [`NormalizedConfig`].
//!
//! ```text
//! stack.kdl / cdk.config.json
//!         │  parser
//!         ▼
//!   DeployConfig ──(BuildContext: stage, revision)──► ConfigResolver
//!                                                        │
//!                                                        ▼
//!                                                 NormalizedConfig
//! ```

pub mod defaults;
pub mod error;
pub mod model;
pub mod naming;
pub mod parser;
pub mod resolver;

pub use error::{Result, StackError};
pub use model::*;
pub use naming::{capitalize_first_letter, slice_word, to_camel};
pub use parser::{load_config_file, parse_json_string, parse_kdl_string};
pub use resolver::{
    AlarmThreshold, BuildContext, ConfigResolver, ImageRef, NetworkSelector, NormalizedConfig,
    ResolvedAlarms, ResolvedAutoscaling, ResolvedContainer, ResolvedDns, ResolvedTask,
};
