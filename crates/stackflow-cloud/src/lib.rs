//! stackflow cloud resource model
//!
//! Provider-neutral description of the resources a deployment needs, and the
//! seam through which existing resources (networks, hosted zones, secrets)
//! are looked up.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │               stackflow-topology                 │
//! │        (compiles NormalizedConfig → plan)        │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                stackflow-cloud                   │
//! │  ┌──────────────────┐  ┌─────────────────────┐  │
//! │  │  ResourceGraph   │  │ trait ResourceLookup│  │
//! │  │  ResourceNode    │  │   LookupContext     │  │
//! │  └──────────────────┘  └──────────┬──────────┘  │
//! └───────────────────────────────────┼─────────────┘
//!                                     │
//!                     ┌───────────────▼───────────────┐
//!                     │ .stackflow/context.json cache │
//!                     └───────────────────────────────┘
//! ```

pub mod context;
pub mod error;
pub mod graph;
pub mod lookup;

// Re-exports
pub use context::{ContextStore, LookupContext};
pub use error::{CloudError, Result};
pub use graph::{GraphSummary, NodeId, ResourceGraph, ResourceKind, ResourceNode};
pub use lookup::{HostedZoneInfo, NetworkInfo, NetworkQuery, ResourceLookup, SecretInfo};
