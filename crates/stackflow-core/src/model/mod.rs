//! Configuration model
//!
//! Raw, as-written deployment configuration. Every optional field stays
//! optional here; defaults are applied only by [`crate::resolver`].

mod container;
mod deploy;
mod stage;

pub use container::*;
pub use deploy::*;
pub use stage::*;
