pub mod context;
pub mod plan;
pub mod validate;
