//! Default values applied by the normalization pass
//!
//! Nothing outside [`crate::resolver`] should fall back to these inline.

use crate::model::BuildStrategy;

pub const DESIRED_COUNT: u32 = 1;
pub const CPU_UNITS: u32 = 256;
pub const MEMORY_MIB: u32 = 512;
pub const CONTAINER_PORT: u16 = 80;
pub const HEALTHCHECK_PATH: &str = "/";
pub const IMAGE_TAG: &str = "latest";

pub const MIN_CAPACITY: u32 = 1;
/// Upper scaling bound for the managed-pattern strategy.
pub const MANAGED_MAX_CAPACITY: u32 = 8;
/// Upper scaling bound for the explicit-assembly strategy.
pub const EXPLICIT_MAX_CAPACITY: u32 = 4;
pub const CPU_TARGET_PERCENT: u32 = 80;

pub const CPU_ALARM_THRESHOLD: f64 = 60.0;
pub const MEMORY_ALARM_THRESHOLD: f64 = 75.0;
pub const EVALUATION_PERIODS: u32 = 1;

/// Stage whose names, hostnames and images carry the build revision.
pub const PREVIEW_STAGE: &str = "preview";

pub fn max_capacity(strategy: BuildStrategy) -> u32 {
    match strategy {
        BuildStrategy::Managed => MANAGED_MAX_CAPACITY,
        BuildStrategy::Explicit => EXPLICIT_MAX_CAPACITY,
    }
}
