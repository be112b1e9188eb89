pub mod macros;
pub mod zsync_config;

pub mod groups;
mod policy;

pub use policy::IntegrityPolicy;
pub use utils::configuration_utils::ParsableConfigValue;
pub use zsync_config::ZsyncConfig;

/// Prefix of every environment variable read by the configuration groups.
pub const ENV_PREFIX: &str = "ZSYNC_";

pub type ClientConfig = groups::client::ConfigValues;
pub type ReconstructionConfig = groups::reconstruction::ConfigValues;
pub type PlannerConfig = groups::planner::ConfigValues;
pub type LogConfig = groups::log::ConfigValues;
