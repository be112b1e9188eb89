use crate::groups;

/// All configuration sections. Built once by the caller and handed down explicitly.
#[derive(Debug, Clone, Default)]
pub struct ZsyncConfig {
    pub client: groups::client::ConfigValues,
    pub reconstruction: groups::reconstruction::ConfigValues,
    pub planner: groups::planner::ConfigValues,
    pub log: groups::log::ConfigValues,
}

impl ZsyncConfig {
    /// Defaults with environment overrides applied.
    pub fn new() -> Self {
        Self::default().with_env_overrides()
    }

    /// Environment variables follow the pattern `ZSYNC_{GROUP_NAME}_{FIELD_NAME}`.
    pub fn with_env_overrides(mut self) -> Self {
        self.client.apply_env_overrides();
        self.reconstruction.apply_env_overrides();
        self.planner.apply_env_overrides();
        self.log.apply_env_overrides();
        self
    }
}
