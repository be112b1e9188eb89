#![cfg_attr(feature = "strict", deny(warnings))]

pub mod byte_size;
pub use byte_size::ByteSize;

pub mod configuration_utils;
pub use configuration_utils::ParsableConfigValue;

mod file_paths;
pub use file_paths::{normalized_path_from_user_string, parent_dir_or_cwd};

mod guards;
pub use guards::EnvVarGuard;
