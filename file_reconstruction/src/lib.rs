mod data_writer;
mod error;
mod file_reconstructor;
mod integrity;
mod plan;
mod planner;
mod range_fetcher;

pub use data_writer::{DataOutput, OutputWriter};
pub use error::{FileReconstructionError, Result};
pub use file_reconstructor::{FileReconstructor, ReconstructionSummary};
pub use integrity::{sha1_hex_file, sha1_hex_reader, verify_file};
pub use plan::{DownloadRange, ReconstructionPlan, ReuseRange};
pub use planner::{CommandRangePlanner, RangePlanner, StaticRangePlanner};
pub use range_fetcher::{RangeFetcher, build_http_client};
