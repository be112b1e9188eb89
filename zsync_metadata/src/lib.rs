mod descriptor;
mod error;
mod url_resolver;

pub use descriptor::{HeaderValue, INTEGER_KEYS, MetadataDescriptor};
pub use error::{Result, ZsyncMetadataError};
pub use url_resolver::resolve_download_url;
