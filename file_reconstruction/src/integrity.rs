use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha1::{Digest, Sha1};
use tracing::{debug, warn};

use crate::error::Result;

/// Lowercase hex SHA-1 of everything remaining in `reader`.
pub fn sha1_hex_reader(mut reader: impl Read) -> Result<String> {
    let mut hasher = Sha1::new();
    std::io::copy(&mut reader, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

pub fn sha1_hex_file(path: impl AsRef<Path>) -> Result<String> {
    sha1_hex_reader(File::open(path)?)
}

/// Returns whether the SHA-1 of the file at `path` is `expected`.
///
/// The comparison is exact: `expected` must be lowercase hex, as digests in descriptors are.
pub fn verify_file(path: impl AsRef<Path>, expected: &str) -> Result<bool> {
    let path = path.as_ref();
    let actual = sha1_hex_file(path)?;

    if actual == expected {
        debug!(path = %path.display(), sha1 = %actual, "SHA-1 verified");
        Ok(true)
    } else {
        warn!(path = %path.display(), expected, actual = %actual, "SHA-1 mismatch");
        Ok(false)
    }
}
