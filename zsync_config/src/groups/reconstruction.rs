use utils::ByteSize;

use crate::IntegrityPolicy;

crate::config_group!({

    /// Size of each read from a range response body; progress is reported after every chunk.
    ///
    /// The default value is 64kb.
    ///
    /// Use the environment variable `ZSYNC_RECONSTRUCTION_DOWNLOAD_CHUNK_SIZE` to set this value.
    ref download_chunk_size: ByteSize = ByteSize::from("64kb");

    /// When replacing the seed in place, the staged result is held in memory up to this size and
    /// spills to a temporary file beyond it.
    ///
    /// The default value is 64mb.
    ///
    /// Use the environment variable `ZSYNC_RECONSTRUCTION_STAGING_MEMORY_LIMIT` to set this value.
    ref staging_memory_limit: ByteSize = ByteSize::from("64mb");

    /// Either "advisory" (keep a mismatching output, fail the run) or "strict" (discard it).
    ///
    /// The default value is advisory.
    ///
    /// Use the environment variable `ZSYNC_RECONSTRUCTION_INTEGRITY_POLICY` to set this value.
    ref integrity_policy: IntegrityPolicy = IntegrityPolicy::Advisory;

    /// Set the modification time of the output to the descriptor's MTime, if it has one.
    ///
    /// The default value is true.
    ///
    /// Use the environment variable `ZSYNC_RECONSTRUCTION_PRESERVE_MTIME` to set this value.
    ref preserve_mtime: bool = true;
});
