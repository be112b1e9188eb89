use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tempfile::{NamedTempFile, SpooledTempFile};
use tracing::{debug, info};
use utils::parent_dir_or_cwd;

use super::DataOutput;
use crate::error::Result;
use crate::integrity::sha1_hex_reader;

enum Target {
    /// Writing straight into the output file.
    Direct { file: File },

    /// Collecting the output away from the seed; it replaces the seed on commit.
    Staged { buffer: SpooledTempFile },
}

/// Positioned writes into the output of a reconstruction run.
///
/// The output is sized to the target length when opened, so regions that are never written
/// read back as zeros.
pub struct OutputWriter {
    target: Target,
    path: PathBuf,
    length: u64,
}

impl OutputWriter {
    /// Opens the output for `output`. For an in-place rebuild `seed_path` is the file that will be
    /// replaced; in-memory staging spills to disk beyond `memory_limit` bytes.
    pub fn open(output: &DataOutput, seed_path: &Path, length: u64, memory_limit: usize) -> Result<Self> {
        let (target, path) = match output {
            DataOutput::File(path) => {
                let file = OpenOptions::new().read(true).write(true).create(true).truncate(true).open(path)?;
                file.set_len(length)?;
                debug!(path = %path.display(), length, "Opened output file");
                (Target::Direct { file }, path.clone())
            },
            DataOutput::ReplaceSeed => {
                let mut buffer = SpooledTempFile::new(memory_limit);
                buffer.set_len(length)?;
                debug!(seed = %seed_path.display(), length, memory_limit, "Staging in-place rebuild");
                (Target::Staged { buffer }, seed_path.to_path_buf())
            },
        };

        Ok(Self { target, path, length })
    }

    /// The path the output ends up at.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    /// Positions the writer at `offset` for the next writes.
    pub fn seek_to(&mut self, offset: u64) -> Result<()> {
        self.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// Hashes everything written so far.
    pub fn sha1_hex(&mut self) -> Result<String> {
        self.seek(SeekFrom::Start(0))?;
        match &mut self.target {
            Target::Direct { file } => sha1_hex_reader(file),
            Target::Staged { buffer } => sha1_hex_reader(buffer),
        }
    }

    /// Makes the output durable at its final path.
    ///
    /// A staged rebuild is first copied into a temporary file beside the seed, takes on the seed's
    /// permissions and then atomically renames over it.
    pub fn commit(self) -> Result<PathBuf> {
        let Self { target, path, length } = self;

        match target {
            Target::Direct { mut file } => {
                file.flush()?;
                file.sync_all()?;
            },
            Target::Staged { mut buffer } => {
                buffer.seek(SeekFrom::Start(0))?;

                let mut staged = NamedTempFile::new_in(parent_dir_or_cwd(&path))?;
                std::io::copy(&mut buffer, staged.as_file_mut())?;
                staged.as_file().sync_all()?;

                if let Ok(metadata) = std::fs::metadata(&path) {
                    staged.as_file().set_permissions(metadata.permissions())?;
                }

                staged.persist(&path)?;
                info!(path = %path.display(), length, "Replaced seed with reconstructed file");
            },
        }

        Ok(path)
    }

    /// Abandons the output. A distinct output file is removed; a staged rebuild is dropped.
    pub fn discard(self) -> Result<()> {
        match self.target {
            Target::Direct { file } => {
                drop(file);
                std::fs::remove_file(&self.path)?;
                debug!(path = %self.path.display(), "Removed output file");
            },
            Target::Staged { .. } => {
                debug!(seed = %self.path.display(), "Discarded staged rebuild; seed left untouched");
            },
        }
        Ok(())
    }
}

impl Write for OutputWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.target {
            Target::Direct { file } => file.write(buf),
            Target::Staged { buffer } => buffer.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.target {
            Target::Direct { file } => file.flush(),
            Target::Staged { buffer } => buffer.flush(),
        }
    }
}

impl Seek for OutputWriter {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        match &mut self.target {
            Target::Direct { file } => file.seek(pos),
            Target::Staged { buffer } => buffer.seek(pos),
        }
    }
}
