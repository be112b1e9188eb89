use std::path::{Path, PathBuf};

/// Where the reconstructed file is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataOutput {
    /// Write into a distinct file, created or truncated at the start of the run.
    File(PathBuf),

    /// Rebuild the seed file in place. Nothing touches the seed until the run succeeds.
    ReplaceSeed,
}

impl DataOutput {
    pub fn write_in_file(path: impl AsRef<Path>) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }

    /// Picks the output for an optional output path. A path that resolves to the seed itself is
    /// treated as an in-place rebuild, since truncating it would destroy the bytes being reused.
    pub fn for_seed(seed_path: &Path, output_path: Option<&Path>) -> Self {
        let Some(output_path) = output_path else {
            return Self::ReplaceSeed;
        };

        let same_file = match (std::fs::canonicalize(seed_path), std::fs::canonicalize(output_path)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };

        if same_file {
            Self::ReplaceSeed
        } else {
            Self::File(output_path.to_path_buf())
        }
    }

    pub fn is_in_place(&self) -> bool {
        matches!(self, Self::ReplaceSeed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_seed() {
        let dir = tempfile::tempdir().unwrap();
        let seed = dir.path().join("seed.bin");
        std::fs::write(&seed, b"abc").unwrap();

        assert_eq!(DataOutput::for_seed(&seed, None), DataOutput::ReplaceSeed);

        let other = dir.path().join("out.bin");
        assert_eq!(DataOutput::for_seed(&seed, Some(&other)), DataOutput::File(other.clone()));

        let aliased = dir.path().join(".").join("seed.bin");
        assert!(DataOutput::for_seed(&seed, Some(&aliased)).is_in_place());
    }
}
