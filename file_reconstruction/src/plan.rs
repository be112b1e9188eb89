use serde::{Deserialize, Serialize};

use crate::error::{FileReconstructionError, Result};

/// `length` bytes at `source_offset` in the seed belong at `destination_offset` in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u64, u64, u64)", into = "(u64, u64, u64)")]
pub struct ReuseRange {
    pub destination_offset: u64,
    pub source_offset: u64,
    pub length: u64,
}

impl ReuseRange {
    pub fn new(destination_offset: u64, source_offset: u64, length: u64) -> Self {
        Self {
            destination_offset,
            source_offset,
            length,
        }
    }
}

impl From<(u64, u64, u64)> for ReuseRange {
    fn from((dst, src, len): (u64, u64, u64)) -> Self {
        Self::new(dst, src, len)
    }
}

impl From<ReuseRange> for (u64, u64, u64) {
    fn from(r: ReuseRange) -> Self {
        (r.destination_offset, r.source_offset, r.length)
    }
}

/// An inclusive byte interval `[start, end]` of the remote file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u64, u64)", into = "(u64, u64)")]
pub struct DownloadRange {
    pub start: u64,
    pub end: u64,
}

impl DownloadRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> u64 {
        (self.end + 1).saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// The value of the HTTP `Range` header requesting this interval.
    pub fn header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

impl From<(u64, u64)> for DownloadRange {
    fn from((start, end): (u64, u64)) -> Self {
        Self::new(start, end)
    }
}

impl From<DownloadRange> for (u64, u64) {
    fn from(r: DownloadRange) -> Self {
        (r.start, r.end)
    }
}

/// Which seed bytes to reuse and which remote bytes to fetch to rebuild the target.
///
/// The JSON form is `{"length": N, "reuse": [[dst, src, len], ...], "download": [[start, end], ...]}`,
/// with `length` optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconstructionPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,

    #[serde(default)]
    pub reuse: Vec<ReuseRange>,

    #[serde(default)]
    pub download: Vec<DownloadRange>,
}

impl ReconstructionPlan {
    pub fn new(reuse: Vec<ReuseRange>, download: Vec<DownloadRange>) -> Self {
        Self {
            length: None,
            reuse,
            download,
        }
    }

    pub fn with_length(self, length: u64) -> Self {
        Self {
            length: Some(length),
            ..self
        }
    }

    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| FileReconstructionError::MalformedPlan(format!("invalid plan JSON: {e}")))
    }

    /// Bytes that will be requested from the server.
    pub fn total_download_bytes(&self) -> u64 {
        self.download.iter().map(DownloadRange::len).sum()
    }

    pub fn total_reuse_bytes(&self) -> u64 {
        self.reuse.iter().map(|r| r.length).sum()
    }

    /// Checks every range against the target length. Coverage of `[0, target_length)` is the
    /// planner's responsibility and is not checked here.
    pub fn validate(&self, target_length: u64) -> Result<()> {
        if let Some(length) = self.length {
            if length != target_length {
                return Err(FileReconstructionError::MalformedPlan(format!(
                    "plan is for a {length} byte file but the target is {target_length} bytes"
                )));
            }
        }

        for r in &self.reuse {
            let in_bounds = r.destination_offset.checked_add(r.length).is_some_and(|end| end <= target_length);
            if !in_bounds {
                return Err(FileReconstructionError::MalformedPlan(format!(
                    "reuse range {r:?} writes past the end of the {target_length} byte target"
                )));
            }
        }

        for d in &self.download {
            if d.start > d.end || d.end >= target_length {
                return Err(FileReconstructionError::MalformedPlan(format!(
                    "download range bytes={}-{} is invalid for a {target_length} byte target",
                    d.start, d.end
                )));
            }
        }

        Ok(())
    }
}
