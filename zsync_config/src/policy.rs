use std::fmt;
use std::str::FromStr;

use utils::configuration_utils::FromStrParseable;

/// What to do with a reconstructed file whose SHA-1 does not match the descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegrityPolicy {
    /// Keep the output and report the mismatch as a failed run.
    #[default]
    Advisory,
    /// Verify before committing; a mismatching result is discarded and the seed is left untouched.
    Strict,
}

impl FromStr for IntegrityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "advisory" | "keep" => Ok(Self::Advisory),
            "strict" | "discard" => Ok(Self::Strict),
            other => Err(format!("unknown integrity policy {other:?}")),
        }
    }
}

impl fmt::Display for IntegrityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Advisory => write!(f, "advisory"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

impl FromStrParseable for IntegrityPolicy {}
