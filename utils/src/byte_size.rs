use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A byte count that can be written by humans, e.g. `64kb`, `1.5mb` or `4096`.
///
/// Units are binary (`kb` = 1024 bytes).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ByteSize(u64);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid byte size {0:?}")]
pub struct ByteSizeParseError(String);

const UNITS: [(&str, u64); 5] = [("b", 1), ("kb", 1 << 10), ("mb", 1 << 20), ("gb", 1 << 30), ("tb", 1 << 40)];

impl ByteSize {
    pub const fn new(bytes: u64) -> Self {
        Self(bytes)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn as_usize(&self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }
}

impl FromStr for ByteSize {
    type Err = ByteSizeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let split = lower.find(|c: char| !(c.is_ascii_digit() || c == '.')).unwrap_or(lower.len());
        let (number, unit) = lower.split_at(split);
        let unit = unit.trim();

        let multiplier = match unit {
            "" => 1,
            // Accept the short forms `k`, `m`, `g`, `t` as well.
            u => UNITS
                .iter()
                .find(|(name, _)| *name == u || (name.len() == 2 && name.starts_with(u) && u.len() == 1))
                .map(|(_, m)| *m)
                .ok_or_else(|| ByteSizeParseError(s.to_owned()))?,
        };

        let value: f64 = number.parse().map_err(|_| ByteSizeParseError(s.to_owned()))?;
        if !value.is_finite() || value < 0. {
            return Err(ByteSizeParseError(s.to_owned()));
        }

        Ok(Self((value * multiplier as f64).round() as u64))
    }
}

/// Intended for literal defaults in configuration groups; panics on invalid input.
impl From<&str> for ByteSize {
    fn from(s: &str) -> Self {
        s.parse().unwrap_or_else(|e| panic!("{e}"))
    }
}

impl From<u64> for ByteSize {
    fn from(bytes: u64) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (unit, size) = UNITS
            .iter()
            .rev()
            .find(|(_, m)| self.0 >= *m && self.0 % *m == 0)
            .copied()
            .unwrap_or(("b", 1));
        write!(f, "{}{unit}", self.0 / size)
    }
}
