use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::SystemTime;

use chrono::DateTime;
use tracing::debug;

use crate::error::{Result, ZsyncMetadataError};

/// Header keys whose values are converted to integers while parsing.
pub const INTEGER_KEYS: [&str; 2] = ["Blocksize", "Length"];

const SHA1_HEX_LEN: usize = 40;

/// Stream version whose block format is incompatible with every later one.
const LEGACY_STREAM_VERSION: &str = "0.0.4";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Integer(u64),
    Text(String),
}

impl HeaderValue {
    pub fn as_integer(&self) -> Option<u64> {
        match self {
            HeaderValue::Integer(v) => Some(*v),
            HeaderValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            HeaderValue::Text(v) => Some(v),
            HeaderValue::Integer(_) => None,
        }
    }
}

/// The parsed text header of a `.zsync` file.
///
/// The header is a block of `Key: Value` lines ended by a blank line; the checksum table that follows
/// is never read. Later occurrences of a key replace earlier ones, except that every `URL` line is
/// also kept in order (see [`MetadataDescriptor::urls`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataDescriptor {
    headers: BTreeMap<String, HeaderValue>,
    urls: Vec<String>,
}

impl MetadataDescriptor {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Parsing zsync metadata descriptor");
        Self::parse_reader(BufReader::new(File::open(path)?))
    }

    pub fn parse_bytes(data: &[u8]) -> Result<Self> {
        Self::parse_reader(data)
    }

    /// Reads header lines up to and including the first blank line, leaving the rest of the reader
    /// untouched.
    pub fn parse_reader(mut reader: impl BufRead) -> Result<Self> {
        let mut descriptor = Self::default();
        let mut raw_line = Vec::new();
        let mut line_number = 0;

        loop {
            raw_line.clear();
            if reader.read_until(b'\n', &mut raw_line)? == 0 {
                return Err(ZsyncMetadataError::MissingTerminator);
            }
            line_number += 1;

            let line = std::str::from_utf8(&raw_line).map_err(|_| ZsyncMetadataError::MalformedLine {
                line_number,
                line: String::from_utf8_lossy(&raw_line).into_owned(),
            })?;

            let line = line.trim_end_matches(['\n', '\r', ' ']);
            if line.is_empty() {
                break;
            }

            let Some((key, value)) = line.split_once(": ") else {
                return Err(ZsyncMetadataError::MalformedLine {
                    line_number,
                    line: line.to_owned(),
                });
            };

            descriptor.insert(key, value)?;
        }

        if descriptor.text("zsync") == Some(LEGACY_STREAM_VERSION) {
            return Err(ZsyncMetadataError::UnsupportedVersion(LEGACY_STREAM_VERSION.to_owned()));
        }

        debug!(headers = descriptor.headers.len(), urls = descriptor.urls.len(), "Parsed metadata header");
        Ok(descriptor)
    }

    fn insert(&mut self, key: &str, value: &str) -> Result<()> {
        let parsed = if INTEGER_KEYS.contains(&key) {
            let v = value.trim().parse::<u64>().map_err(|_| ZsyncMetadataError::InvalidInteger {
                key: key.to_owned(),
                value: value.to_owned(),
            })?;
            HeaderValue::Integer(v)
        } else {
            HeaderValue::Text(value.to_owned())
        };

        if key == "URL" {
            self.urls.push(value.to_owned());
        }

        self.headers.insert(key.to_owned(), parsed);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&HeaderValue> {
        self.headers.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(HeaderValue::as_text)
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Total size of the target file in bytes.
    pub fn length(&self) -> Result<u64> {
        self.get("Length")
            .and_then(HeaderValue::as_integer)
            .ok_or(ZsyncMetadataError::MissingField("Length"))
    }

    pub fn blocksize(&self) -> Option<u64> {
        self.get("Blocksize").and_then(HeaderValue::as_integer)
    }

    /// The download URL, absolute or relative to the descriptor's own URL.
    pub fn url(&self) -> Result<&str> {
        self.text("URL").ok_or(ZsyncMetadataError::MissingField("URL"))
    }

    /// Every `URL` header in file order; descriptors may list mirrors.
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// The expected SHA-1 of the target, as written in the descriptor.
    pub fn sha1(&self) -> Result<&str> {
        let digest = self.text("SHA-1").ok_or(ZsyncMetadataError::MissingField("SHA-1"))?;
        if digest.len() != SHA1_HEX_LEN || !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ZsyncMetadataError::InvalidDigest(digest.to_owned()));
        }
        Ok(digest)
    }

    pub fn filename(&self) -> Option<&str> {
        self.text("Filename")
    }

    /// The target's modification time from the RFC 2822 `MTime` header, if present.
    pub fn mtime(&self) -> Result<Option<SystemTime>> {
        let Some(raw) = self.text("MTime") else {
            return Ok(None);
        };
        let parsed =
            DateTime::parse_from_rfc2822(raw.trim()).map_err(|_| ZsyncMetadataError::InvalidMTime(raw.to_owned()))?;
        Ok(Some(parsed.into()))
    }
}
