use tracing::debug;
use url::Url;

use crate::error::{Result, ZsyncMetadataError};

/// Resolve the descriptor's `URL` header against the URL the descriptor itself was fetched from.
///
/// A header URL with a host is returned as is. Anything else is taken relative to the descriptor's
/// directory: the last path segment of `metadata_url` is dropped and the header's path appended.
/// Only the path of the header is used; its query and fragment are ignored.
pub fn resolve_download_url(metadata_url: &str, header_url: &str) -> Result<Url> {
    let invalid = |url: &str, source| ZsyncMetadataError::InvalidUrl {
        url: url.to_owned(),
        source,
    };

    let header_path = match Url::parse(header_url) {
        Ok(absolute) if absolute.has_host() => return Ok(absolute),
        Ok(opaque) => opaque.path().to_owned(),
        Err(url::ParseError::RelativeUrlWithoutBase) => header_url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_owned(),
        Err(e) => return Err(invalid(header_url, e)),
    };

    let mut base = Url::parse(metadata_url).map_err(|e| invalid(metadata_url, e))?;
    base.set_query(None);
    base.set_fragment(None);

    let directory = base.as_str().rsplit_once('/').map_or(base.as_str(), |(dir, _)| dir);
    let joined = format!("{directory}/{header_path}");
    let resolved = Url::parse(&joined).map_err(|e| invalid(&joined, e))?;

    debug!(%base, header_url, %resolved, "Resolved relative download URL");
    Ok(resolved)
}
