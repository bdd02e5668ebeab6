//! Inventory source resolution
//!
//! Sources arrive after path normalization, which collapses `://` into `:/`
//! and may prefix the working directory, e.g. `/srv/ansible/https:/api/inv`.
//! The URL is recovered from the last scheme marker in the string.

use std::path::Path;

use tracing::{debug, instrument};
use url::Url;

use crate::diagnostics::Diagnostics;
use crate::error::ValidationError;

const SECURE_MARKER: &str = "https:/";
const PLAIN_MARKER: &str = "http:/";

/// Check whether a source string names a remote inventory
///
/// Rejects missing or blank input and paths that exist locally, files or
/// directories (those belong to file based inventory sources), before
/// looking for a scheme marker.
#[must_use]
pub fn is_valid_source(source: Option<&str>) -> bool {
    let Some(source) = source.map(str::trim).filter(|s| !s.is_empty()) else {
        return false;
    };

    if Path::new(source).exists() {
        debug!(source, "source is a local path");
        return false;
    }

    let lower = source.to_lowercase();
    lower.contains(SECURE_MARKER) || lower.contains(PLAIN_MARKER)
}

/// Recover the remote URL from a normalized source string
///
/// The secure marker is preferred when both are present. Plain HTTP is
/// accepted with a warning.
///
/// # Errors
/// Returns `ValidationError::NoScheme` if no marker is found and
/// `ValidationError::InvalidUrl` if the rebuilt URL has no host or does not
/// parse.
#[instrument(skip(diagnostics))]
pub fn resolve(source: &str, diagnostics: &mut Diagnostics) -> Result<Url, ValidationError> {
    let lower = source.trim().to_lowercase();

    let (scheme, rest) = if let Some(rest) = after_last(&lower, SECURE_MARKER) {
        ("https", rest)
    } else if let Some(rest) = after_last(&lower, PLAIN_MARKER) {
        ("http", rest)
    } else {
        return Err(ValidationError::NoScheme(source.to_string()));
    };

    let candidate = format!("{scheme}://{}", rest.trim_start_matches('/'));
    let url = Url::parse(&candidate).map_err(|e| ValidationError::InvalidUrl {
        url: candidate.clone(),
        reason: e.to_string(),
    })?;

    if !url.has_host() {
        return Err(ValidationError::InvalidUrl {
            url: candidate,
            reason: "missing host".to_string(),
        });
    }

    if scheme == "http" {
        diagnostics.warn("resolver", format!("using a non-secure URL: {url}"));
    }

    debug!(%url, "resolved inventory source");
    Ok(url)
}

fn after_last<'a>(haystack: &'a str, marker: &str) -> Option<&'a str> {
    haystack
        .rfind(marker)
        .map(|pos| &haystack[pos + marker.len()..])
}
