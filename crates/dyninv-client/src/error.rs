//! Error types for the dyninv client

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Source identifier could not be turned into a URL
///
/// Raised before any I/O happens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Neither `https:/` nor `http:/` occurs in the source
    #[error("no URL scheme found: {0}")]
    NoScheme(String),

    /// A scheme was found but the rebuilt URL does not parse
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl {
        /// Rebuilt URL candidate
        url: String,
        /// Parser message
        reason: String,
    },
}

/// Coarse classification of a transport failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// TLS or client configuration is unusable
    Config,
    /// Connection could not be established
    Connect,
    /// Request exceeded its deadline
    Timeout,
    /// Server answered with a non-success status
    Status(u16),
    /// Body could not be read or decoded
    Decode,
    /// Any other request failure
    Request,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportErrorKind::Config => write!(f, "config"),
            TransportErrorKind::Connect => write!(f, "connect"),
            TransportErrorKind::Timeout => write!(f, "timeout"),
            TransportErrorKind::Status(code) => write!(f, "status {code}"),
            TransportErrorKind::Decode => write!(f, "decode"),
            TransportErrorKind::Request => write!(f, "request"),
        }
    }
}

/// Any network, TLS or HTTP failure while fetching a source document
///
/// Terminal for the current fetch; this layer never retries.
#[derive(Error, Debug, Clone)]
#[error("failed to fetch {url} ({kind}): {message}")]
pub struct TransportError {
    /// URL that was being fetched
    pub url: String,
    /// Failure classification
    pub kind: TransportErrorKind,
    /// Human readable detail
    pub message: String,
}

impl TransportError {
    /// Create a transport error
    pub fn new(url: impl fmt::Display, kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            kind,
            message: message.into(),
        }
    }

    /// Classify a reqwest failure
    pub(crate) fn from_reqwest(url: impl fmt::Display, err: &reqwest::Error) -> Self {
        let kind = if caused_by::<TlsUpgradeRefused>(err) {
            TransportErrorKind::Config
        } else if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::Connect
        } else if let Some(status) = err.status() {
            TransportErrorKind::Status(status.as_u16())
        } else if err.is_decode() || err.is_body() {
            TransportErrorKind::Decode
        } else if err.is_builder() {
            TransportErrorKind::Config
        } else {
            TransportErrorKind::Request
        };
        Self::new(url, kind, error_chain(err))
    }

    /// HTTP status code, if the server answered
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self.kind {
            TransportErrorKind::Status(code) => Some(code),
            _ => None,
        }
    }
}

/// Redirect from plain HTTP to HTTPS without a usable CA bundle
#[derive(Error, Debug)]
#[error("redirect to {url} needs TLS but CA bundle does not exist: {}", .bundle.display())]
pub(crate) struct TlsUpgradeRefused {
    pub(crate) url: String,
    pub(crate) bundle: PathBuf,
}

fn caused_by<E: std::error::Error + 'static>(err: &dyn std::error::Error) -> bool {
    let mut source = err.source();
    while let Some(inner) = source {
        if inner.is::<E>() {
            return true;
        }
        source = inner.source();
    }
    false
}

/// Join an error and its sources, reqwest keeps the useful part in the chain
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
