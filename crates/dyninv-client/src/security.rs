//! Transport security options

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;

/// Conventional system CA bundle location
pub const DEFAULT_CA_BUNDLE: &str = "/etc/ssl/certs/ca-bundle.crt";

/// Certificate verification settings for HTTPS sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityOptions {
    /// PEM bundle used to verify server certificates
    #[serde(default = "default_ca_bundle")]
    pub ca_bundle: PathBuf,
    /// Allow skipping verification when the bundle is missing
    #[serde(default)]
    pub insecure: bool,
}

fn default_ca_bundle() -> PathBuf {
    PathBuf::from(DEFAULT_CA_BUNDLE)
}

impl Default for SecurityOptions {
    fn default() -> Self {
        Self {
            ca_bundle: default_ca_bundle(),
            insecure: false,
        }
    }
}

/// Verification mode selected for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsPolicy {
    /// Trust the certificates in this bundle and verify
    Verify(PathBuf),
    /// Accept any certificate
    Disabled,
    /// Bundle is missing and insecure mode was not requested
    MissingBundle(PathBuf),
}

impl SecurityOptions {
    /// Create options for a bundle path
    pub fn new(ca_bundle: impl Into<PathBuf>) -> Self {
        Self {
            ca_bundle: ca_bundle.into(),
            insecure: false,
        }
    }

    /// Set insecure mode
    #[must_use]
    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// Bundle path with `~` expanded and made absolute
    #[must_use]
    pub fn resolved_ca_bundle(&self) -> PathBuf {
        let path = expand_home(&self.ca_bundle);
        std::path::absolute(&path).unwrap_or(path)
    }

    /// Decide how certificates are verified
    ///
    /// Verification is only skipped when the bundle is missing and insecure
    /// mode was requested; that case records a warning.
    pub fn tls_policy(&self, diagnostics: &mut Diagnostics) -> TlsPolicy {
        let bundle = self.resolved_ca_bundle();

        if bundle.is_file() {
            TlsPolicy::Verify(bundle)
        } else if self.insecure {
            diagnostics.warn(
                "fetcher",
                format!(
                    "TLS validation disabled! CA bundle does not exist: {}",
                    bundle.display()
                ),
            );
            TlsPolicy::Disabled
        } else {
            TlsPolicy::MissingBundle(bundle)
        }
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir().map_or_else(|| path.to_path_buf(), |home| home.join(rest)),
        Err(_) => path.to_path_buf(),
    }
}
