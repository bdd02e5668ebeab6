//! HTTP fetcher for remote inventory sources

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::{Certificate, Client, ClientBuilder};
use tracing::{debug, instrument};
use url::Url;

use crate::diagnostics::Diagnostics;
use crate::error::{TlsUpgradeRefused, TransportError, TransportErrorKind};
use crate::security::{SecurityOptions, TlsPolicy};
use crate::traits::Fetcher;

/// Default `User-Agent` header
pub const DEFAULT_USER_AGENT: &str = concat!("dyninv/", env!("CARGO_PKG_VERSION"));

/// Longest error body quoted back in a status error
const MAX_ERROR_BODY: usize = 256;

/// Fetches inventory documents over HTTP(S)
///
/// Requests advertise gzip and compressed bodies are decoded transparently.
/// A client is built per call so each fetch applies its own security options.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    user_agent: String,
    timeout: Option<Duration>,
}

impl HttpFetcher {
    /// Create a fetcher with the default user agent and no timeout
    #[must_use]
    pub fn new() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        }
    }

    /// Set request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set `User-Agent` header
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build a client for `url` honoring the security options
    fn client(
        &self,
        url: &Url,
        security: &SecurityOptions,
        diagnostics: &mut Diagnostics,
    ) -> Result<Client, TransportError> {
        let mut builder = Client::builder().user_agent(&self.user_agent).gzip(true);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        builder = if url.scheme() == "https" {
            apply_tls(builder, url, security.tls_policy(diagnostics))?
        } else {
            // a plain source can still redirect to https
            let bundle = security.resolved_ca_bundle();
            if bundle.is_file() {
                apply_tls(builder, url, TlsPolicy::Verify(bundle))?
            } else {
                builder.redirect(refuse_tls_upgrade(bundle))
            }
        };

        builder
            .build()
            .map_err(|e| TransportError::from_reqwest(url, &e))
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_tls(
    builder: ClientBuilder,
    url: &Url,
    policy: TlsPolicy,
) -> Result<ClientBuilder, TransportError> {
    match policy {
        TlsPolicy::Verify(bundle) => {
            let pem = std::fs::read(&bundle).map_err(|e| {
                TransportError::new(
                    url,
                    TransportErrorKind::Config,
                    format!("cannot read CA bundle {}: {e}", bundle.display()),
                )
            })?;
            let certs = Certificate::from_pem_bundle(&pem).map_err(|e| {
                TransportError::new(
                    url,
                    TransportErrorKind::Config,
                    format!("invalid CA bundle {}: {e}", bundle.display()),
                )
            })?;
            debug!(bundle = %bundle.display(), certs = certs.len(), "loaded CA bundle");
            // only the bundle is trusted, never the platform store
            Ok(builder.tls_certs_only(certs))
        }
        TlsPolicy::Disabled => Ok(builder.tls_danger_accept_invalid_certs(true)),
        TlsPolicy::MissingBundle(bundle) => Err(TransportError::new(
            url,
            TransportErrorKind::Config,
            format!(
                "CA bundle does not exist: {} (enable insecure mode to skip verification)",
                bundle.display()
            ),
        )),
    }
}

/// Follow redirects as usual but stop at any hop that switches to https
fn refuse_tls_upgrade(bundle: PathBuf) -> Policy {
    let fallback = Policy::default();
    Policy::custom(move |attempt| {
        if attempt.url().scheme() == "https" {
            let refused = TlsUpgradeRefused {
                url: attempt.url().to_string(),
                bundle: bundle.clone(),
            };
            attempt.error(refused)
        } else {
            fallback.redirect(attempt)
        }
    })
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(skip(self, security, diagnostics), fields(url = %url))]
    async fn fetch(
        &self,
        url: &Url,
        security: &SecurityOptions,
        diagnostics: &mut Diagnostics,
    ) -> Result<String, TransportError> {
        let client = self.client(url, security, diagnostics)?;

        debug!("requesting inventory document");
        let response = client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            return Err(TransportError::new(
                url,
                TransportErrorKind::Status(status.as_u16()),
                format!("server returned {status}: {}", body.trim()),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::from_reqwest(url, &e))?;

        let text = String::from_utf8(bytes.to_vec()).map_err(|e| {
            TransportError::new(
                url,
                TransportErrorKind::Decode,
                format!("response is not valid UTF-8: {e}"),
            )
        })?;

        debug!(bytes = text.len(), "inventory document received");
        Ok(text)
    }
}
