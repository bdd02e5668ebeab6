//! Fetcher trait

use async_trait::async_trait;
use url::Url;

use crate::diagnostics::Diagnostics;
use crate::error::TransportError;
use crate::security::SecurityOptions;

/// Retrieves the raw text of a source document
///
/// Implementations perform a single attempt per call and do not retry.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the document at `url` as UTF-8 text
    async fn fetch(
        &self,
        url: &Url,
        security: &SecurityOptions,
        diagnostics: &mut Diagnostics,
    ) -> Result<String, TransportError>;
}
