//! Inventory source plugins

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dyninv_client::{Diagnostic, Diagnostics, Fetcher, SecurityOptions, is_valid_source, resolve};
use dyninv_inventory::{InventoryGraph, build_from_str};
use tracing::{debug, info, instrument};
use url::Url;

use crate::config::SourceConfig;
use crate::error::SourceError;

/// Something that can turn a source identifier into an inventory
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Plugin name used in logs
    fn name(&self) -> &'static str;

    /// Check whether this plugin handles `source`
    fn accepts(&self, source: &str) -> bool;

    /// Produce a fresh inventory for `source`
    async fn parse(&self, source: &str) -> Result<InventorySnapshot, SourceError>;
}

/// Result of one successful resolve/fetch/build cycle
#[derive(Debug, Clone)]
pub struct InventorySnapshot {
    source: Url,
    fetched_at: DateTime<Utc>,
    graph: InventoryGraph,
    diagnostics: Vec<Diagnostic>,
}

impl InventorySnapshot {
    /// URL the document was fetched from
    #[must_use]
    pub fn source(&self) -> &Url {
        &self.source
    }

    /// When the document was fetched
    #[must_use]
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Built inventory
    #[must_use]
    pub fn graph(&self) -> &InventoryGraph {
        &self.graph
    }

    /// Warnings raised during the cycle
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Take ownership of the graph
    #[must_use]
    pub fn into_graph(self) -> InventoryGraph {
        self.graph
    }
}

/// Inventory fetched from a remote HTTP(S) API
pub struct RemoteInventorySource {
    fetcher: Arc<dyn Fetcher>,
    security: SecurityOptions,
}

impl RemoteInventorySource {
    /// Create a source with an explicit fetcher
    pub fn new(fetcher: Arc<dyn Fetcher>, security: SecurityOptions) -> Self {
        Self { fetcher, security }
    }

    /// Create a source that fetches over HTTP(S) as configured
    #[must_use]
    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(Arc::new(config.http_fetcher()), config.security.clone())
    }

    /// Security options applied to every fetch
    #[must_use]
    pub fn security(&self) -> &SecurityOptions {
        &self.security
    }
}

#[async_trait]
impl InventorySource for RemoteInventorySource {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn accepts(&self, source: &str) -> bool {
        is_valid_source(Some(source))
    }

    #[instrument(skip(self), fields(plugin = self.name()))]
    async fn parse(&self, source: &str) -> Result<InventorySnapshot, SourceError> {
        let mut diagnostics = Diagnostics::new();

        let url = resolve(source, &mut diagnostics)?;
        let text = self
            .fetcher
            .fetch(&url, &self.security, &mut diagnostics)
            .await?;
        let fetched_at = Utc::now();

        debug!(bytes = text.len(), "building inventory");
        let graph = build_from_str(&text).map_err(|error| SourceError::Malformed {
            url: url.to_string(),
            error,
        })?;

        report_hazards(&graph, &mut diagnostics);

        info!(
            url = %url,
            groups = graph.group_count(),
            hosts = graph.host_count(),
            warnings = diagnostics.len(),
            "inventory built"
        );

        Ok(InventorySnapshot {
            source: url,
            fetched_at,
            graph,
            diagnostics: diagnostics.into_vec(),
        })
    }
}

/// Warn about membership edges downstream consumers will have to reconcile
fn report_hazards(graph: &InventoryGraph, diagnostics: &mut Diagnostics) {
    for member in graph.unresolved_members() {
        let parents = graph.parents_of(member).join(", ");
        diagnostics.warn(
            "builder",
            format!("member `{member}` of group(s) {parents} is not a declared host or group"),
        );
    }

    if let Some(cycle) = graph.find_group_cycle() {
        diagnostics.warn(
            "builder",
            format!("group membership cycle: {}", cycle.join(" -> ")),
        );
    }
}
