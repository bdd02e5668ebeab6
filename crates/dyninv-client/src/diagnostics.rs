//! Warnings collected during one resolve/fetch/build cycle
//!
//! A `Diagnostics` value is created per cycle and passed by `&mut` to every
//! step that can warn. Each entry is also emitted through `tracing`.

use serde::Serialize;
use tracing::warn;

/// Single warning
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Component that raised the warning (resolver, fetcher, ...)
    pub component: &'static str,
    /// Warning text
    pub message: String,
}

/// Ordered warning list for one cycle
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and log it
    pub fn warn(&mut self, component: &'static str, message: impl Into<String>) {
        let message = message.into();
        warn!(component, "{message}");
        self.entries.push(Diagnostic { component, message });
    }

    /// Recorded warnings in order
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Number of warnings
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if any warning contains `needle`
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|d| d.message.contains(needle))
    }

    /// Consume into the underlying list
    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
