//! dyninv-client: remote inventory retrieval
//!
//! Resolves normalized source strings into URLs and fetches the raw document
//! text over HTTP(S) with configurable certificate verification.
//!
//! # Example
//!
//! ```no_run
//! use dyninv_client::{Diagnostics, Fetcher, HttpFetcher, SecurityOptions, resolve};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut diagnostics = Diagnostics::new();
//! let url = resolve("https:/inventory.example.com/v1/inventory", &mut diagnostics)?;
//!
//! let fetcher = HttpFetcher::new();
//! let text = fetcher
//!     .fetch(&url, &SecurityOptions::default(), &mut diagnostics)
//!     .await?;
//! println!("{} bytes, {} warnings", text.len(), diagnostics.len());
//! # Ok(())
//! # }
//! ```

pub mod diagnostics;
pub mod error;
pub mod http;
pub mod resolver;
pub mod security;
pub mod traits;

pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{TransportError, TransportErrorKind, ValidationError};
pub use http::{DEFAULT_USER_AGENT, HttpFetcher};
pub use resolver::{is_valid_source, resolve};
pub use security::{DEFAULT_CA_BUNDLE, SecurityOptions, TlsPolicy};
pub use traits::Fetcher;
