//! ocipower Common Library
//!
//! Credential loading, request signing and the domain types shared by the
//! ocipower client and CLI.

pub mod config;
pub mod crypto;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{ConfigLocation, OciConfig};
pub use crypto::RequestSigner;
pub use error::{Error, Result};
pub use types::*;

/// ocipower version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Provider API version path segment
pub const API_VERSION: &str = "20160918";

/// Regional compute endpoint
pub fn compute_endpoint(region: &str) -> String {
    format!("https://iaas.{}.oraclecloud.com", region)
}
