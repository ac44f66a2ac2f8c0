//! # BlueBubbles MCP
//!
//! MCP server exposing a BlueBubbles messaging server to AI agents.
//!
//! BlueBubbles serves the iMessage/SMS database of a Mac over a REST API.
//! This crate wraps that API as Model Context Protocol tools, resources and
//! prompts, and layers best-effort contact-name enrichment on top: 1:1 chats
//! usually come back from the server with a blank `displayName`, so the
//! [`enrichment::ContactResolver`] fills in names resolved from the macOS
//! Contacts database.
//!
//! ## Example
//!
//! ```rust,ignore
//! use bluebubbles_mcp::api::ApiClient;
//! use bluebubbles_mcp::config::ServerConfig;
//! use bluebubbles_mcp::enrichment::ContactResolver;
//!
//! let config = ServerConfig::from_env()?;
//! let client = ApiClient::new(&config)?;
//! let resolver = ContactResolver::new(client.clone());
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod api;
pub mod config;
pub mod enrichment;
pub mod mcp;
pub mod observability;

// Re-exports for convenience
pub use api::{ApiClient, ApiResponse};
pub use config::ServerConfig;
pub use enrichment::{ContactDirectory, ContactResolver, normalize_address, normalize_phone};

/// Error type for bluebubbles-mcp operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Missing required parameters, malformed JSON in tool arguments |
/// | `Config` | Required environment variables missing or unparseable |
/// | `Upstream` | The BlueBubbles server is unreachable or returns a bad payload |
/// | `OperationFailed` | Local I/O errors (stdio transport reads/writes) |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - Required tool parameters are missing
    /// - JSON deserialization fails in MCP tool handlers
    /// - A resource URI does not match any known pattern
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration is missing or invalid.
    ///
    /// Raised when `BLUEBUBBLES_URL` or `BLUEBUBBLES_PASSWORD` is unset,
    /// or when a numeric setting cannot be parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// A request to the BlueBubbles server failed.
    ///
    /// Raised when:
    /// - The HTTP request errors (connection refused, timeout, TLS)
    /// - The response body is not the expected JSON envelope
    #[error("upstream request to '{endpoint}' failed: {cause}")]
    Upstream {
        /// The API endpoint path that failed.
        endpoint: String,
        /// The underlying cause.
        cause: String,
    },

    /// A local operation failed.
    ///
    /// Raised when stdio transport reads or writes fail.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for bluebubbles-mcp operations.
pub type Result<T> = std::result::Result<T, Error>;
