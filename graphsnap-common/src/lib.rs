//! Common types and utilities shared across graphsnap crates.
//!
//! This crate defines the shared error taxonomy, the rate-limit classification used
//! by the retry layer, and the observability helpers every binary initialises once.
//! It stays dependency-light so that each crate in the workspace can pull it in.
//!
//! # Overview
//!
//! - [`GraphsnapError`] and [`Result`]: fatal conditions surfaced to the binary
//! - [`RateLimited`]: how an error tells the backoff layer it was throttled
//! - [`observability`]: centralised tracing/logging initialisation
//!
//! # Examples
//!
//! ```rust
//! use graphsnap_common::{GraphsnapError, RateLimited};
//!
//! struct Throttled;
//! impl RateLimited for Throttled {
//!     fn is_rate_limited(&self) -> bool {
//!         true
//!     }
//! }
//!
//! assert!(Throttled.is_rate_limited());
//! let err = GraphsnapError::Config("BSKY_HANDLE env var not set".into());
//! assert_eq!(err.to_string(), "Configuration error: BSKY_HANDLE env var not set");
//! ```

pub mod observability;

/// Classification hook for errors returned by remote calls.
///
/// Only errors reporting `true` are retried by the backoff executor; everything
/// else fails the call immediately.
pub trait RateLimited {
    fn is_rate_limited(&self) -> bool;
}

/// Fatal conditions of a graphsnap run.
#[derive(thiserror::Error, Debug)]
pub enum GraphsnapError {
    /// Missing or invalid configuration (env vars, command line).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The remote service refused to establish a session.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A remote call failed, or kept being throttled past the retry budget.
    #[error("Remote error: {0}")]
    Remote(#[from] anyhow::Error),

    /// Writing a snapshot to the output stream failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

/// Convenient alias for results that use [`GraphsnapError`].
pub type Result<T> = std::result::Result<T, GraphsnapError>;
