//! Social network clients used by graphsnap.
//!
//! Only Bluesky (AT Protocol XRPC) is implemented: session bootstrap, profile lookup,
//! and the four relationship listings walked through [`graphsnap_fetch::Paginator`].
pub mod bsky;
