//! Bluesky XRPC surface: the authenticated client, wire types, and relationship
//! listings.
pub mod client;
pub mod graph;
pub mod types;

pub use client::{BskyClient, Session};
pub use graph::{Relationship, SocialGraph, list};
pub use types::Account;
