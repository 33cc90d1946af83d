//! Domain logic for the Singularity MCP adapter.
//!
//! Nothing in this crate performs I/O. It shapes outgoing requests, reconciles
//! the remote API's inconsistent collection envelopes, and computes local-day
//! boundaries in UTC.

pub mod error;
pub mod ids;
pub mod models;
pub mod reconcile;
pub mod time;
