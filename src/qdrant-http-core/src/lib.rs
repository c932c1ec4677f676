//! qdrant-http Core Library
//!
//! This crate provides the network-free half of the qdrant-http client:
//! - Connection configuration and its derived transport settings
//! - The `{time, status, result}` response envelope
//! - Wire models for collections, cluster management and snapshots

pub mod config;
pub mod envelope;
pub mod models;

// Re-export commonly used types
pub use config::{ConfigError, ConnectionConfig, TlsOptions, TransportConfig};
pub use envelope::{Envelope, EnvelopeStatusError, JsonMap, Usage};
pub use models::*;
