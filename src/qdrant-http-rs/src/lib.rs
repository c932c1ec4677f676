//! qdrant-http Client Library
//!
//! Async HTTP client for the Qdrant REST API. Every endpoint method funnels
//! through one pipeline: build a request against the configured base URL
//! (injecting the `api-key` header), execute it on a pooled transport, then
//! either decode the `{time, status, result}` envelope or hand the body back
//! as a byte stream for snapshot downloads.
//!
//! ```rust,no_run
//! use qdrant_http_rs::{Client, ConnectionConfig};
//!
//! # async fn run() -> qdrant_http_rs::Result<()> {
//! let client = Client::new(&ConnectionConfig::new("localhost").with_api_key("secret"))?;
//! let collections = client.list_collections().await?;
//! for collection in collections.result.collections {
//!     println!("{}", collection.name);
//! }
//! client.close();
//! # Ok(())
//! # }
//! ```

mod client;
mod cluster;
mod collections;
mod request;
mod response;
mod snapshots;
mod stream;
mod transport;

pub use client::Client;
pub use qdrant_http_core::*;
pub use request::{CallSite, PreparedRequest, RequestContext, API_KEY_HEADER};
pub use stream::ByteStream;
pub use transport::Transport;

pub use reqwest::Method;
pub use tokio_util::sync::CancellationToken;

/// Boxed cause for request construction failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// What went wrong below HTTP: the request never produced a full response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection refused, DNS failure, TLS handshake failure
    Connect,
    /// Request timeout or context deadline elapsed
    Timeout,
    /// The context's cancellation token fired
    Cancelled,
    /// The response body could not be read
    Body,
    Other,
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TransportErrorKind::Connect => "connection failed",
            TransportErrorKind::Timeout => "timed out",
            TransportErrorKind::Cancelled => "cancelled",
            TransportErrorKind::Body => "reading body failed",
            TransportErrorKind::Other => "request failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("{call}: creating request: {source}")]
    RequestConstruction { call: CallSite, source: BoxError },

    #[error("{call}: executing request: {kind}")]
    Transport {
        call: CallSite,
        kind: TransportErrorKind,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("{call}: unexpected status code {code}: {body}")]
    UnexpectedStatus {
        call: CallSite,
        code: u16,
        body: String,
    },

    #[error("{call}: decoding response: {source}")]
    Decode {
        call: CallSite,
        source: serde_json::Error,
    },
}

impl ClientError {
    /// The operation and path that failed; `None` for configuration errors
    pub fn call(&self) -> Option<&CallSite> {
        match self {
            ClientError::Config(_) => None,
            ClientError::RequestConstruction { call, .. }
            | ClientError::Transport { call, .. }
            | ClientError::UnexpectedStatus { call, .. }
            | ClientError::Decode { call, .. } => Some(call),
        }
    }

    pub fn transport_kind(&self) -> Option<TransportErrorKind> {
        match self {
            ClientError::Transport { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.transport_kind() == Some(TransportErrorKind::Timeout)
    }

    pub fn is_cancelled(&self) -> bool {
        self.transport_kind() == Some(TransportErrorKind::Cancelled)
    }

    /// HTTP status of an `UnexpectedStatus` error
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::UnexpectedStatus { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
