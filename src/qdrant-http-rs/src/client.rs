use std::sync::Arc;

use qdrant_http_core::{ConnectionConfig, Envelope};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::request::{CallSite, PreparedRequest, RequestContext};
use crate::stream::ByteStream;
use crate::transport::Transport;
use crate::{response, Result};

/// Qdrant REST API client.
///
/// Create one per server and share it: clones are cheap and reuse the same
/// connection pool, so concurrent calls from many tasks are fine.
#[derive(Clone)]
pub struct Client {
    pub(crate) transport: Transport,
    base_url: Arc<str>,
    pub(crate) api_key: Option<Arc<str>>,
    context: RequestContext,
}

impl Client {
    /// Validate `config` and build a client with its own connection pool
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        config.validate()?;
        let transport = Transport::new(&config.transport_config())?;
        let base_url = config.base_url();

        tracing::debug!(
            base_url = %base_url,
            authenticated = config.api_key().is_some(),
            "qdrant client created"
        );

        Ok(Self {
            transport,
            base_url: base_url.into(),
            api_key: config.api_key().map(Arc::from),
            context: RequestContext::default(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// A handle sharing this client's pool whose calls obey `context`
    pub fn with_context(&self, context: RequestContext) -> Self {
        Self {
            context,
            ..self.clone()
        }
    }

    /// Release this handle's share of the connection pool.
    ///
    /// The pool is shared with every clone, including handles made by
    /// [`Client::with_context`]; idle connections are closed only once the
    /// last of them is closed or dropped.
    pub fn close(self) {
        tracing::debug!(base_url = %self.base_url, "qdrant client closed");
        self.transport.close();
    }

    /// Run a prepared request and decode its JSON envelope
    pub async fn execute_json<T>(&self, request: PreparedRequest) -> Result<Envelope<T>>
    where
        T: DeserializeOwned,
    {
        response::decode(&self.transport, request).await
    }

    /// Run a prepared request and return its body unread
    pub async fn execute_stream(&self, request: PreparedRequest) -> Result<ByteStream> {
        response::stream(&self.transport, request).await
    }

    pub(crate) async fn send_json<B, T>(
        &self,
        call: CallSite,
        body: Option<&B>,
    ) -> Result<Envelope<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(call, body)?;
        self.execute_json(request).await
    }

    pub(crate) async fn download(&self, call: CallSite) -> Result<ByteStream> {
        let request = self.request(call, crate::request::NO_BODY)?;
        self.execute_stream(request).await
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("context", &self.context)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClientError, ConfigError, TlsOptions};

    #[test]
    fn test_new_resolves_base_url() {
        let client = Client::new(&ConnectionConfig::new("localhost").with_port(0)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:6333");

        let client = Client::new(
            &ConnectionConfig::new("qdrant.example.com").with_tls(TlsOptions::default()),
        )
        .unwrap();
        assert_eq!(client.base_url(), "https://qdrant.example.com:6333");
    }

    #[test]
    fn test_new_rejects_missing_host() {
        let err = Client::new(&ConnectionConfig::new("")).unwrap_err();
        assert!(matches!(err, ClientError::Config(ConfigError::MissingHost)));
    }

    #[test]
    fn test_with_context_keeps_connection_settings() {
        let client = Client::new(&ConnectionConfig::new("localhost").with_api_key("k")).unwrap();
        let token = tokio_util::sync::CancellationToken::new();
        token.cancel();

        let scoped = client.with_context(RequestContext::new().with_cancellation(token));
        assert_eq!(scoped.base_url(), client.base_url());
        assert_eq!(scoped.api_key.as_deref(), Some("k"));
        assert!(scoped.context().is_cancelled());
        assert!(!client.context().is_cancelled());
    }

    #[test]
    fn test_close_leaves_scoped_handles_usable() {
        let client = Client::new(&ConnectionConfig::new("localhost")).unwrap();
        let scoped = client.with_context(RequestContext::new());
        client.close();

        let request = scoped
            .request(
                CallSite::new("cluster_info", reqwest::Method::GET, "/cluster"),
                crate::request::NO_BODY,
            )
            .unwrap();
        assert_eq!(request.url().as_str(), "http://localhost:6333/cluster");
        scoped.close();
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let client =
            Client::new(&ConnectionConfig::new("localhost").with_api_key("hunter2")).unwrap();
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_client_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Client>();
    }
}
