use std::future::Future;

use qdrant_http_core::{ConfigError, TransportConfig};

use crate::request::{CallSite, PreparedRequest, RequestContext};
use crate::{ClientError, TransportErrorKind};

/// Pooled keep-alive HTTP transport shared by every call of a client.
///
/// Pooling and its locking live inside `reqwest::Client`; cloning a
/// `Transport` shares the pool.
#[derive(Debug, Clone)]
pub struct Transport {
    http: reqwest::Client,
    config: TransportConfig,
}

/// A failure below HTTP, before the call site is attached
#[derive(Debug)]
pub(crate) struct TransportFailure {
    kind: TransportErrorKind,
    source: Option<reqwest::Error>,
}

impl TransportFailure {
    pub(crate) fn cancelled() -> Self {
        Self {
            kind: TransportErrorKind::Cancelled,
            source: None,
        }
    }

    pub(crate) fn deadline_elapsed() -> Self {
        Self {
            kind: TransportErrorKind::Timeout,
            source: None,
        }
    }

    /// Failure while reading an already received body
    pub(crate) fn body(source: reqwest::Error) -> Self {
        let kind = if source.is_timeout() {
            TransportErrorKind::Timeout
        } else {
            TransportErrorKind::Body
        };
        Self {
            kind,
            source: Some(source),
        }
    }

    pub(crate) fn into_client_error(self, call: CallSite) -> ClientError {
        ClientError::Transport {
            call,
            kind: self.kind,
            source: self.source,
        }
    }
}

impl From<reqwest::Error> for TransportFailure {
    fn from(source: reqwest::Error) -> Self {
        let kind = if source.is_timeout() {
            TransportErrorKind::Timeout
        } else if source.is_connect() {
            TransportErrorKind::Connect
        } else if source.is_body() || source.is_decode() {
            TransportErrorKind::Body
        } else {
            TransportErrorKind::Other
        };
        Self {
            kind,
            source: Some(source),
        }
    }
}

impl Transport {
    pub fn new(config: &TransportConfig) -> Result<Self, ConfigError> {
        let mut builder = reqwest::Client::builder()
            .pool_idle_timeout(config.idle_timeout)
            .pool_max_idle_per_host(config.max_idle_per_host)
            .timeout(config.request_timeout);

        if let Some(tls) = &config.tls {
            if tls.insecure_skip_verify {
                tracing::warn!("TLS certificate verification is disabled");
                builder = builder.danger_accept_invalid_certs(true);
            }
            if let Some(path) = &tls.ca_cert_path {
                let pem = std::fs::read(path).map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })?;
                let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                    ConfigError::InvalidCertificate {
                        path: path.clone(),
                        source: Box::new(e),
                    }
                })?;
                builder = builder.add_root_certificate(cert);
            }
        }

        let http = builder
            .build()
            .map_err(|e| ConfigError::Transport(Box::new(e)))?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Send a prepared request, honouring its context's cancellation and deadline.
    ///
    /// Any HTTP status is a successful execution; only failures to obtain a
    /// response are errors.
    pub async fn execute(&self, request: PreparedRequest) -> crate::Result<reqwest::Response> {
        let (call, request, context) = request.into_parts();
        guarded(&context, self.send(request))
            .await
            .map_err(|failure| failure.into_client_error(call))
    }

    pub(crate) async fn send(
        &self,
        request: reqwest::Request,
    ) -> Result<reqwest::Response, TransportFailure> {
        Ok(self.http.execute(request).await?)
    }

    /// Drop this handle to the pool; idle sockets close with the last handle
    pub fn close(self) {
        drop(self.http);
    }
}

/// Race `fut` against the context's cancellation token and deadline.
///
/// A context that is already cancelled, or whose deadline has passed, fails
/// without polling `fut`, so nothing is sent.
pub(crate) async fn guarded<T, F>(context: &RequestContext, fut: F) -> Result<T, TransportFailure>
where
    F: Future<Output = Result<T, TransportFailure>>,
{
    let cancel = context.cancellation_token();
    if cancel.is_cancelled() {
        return Err(TransportFailure::cancelled());
    }
    if context
        .deadline()
        .is_some_and(|deadline| deadline <= std::time::Instant::now())
    {
        return Err(TransportFailure::deadline_elapsed());
    }

    let bounded = async {
        match context.deadline() {
            Some(deadline) => {
                let deadline = tokio::time::Instant::from_std(deadline);
                match tokio::time::timeout_at(deadline, fut).await {
                    Ok(result) => result,
                    Err(_) => Err(TransportFailure::deadline_elapsed()),
                }
            }
            None => fut.await,
        }
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(TransportFailure::cancelled()),
        result = bounded => result,
    }
}
