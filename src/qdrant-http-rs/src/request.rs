use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::client::Client;
use crate::{ClientError, Result};

/// Header carrying the API key on every authenticated request
pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("api-key");

/// Identifies one pipeline call in errors and traces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub operation: &'static str,
    pub method: Method,
    /// Path relative to the base URL, already escaped
    pub path: String,
}

impl CallSite {
    pub fn new(operation: &'static str, method: Method, path: impl Into<String>) -> Self {
        Self {
            operation,
            method,
            path: path.into(),
        }
    }
}

impl std::fmt::Display for CallSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} {})", self.operation, self.method, self.path)
    }
}

/// Cancellation and deadline governing the calls made through a client.
///
/// Bound with [`Client::with_context`]; the default context is never
/// cancelled and relies on the transport's request timeout alone.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Calls started after `deadline` fail with a timeout before anything is sent
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// A fully addressed request, built per call and consumed by execution
#[derive(Debug)]
pub struct PreparedRequest {
    call: CallSite,
    inner: reqwest::Request,
    context: RequestContext,
}

impl PreparedRequest {
    pub fn call(&self) -> &CallSite {
        &self.call
    }

    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    pub fn url(&self) -> &Url {
        self.inner.url()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// The buffered request body, if any
    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.inner.body().and_then(|body| body.as_bytes())
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    pub(crate) fn into_parts(self) -> (CallSite, reqwest::Request, RequestContext) {
        (self.call, self.inner, self.context)
    }
}

/// Placeholder body type for calls that send nothing
pub const NO_BODY: Option<&()> = None;

impl Client {
    /// Build a request for `call`, appending its path to the base URL verbatim.
    ///
    /// The API key, when configured, is attached as the `api-key` header and a
    /// body, when given, is serialized as JSON. Fails only when the URL, key or
    /// body cannot be turned into a valid HTTP request.
    pub fn request<B>(&self, call: CallSite, body: Option<&B>) -> Result<PreparedRequest>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url(), call.path);
        let mut builder = self.transport.http().request(call.method.clone(), url);

        if let Some(key) = self.api_key.as_deref() {
            let mut value = match HeaderValue::from_str(key) {
                Ok(value) => value,
                Err(e) => return Err(construction_error(call, e)),
            };
            value.set_sensitive(true);
            builder = builder.header(API_KEY_HEADER, value);
        }

        if let Some(body) = body {
            let bytes = match serde_json::to_vec(body) {
                Ok(bytes) => bytes,
                Err(e) => return Err(construction_error(call, e)),
            };
            builder = builder
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(bytes);
        }

        match builder.build() {
            Ok(inner) => Ok(PreparedRequest {
                call,
                inner,
                context: self.context().clone(),
            }),
            Err(e) => Err(construction_error(call, e)),
        }
    }
}

fn construction_error(
    call: CallSite,
    source: impl std::error::Error + Send + Sync + 'static,
) -> ClientError {
    ClientError::RequestConstruction {
        call,
        source: Box::new(source),
    }
}
