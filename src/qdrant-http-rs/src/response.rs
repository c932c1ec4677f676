//! Response resolution: classify an executed request and decode or stream it.
//!
//! Decoded calls buffer the whole body before returning, so the response is
//! always consumed (and its connection released) whichever way the call ends.
//! Streamed calls hand the unread body to the caller on success.

use bytes::Bytes;
use qdrant_http_core::Envelope;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::request::PreparedRequest;
use crate::stream::ByteStream;
use crate::transport::{guarded, Transport, TransportFailure};
use crate::{ClientError, Result};

/// Execute `request` and decode its body as `Envelope<T>`.
///
/// Sending and reading the body both run under the request's context.
#[tracing::instrument(level = "debug", skip_all, fields(call = %request.call()))]
pub(crate) async fn decode<T>(
    transport: &Transport,
    request: PreparedRequest,
) -> Result<Envelope<T>>
where
    T: DeserializeOwned,
{
    let (call, inner, context) = request.into_parts();
    tracing::debug!("sending request");

    let (status, body) = guarded(&context, async move {
        let response = transport.send(inner).await?;
        let status = response.status();
        let body = response.bytes().await.map_err(TransportFailure::body)?;
        Ok::<_, TransportFailure>((status, body))
    })
    .await
    .map_err(|failure| failure.into_client_error(call.clone()))?;

    tracing::debug!(status = status.as_u16(), bytes = body.len(), "response received");

    if !status.is_success() {
        return Err(unexpected_status(call, status, &body));
    }

    serde_json::from_slice(&body).map_err(|source| ClientError::Decode { call, source })
}

/// Execute `request` and return the body as an unread stream.
///
/// On a non-success status the body is drained into the error instead.
#[tracing::instrument(level = "debug", skip_all, fields(call = %request.call()))]
pub(crate) async fn stream(transport: &Transport, request: PreparedRequest) -> Result<ByteStream> {
    let call = request.call().clone();
    let context = request.context().clone();
    tracing::debug!("sending request");

    let response = transport.execute(request).await?;
    let status = response.status();
    tracing::debug!(
        status = status.as_u16(),
        content_length = ?response.content_length(),
        "response received"
    );

    if !status.is_success() {
        let body = guarded(&context, async move {
            response.bytes().await.map_err(TransportFailure::body)
        })
        .await
        .map_err(|failure| failure.into_client_error(call.clone()))?;
        return Err(unexpected_status(call, status, &body));
    }

    Ok(ByteStream::new(response, context.cancellation_token().clone()))
}

fn unexpected_status(call: crate::CallSite, status: StatusCode, body: &Bytes) -> ClientError {
    ClientError::UnexpectedStatus {
        call,
        code: status.as_u16(),
        body: String::from_utf8_lossy(body).into_owned(),
    }
}
