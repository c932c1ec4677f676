use bytes::{Bytes, BytesMut};
use futures::stream::{BoxStream, Stream, StreamExt, TryStreamExt};
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::io::StreamReader;
use tokio_util::sync::CancellationToken;

/// Upper bound on the buffer reserved up front by [`ByteStream::into_bytes`]
const MAX_PREALLOCATE: u64 = 8 * 1024 * 1024;

/// Body of a snapshot download, read lazily from the open connection.
///
/// The caller owns the stream; dropping it closes the underlying response.
/// If the client's cancellation token fires mid-download the stream yields a
/// single `Interrupted` error and ends.
pub struct ByteStream {
    inner: BoxStream<'static, io::Result<Bytes>>,
    content_length: Option<u64>,
}

impl std::fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteStream")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

impl ByteStream {
    pub(crate) fn new(response: reqwest::Response, cancel: CancellationToken) -> Self {
        let content_length = response.content_length();
        let body = response.bytes_stream().map_err(body_error).boxed();
        Self::from_stream(body, cancel, content_length)
    }

    fn from_stream(
        body: BoxStream<'static, io::Result<Bytes>>,
        cancel: CancellationToken,
        content_length: Option<u64>,
    ) -> Self {
        let inner = futures::stream::unfold(Some((body, cancel)), |state| async move {
            let (mut body, cancel) = state?;
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                chunk = body.next() => Some(chunk),
            };
            match next {
                None => Some((
                    Err(io::Error::new(io::ErrorKind::Interrupted, "download cancelled")),
                    None,
                )),
                Some(chunk) => chunk.map(|chunk| (chunk, Some((body, cancel)))),
            }
        })
        .boxed();

        Self {
            inner,
            content_length,
        }
    }

    /// Size announced by the server, when it sent a `Content-Length`
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// Adapt the stream into an `AsyncRead`
    pub fn into_reader(self) -> impl AsyncRead + Send + Unpin {
        StreamReader::new(self)
    }

    /// Copy the whole body into `writer`, returning the number of bytes written
    pub async fn copy_to<W>(self, writer: &mut W) -> io::Result<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut reader = self.into_reader();
        tokio::io::copy(&mut reader, writer).await
    }

    /// Buffer the whole body in memory; meant for small artifacts only.
    ///
    /// The announced length only seeds the buffer, capped at
    /// `MAX_PREALLOCATE` bytes.
    pub async fn into_bytes(mut self) -> io::Result<Bytes> {
        let capacity = self
            .content_length
            .map_or(0, |len| len.min(MAX_PREALLOCATE) as usize);
        let mut buf = BytesMut::with_capacity(capacity);
        while let Some(chunk) = self.inner.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }
}

/// Timeouts keep their kind so callers can tell them from resets
fn body_error(source: reqwest::Error) -> io::Error {
    if source.is_timeout() {
        io::Error::new(io::ErrorKind::TimedOut, source)
    } else {
        io::Error::other(source)
    }
}

impl Stream for ByteStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}
