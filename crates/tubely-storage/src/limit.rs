//! Byte ceiling for upload streams.
//!
//! Declared sizes can be forged, so the ceiling is enforced on the bytes that
//! actually flow from the client to the backend.

use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

/// Marker carried inside the `io::Error` returned once a stream crosses its ceiling.
#[derive(Debug, thiserror::Error)]
#[error("stream exceeded the {limit} byte limit")]
pub struct LimitExceeded {
    pub limit: u64,
}

/// Returns the configured limit if `err` was raised by a [`BoundedReader`].
pub fn exceeded_limit(err: &io::Error) -> Option<u64> {
    err.get_ref()
        .and_then(|inner| inner.downcast_ref::<LimitExceeded>())
        .map(|exceeded| exceeded.limit)
}

/// `AsyncRead` adapter that fails as soon as more than `limit` bytes have been read.
///
/// The read that crosses the ceiling yields an error instead of data, so a
/// consumer copying from this reader never receives more than `limit` bytes.
pub struct BoundedReader<R> {
    inner: R,
    limit: u64,
    consumed: u64,
}

impl<R> BoundedReader<R> {
    pub fn new(inner: R, limit: u64) -> Self {
        Self {
            inner,
            limit,
            consumed: 0,
        }
    }

    /// Bytes handed out so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for BoundedReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        ready!(Pin::new(&mut this.inner).poll_read(cx, buf))?;

        let read = (buf.filled().len() - before) as u64;
        if this.consumed + read > this.limit {
            buf.set_filled(before);
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::InvalidData,
                LimitExceeded { limit: this.limit },
            )));
        }
        this.consumed += read;
        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_passes_through_streams_within_limit() {
        let mut reader = BoundedReader::new(&b"hello"[..], 5);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).await.unwrap();
        assert_eq!(out, b"hello");
        assert_eq!(reader.consumed(), 5);
    }

    #[tokio::test]
    async fn test_never_hands_out_more_than_limit() {
        let mut reader = BoundedReader::new(tokio::io::repeat(7).take(10_000), 4096);
        let mut out = Vec::new();
        let err = reader.read_to_end(&mut out).await.unwrap_err();

        assert_eq!(exceeded_limit(&err), Some(4096));
        assert!(out.len() as u64 <= 4096);
        assert!(reader.consumed() <= 4096);
    }

    #[test]
    fn test_other_io_errors_are_not_mistaken_for_limit() {
        let err = io::Error::new(io::ErrorKind::InvalidData, "bad data");
        assert_eq!(exceeded_limit(&err), None);
    }
}
