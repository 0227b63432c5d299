//! Transfer session state and the relaying byte stream.
//!
//! One [`TransferSession`] exists per in-flight download. The
//! [`RelayStream`] wraps the upstream byte stream and is handed to the
//! HTTP body layer, whose own polling provides backpressure: chunks are
//! pulled from upstream only as fast as the client accepts them, and the
//! payload is never buffered whole.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use parking_lot::Mutex;
use tracing::{debug, error};

use crate::youtube::source::SourceError;

/// Terminal state of one transfer. Mutually exclusive, reached once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Upstream stream ended normally.
    Complete,
    /// Upstream reported an error mid-stream; connection closed.
    UpstreamFailed,
    /// Client disconnected; upstream stream torn down.
    ClientAborted,
}

/// Live state of one active relay, shared between the stream and
/// observers. Created when streaming begins, dropped when either side
/// closes.
#[derive(Debug, Default)]
pub struct TransferSession {
    bytes_relayed: AtomicU64,
    outcome: Mutex<Option<TransferOutcome>>,
}

impl TransferSession {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Bytes relayed to the client so far.
    pub fn bytes_relayed(&self) -> u64 {
        self.bytes_relayed.load(Ordering::SeqCst)
    }

    /// Terminal outcome, once one has been reached.
    pub fn outcome(&self) -> Option<TransferOutcome> {
        *self.outcome.lock()
    }

    fn add_bytes(&self, count: u64) {
        self.bytes_relayed.fetch_add(count, Ordering::SeqCst);
    }

    /// First recorded outcome wins; later transitions are ignored.
    fn record(&self, outcome: TransferOutcome) {
        let mut slot = self.outcome.lock();
        if slot.is_none() {
            *slot = Some(outcome);
        }
    }
}

/// Relays an upstream byte stream to the HTTP response body.
///
/// Chunks pass through unchanged and in order. Dropping the relay before
/// the upstream ends (the body layer drops it when the client
/// disconnects) records a client abort and drops the upstream stream,
/// which aborts the in-flight upstream connection.
pub struct RelayStream<S> {
    upstream: S,
    session: Arc<TransferSession>,
    finished: bool,
}

impl<S> RelayStream<S> {
    pub fn new(upstream: S, session: Arc<TransferSession>) -> Self {
        Self {
            upstream,
            session,
            finished: false,
        }
    }
}

impl<S> Stream for RelayStream<S>
where
    S: Stream<Item = Result<Bytes, SourceError>> + Unpin,
{
    type Item = Result<Bytes, SourceError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        match Pin::new(&mut this.upstream).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.session.add_bytes(chunk.len() as u64);
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(upstream_error))) => {
                // Response headers are already on the wire at this point;
                // the only option left is to end the body and let the
                // connection close.
                error!(
                    error = %upstream_error,
                    bytes_relayed = this.session.bytes_relayed(),
                    "upstream stream failed mid-transfer"
                );
                this.finished = true;
                this.session.record(TransferOutcome::UpstreamFailed);
                Poll::Ready(Some(Err(upstream_error)))
            }
            Poll::Ready(None) => {
                debug!(
                    bytes_relayed = this.session.bytes_relayed(),
                    "transfer complete"
                );
                this.finished = true;
                this.session.record(TransferOutcome::Complete);
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<S> Drop for RelayStream<S> {
    fn drop(&mut self) {
        if !self.finished {
            debug!(
                bytes_relayed = self.session.bytes_relayed(),
                "client disconnected mid-transfer, tearing down upstream"
            );
            self.session.record(TransferOutcome::ClientAborted);
            // Dropping `upstream` here aborts the in-flight connection.
        }
    }
}
