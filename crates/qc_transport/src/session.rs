//! See [`Session`].

use std::{
    fmt,
    pin::Pin,
    task::{Context, Poll},
};

use futures::{FutureExt as _, Stream, StreamExt as _};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};
use tracing::{debug, trace};

use crate::{StreamEvent, types::request::ChatRequest};

/// The raw, unchecked events produced by a transport.
pub type EventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

/// Opens streaming sessions against a backend.
pub trait Transport: Send + Sync {
    /// Open a new session for `request`.
    ///
    /// Opening is lazy: nothing happens on the network until the returned
    /// session is first polled. Cancelling `cancel` ends the session at the
    /// next event boundary.
    fn open(&self, request: &ChatRequest, cancel: CancellationToken) -> Session;
}

/// One streaming exchange with the backend.
///
/// A session upholds the following contract on top of the events produced by
/// its transport:
///
/// - events are yielded in the order the transport produced them,
/// - the sequence ends with exactly one [`StreamEvent::End`] or
///   [`StreamEvent::Error`], after which the session yields `None`,
/// - a transport that stops without a terminal event is reported as
///   [`StreamEvent::Error`],
/// - once cancelled, the session yields `None` without delivering any
///   further events, and the underlying stream is dropped.
pub struct Session {
    events: Option<EventStream>,
    cancel: CancellationToken,
    cancelled: Pin<Box<WaitForCancellationFutureOwned>>,
}

impl Session {
    /// Message reported when the transport stops before a terminal event.
    pub const UNEXPECTED_END: &'static str = "response stream ended unexpectedly";

    #[must_use]
    pub fn new(events: EventStream, cancel: CancellationToken) -> Self {
        Self {
            events: Some(events),
            cancelled: Box::pin(cancel.clone().cancelled_owned()),
            cancel,
        }
    }

    /// Build a session from a fixed list of events.
    #[must_use]
    pub fn from_events(events: Vec<StreamEvent>, cancel: CancellationToken) -> Self {
        Self::new(Box::pin(futures::stream::iter(events)), cancel)
    }

    /// Cancel the session and release the underlying stream.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.release();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Returns `true` once the session can no longer yield events.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.events.is_none()
    }

    fn release(&mut self) {
        if self.events.take().is_some() {
            trace!("Released response stream.");
        }
    }
}

impl Stream for Session {
    type Item = StreamEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.events.is_none() {
            return Poll::Ready(None);
        }

        if this.cancelled.poll_unpin(cx).is_ready() {
            debug!("Session cancelled.");
            this.release();
            return Poll::Ready(None);
        }

        let Some(events) = this.events.as_mut() else {
            return Poll::Ready(None);
        };

        match events.poll_next_unpin(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(event)) => {
                trace!(kind = event.kind(), "Received stream event.");
                if event.is_terminal() {
                    this.release();
                }

                Poll::Ready(Some(event))
            }
            Poll::Ready(None) => {
                debug!("Response stream ended without a terminal event.");
                this.release();
                Poll::Ready(Some(StreamEvent::error(Self::UNEXPECTED_END)))
            }
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("finished", &self.is_finished())
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
