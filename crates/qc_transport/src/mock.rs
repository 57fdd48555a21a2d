//! Scripted transport for testing conversation logic without a backend.
//!
//! # Example
//!
//! ```ignore
//! use qc_transport::{StreamEvent, mock::MockTransport};
//!
//! let transport = MockTransport::with_chunked_answer(&["Hello", " world"]);
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use futures::{StreamExt as _, stream};
use qc_source::SourceRef;
use tokio_util::sync::CancellationToken;

use crate::{Session, StreamEvent, Transport, types::request::ChatRequest};

/// A transport returning a predetermined list of events for every session.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    events: Vec<StreamEvent>,

    /// Keep the session open after the scripted events, instead of ending
    /// the stream.
    hang: bool,

    /// Requests received so far.
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl MockTransport {
    #[must_use]
    pub fn new(events: Vec<StreamEvent>) -> Self {
        Self {
            events,
            ..Default::default()
        }
    }

    /// Stream `chunks` as separate text deltas, followed by `End`.
    #[must_use]
    pub fn with_chunked_answer(chunks: &[&str]) -> Self {
        let mut events = chunks
            .iter()
            .map(|&chunk| StreamEvent::text(chunk))
            .collect::<Vec<_>>();

        events.push(StreamEvent::End);
        Self::new(events)
    }

    /// Stream `answer` as a single delta, then `sources`, then `End`.
    #[must_use]
    pub fn with_cited_answer(answer: &str, sources: Vec<SourceRef>) -> Self {
        Self::new(vec![
            StreamEvent::text(answer),
            StreamEvent::sources(sources),
            StreamEvent::End,
        ])
    }

    /// Fail immediately with `message`.
    #[must_use]
    pub fn with_error(message: &str) -> Self {
        Self::new(vec![StreamEvent::error(message)])
    }

    /// Never finish the stream after the scripted events.
    #[must_use]
    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    /// The requests that opened a session on this transport, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Transport for MockTransport {
    fn open(&self, request: &ChatRequest, cancel: CancellationToken) -> Session {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let events = stream::iter(self.events.clone());
        if self.hang {
            return Session::new(Box::pin(events.chain(stream::pending())), cancel);
        }

        Session::new(Box::pin(events), cancel)
    }
}

#[cfg(test)]
#[path = "mock_tests.rs"]
mod tests;
