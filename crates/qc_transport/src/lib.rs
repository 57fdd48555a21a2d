//! Streaming transport for assistant answers.
//!
//! A [`Transport`] opens one [`Session`] per user turn. The session is a lazy,
//! cancellable [`Stream`] of [`StreamEvent`]s which always ends in exactly
//! one [`StreamEvent::End`] or [`StreamEvent::Error`].
//!
//! [`Stream`]: futures::Stream

mod client;
mod error;
mod event;
pub mod mock;
mod session;
mod sse;
pub mod types;

pub use client::Client;
pub use error::Error;
pub use event::StreamEvent;
pub use session::{EventStream, Session, Transport};
pub use tokio_util::sync::CancellationToken;
pub use types::request::ChatRequest;
