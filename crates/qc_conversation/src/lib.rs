//! Conversation state and the accumulation of streamed answers.
//!
//! The [`MessageAccumulator`] owns a [`Conversation`] and folds the events of
//! one streaming session at a time into its in-flight assistant [`Turn`].
//! [`Chat`] wires an accumulator to a [`Transport`].
//!
//! [`Transport`]: qc_transport::Transport

mod accumulator;
mod chat;
mod conversation;
mod error;
mod turn;

pub use accumulator::{MessageAccumulator, State, Step, Submitted};
pub use chat::{Chat, Outcome};
pub use conversation::Conversation;
pub use error::Rejection;
pub use turn::{Role, Turn, TurnId};
