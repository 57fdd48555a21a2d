//! See [`MessageAccumulator`].

use std::fmt;

use qc_transport::StreamEvent;
use tracing::{debug, trace, warn};

use crate::{Conversation, Rejection, Turn, TurnId};

/// Where the accumulator is in the life of an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    /// No exchange in flight; submissions are accepted.
    #[default]
    Idle,

    /// The user turn and the assistant placeholder were appended, but no
    /// session is open yet.
    Composing,

    /// A session is open, nothing was received yet.
    AwaitingFirstByte,

    /// At least one text or source event was applied.
    Accumulating,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Composing => "composing",
            Self::AwaitingFirstByte => "awaiting_first_byte",
            Self::Accumulating => "accumulating",
        })
    }
}

/// The effect of applying one [`StreamEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// There was no exchange in flight; the event was dropped.
    Ignored,

    /// The in-flight turn was updated.
    Continue,

    /// The in-flight turn is complete.
    Finalized(TurnId),

    /// The exchange failed; the assistant placeholder was removed.
    Failed(String),
}

/// The turns appended by an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted {
    pub user: TurnId,
    pub assistant: TurnId,

    /// The submitted text, trimmed.
    pub utterance: String,
}

/// The conversation state machine.
///
/// Owns the [`Conversation`] and the single in-flight assistant turn. Text
/// deltas are appended verbatim, source lists replace the turn's sources,
/// `End` finalizes the turn and `Error` removes it again, leaving the user's
/// turn in place. Only one exchange can be in flight at a time.
#[derive(Debug, Default)]
pub struct MessageAccumulator {
    conversation: Conversation,
    state: State,

    /// Index of the in-flight assistant turn in the conversation.
    in_flight: Option<usize>,
}

impl MessageAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    #[must_use]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// The assistant turn currently being received, if any.
    #[must_use]
    pub fn in_flight(&self) -> Option<&Turn> {
        self.in_flight.and_then(|index| self.conversation.turn(index))
    }

    /// Submit a user utterance.
    ///
    /// The text is trimmed. Empty text is rejected, as is any submission
    /// while an exchange is in flight; in both cases nothing changes.
    /// Otherwise a user turn and an empty assistant placeholder are appended
    /// and the accumulator moves to [`State::Composing`].
    pub fn submit(&mut self, text: &str) -> Result<Submitted, Rejection> {
        let utterance = text.trim();
        if utterance.is_empty() {
            debug!("Ignoring empty submission.");
            return Err(Rejection::Empty);
        }

        if self.state != State::Idle {
            debug!(state = %self.state, "Ignoring submission while an answer is in flight.");
            return Err(Rejection::Busy);
        }

        let user = self.conversation.next_id();
        self.conversation
            .push(Turn::user(user, utterance.to_owned()));

        let assistant = self.conversation.next_id();
        let index = self.conversation.push(Turn::placeholder(assistant));
        self.in_flight = Some(index);

        self.transition(State::Composing);

        Ok(Submitted {
            user,
            assistant,
            utterance: utterance.to_owned(),
        })
    }

    /// Record that a session was opened for the submitted turn.
    pub fn session_opened(&mut self) {
        if self.state == State::Composing {
            self.transition(State::AwaitingFirstByte);
        }
    }

    /// Apply one event to the in-flight turn.
    pub fn apply(&mut self, event: StreamEvent) -> Step {
        let Some(index) = self.in_flight else {
            trace!(kind = event.kind(), "No answer in flight, dropping event.");
            return Step::Ignored;
        };

        match event {
            StreamEvent::TextDelta { content } => {
                if let Some(turn) = self.conversation.turn_mut(index) {
                    turn.push_text(&content);
                }

                self.transition(State::Accumulating);
                Step::Continue
            }
            StreamEvent::SourceList { sources } => {
                trace!(count = sources.len(), "Replacing sources of in-flight turn.");
                if let Some(turn) = self.conversation.turn_mut(index) {
                    turn.sources_mut().replace(sources);
                }

                self.transition(State::Accumulating);
                Step::Continue
            }
            StreamEvent::End => {
                self.in_flight = None;
                self.transition(State::Idle);

                let Some(turn) = self.conversation.turn_mut(index) else {
                    return Step::Ignored;
                };

                turn.finalize();
                debug!(
                    id = %turn.id(),
                    length = turn.text().len(),
                    sources = turn.sources().len(),
                    "Answer finalized."
                );

                Step::Finalized(turn.id())
            }
            StreamEvent::Error { message } => {
                warn!(%message, "Answer failed, discarding partial turn.");
                self.discard(index);
                Step::Failed(message)
            }
        }
    }

    /// Abandon the in-flight exchange, discarding the partial turn.
    ///
    /// Returns `false` if there was nothing to abandon.
    pub fn abandon(&mut self) -> bool {
        let Some(index) = self.in_flight else {
            return false;
        };

        debug!("Abandoning answer in flight.");
        self.discard(index);
        true
    }

    /// Remove every turn, abandoning any exchange in flight.
    pub fn clear(&mut self) {
        self.abandon();
        self.conversation.clear();
    }

    fn discard(&mut self, index: usize) {
        self.conversation.remove(index);
        self.in_flight = None;
        self.transition(State::Idle);
    }

    fn transition(&mut self, state: State) {
        if self.state != state {
            trace!(from = %self.state, to = %state, "State transition.");
            self.state = state;
        }
    }
}

#[cfg(test)]
#[path = "accumulator_tests.rs"]
mod tests;
