//! See [`Chat`].

use futures::StreamExt as _;
use qc_transport::{CancellationToken, ChatRequest, Transport};
use tracing::{debug, info};

use crate::{MessageAccumulator, Rejection, Step, Turn, TurnId};

/// How an exchange ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The answer was received in full.
    Finalized(TurnId),

    /// The exchange failed; the partial answer was discarded.
    Failed(String),

    /// The exchange was cancelled; the partial answer was discarded.
    Cancelled,
}

/// Drives exchanges between a [`MessageAccumulator`] and a [`Transport`].
#[derive(Debug)]
pub struct Chat<T> {
    transport: T,
    bot: String,
    chat_id: Option<u64>,
    accumulator: MessageAccumulator,
}

impl<T: Transport> Chat<T> {
    #[must_use]
    pub fn new(transport: T, bot: impl Into<String>) -> Self {
        Self {
            transport,
            bot: bot.into(),
            chat_id: None,
            accumulator: MessageAccumulator::new(),
        }
    }

    /// Forward `chat_id` to the backend with every message.
    #[must_use]
    pub fn with_chat_id(mut self, chat_id: Option<u64>) -> Self {
        self.chat_id = chat_id;
        self
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[must_use]
    pub fn accumulator(&self) -> &MessageAccumulator {
        &self.accumulator
    }

    /// Remove every turn of the conversation.
    pub fn clear(&mut self) {
        self.accumulator.clear();
    }

    /// Submit `text` and stream the answer into the conversation.
    ///
    /// `on_update` is called with the in-flight assistant turn after every
    /// applied event that changed it. Cancelling `cancel` ends the exchange at
    /// the next event boundary and discards the partial answer.
    pub async fn send<F>(
        &mut self,
        text: &str,
        cancel: CancellationToken,
        mut on_update: F,
    ) -> Result<Outcome, Rejection>
    where
        F: FnMut(&Turn),
    {
        let submitted = self.accumulator.submit(text)?;
        let request =
            ChatRequest::new(&self.bot, submitted.utterance).with_chat_id(self.chat_id);

        info!(bot = %self.bot, turn = %submitted.assistant, "Sending message.");
        let mut session = self.transport.open(&request, cancel);

        // Dropping this future mid-exchange must not leave a turn in flight.
        let mut exchange = Exchange(&mut self.accumulator);
        exchange.0.session_opened();

        while let Some(event) = session.next().await {
            match exchange.0.apply(event) {
                Step::Continue => {
                    if let Some(turn) = exchange.0.in_flight() {
                        on_update(turn);
                    }
                }
                Step::Finalized(id) => return Ok(Outcome::Finalized(id)),
                Step::Failed(message) => return Ok(Outcome::Failed(message)),
                Step::Ignored => {}
            }
        }

        debug!(turn = %submitted.assistant, "Session ended without a terminal event.");
        Ok(Outcome::Cancelled)
    }
}

/// Abandons the exchange in flight, if any, when dropped.
struct Exchange<'a>(&'a mut MessageAccumulator);

impl Drop for Exchange<'_> {
    fn drop(&mut self) {
        if self.0.abandon() {
            debug!("Exchange ended before its answer, partial answer discarded.");
        }
    }
}

#[cfg(test)]
#[path = "chat_tests.rs"]
mod tests;
