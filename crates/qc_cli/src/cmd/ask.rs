use std::io;

use qc_citation::citations;
use qc_conversation::{Chat, Outcome, Turn};
use qc_source::SourceRef;
use qc_transport::CancellationToken;
use serde::Serialize;
use tracing::warn;

use crate::{
    Ctx, Error, Result,
    cmd::Success,
    render::{AnswerPrinter, write_cited_sources},
    signals::CancelOnInterrupt,
};

#[derive(Debug, clap::Args)]
pub(crate) struct Ask {
    /// The question to ask.
    #[arg(required = true, num_args = 1..)]
    question: Vec<String>,

    /// The bot to ask. Defaults to the `chat.bot` configuration.
    #[arg(short, long)]
    bot: Option<String>,
}

impl Ask {
    pub(crate) async fn run(self, ctx: &mut Ctx) -> Result<Success> {
        let question = self.question.join(" ");
        let bot = self.bot.unwrap_or_else(|| ctx.config.chat.bot.clone());
        let mut chat = Chat::new(ctx.client()?, bot).with_chat_id(ctx.config.chat.chat_id);

        let stream_to_terminal = ctx.is_tty;
        let mut printer = AnswerPrinter::new(ctx.colors);
        let mut stdout = io::stdout();

        let cancel = CancellationToken::new();
        let interrupt = CancelOnInterrupt::new(&cancel);
        let outcome = chat
            .send(&question, cancel, |turn| {
                if !stream_to_terminal {
                    return;
                }

                if let Err(error) = printer.update(turn, &mut stdout) {
                    warn!(%error, "Failed to write answer.");
                }
            })
            .await?;
        drop(interrupt);

        let id = match outcome {
            Outcome::Finalized(id) => id,
            Outcome::Failed(message) => return Err(Error::Answer(message)),
            Outcome::Cancelled => return Err(Error::Cancelled),
        };

        let Some(turn) = chat.accumulator().conversation().get(id) else {
            return Ok(Success::Ok);
        };

        if !ctx.is_tty {
            return Ok(serde_json::to_value(AnswerOutput::new(&question, turn))?.into());
        }

        printer.finish(turn, &mut stdout)?;
        write_cited_sources(turn, ctx.colors, &mut stdout)?;

        Ok(Success::Ok)
    }
}

/// Machine readable form of an answer.
#[derive(Debug, Serialize)]
struct AnswerOutput<'a> {
    question: &'a str,
    answer: &'a str,
    sources: &'a [SourceRef],
    citations: Vec<CitationOutput<'a>>,
}

#[derive(Debug, Serialize)]
struct CitationOutput<'a> {
    ordinal: usize,
    marker: &'a str,
    start: usize,
    end: usize,
}

impl<'a> AnswerOutput<'a> {
    fn new(question: &'a str, turn: &'a Turn) -> Self {
        Self {
            question,
            answer: turn.text(),
            sources: turn.sources().as_slice(),
            citations: citations(turn.text(), turn.sources())
                .map(|citation| CitationOutput {
                    ordinal: citation.ordinal,
                    marker: citation.marker,
                    start: citation.span.start,
                    end: citation.span.end,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
#[path = "ask_tests.rs"]
mod tests;
