use std::{
    io::{self, Write},
    num::NonZeroUsize,
};

use crossterm::style::Stylize as _;
use qc_citation::{SourceInspector, citations};
use qc_conversation::{Outcome, Turn};
use qc_transport::{CancellationToken, Transport};
use tokio::io::{AsyncBufReadExt as _, BufReader};
use tracing::{debug, info, warn};

use crate::{
    Ctx, Result,
    cmd::Success,
    parser::{HELP, Input},
    render::{AnswerPrinter, write_cited_sources, write_inspector},
    signals::CancelOnInterrupt,
};

#[derive(Debug, clap::Args)]
pub(crate) struct Chat {
    /// The bot to talk to. Defaults to the `chat.bot` configuration.
    #[arg(short, long)]
    bot: Option<String>,
}

impl Chat {
    pub(crate) async fn run(self, ctx: &mut Ctx) -> Result<Success> {
        let bot = self.bot.unwrap_or_else(|| ctx.config.chat.bot.clone());
        let chat =
            qc_conversation::Chat::new(ctx.client()?, &bot).with_chat_id(ctx.config.chat.chat_id);

        let mut repl = Repl::new(chat, ctx.colors);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = io::stdout();

        info!(bot, "Chat started.");
        if ctx.is_tty {
            writeln!(stdout, "Chatting with {bot}. Type /help for commands.")?;
        }

        loop {
            write!(stdout, "> ")?;
            stdout.flush()?;

            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = tokio::signal::ctrl_c() => None,
            };

            let Some(line) = line else {
                writeln!(stdout)?;
                break;
            };

            let input = match line.parse::<Input>() {
                Ok(input) => input,
                Err(message) => {
                    writeln!(io::stderr(), "{message}")?;
                    continue;
                }
            };

            if repl.handle(input, &mut stdout).await? == Flow::Quit {
                break;
            }
        }

        info!("Chat ended.");
        Ok(Success::Ok)
    }
}

/// Whether the chat loop keeps going after an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// The interactive session state: the conversation and the source inspector
/// next to it.
struct Repl<T> {
    chat: qc_conversation::Chat<T>,
    inspector: SourceInspector,
    colors: bool,
}

impl<T: Transport> Repl<T> {
    fn new(chat: qc_conversation::Chat<T>, colors: bool) -> Self {
        Self {
            chat,
            inspector: SourceInspector::new(),
            colors,
        }
    }

    async fn handle(&mut self, input: Input, out: &mut impl Write) -> Result<Flow> {
        debug!(?input, "Handling input.");

        match input {
            Input::Message(text) if text.is_empty() => {}
            Input::Message(text) => self.send(&text, out).await?,
            Input::Sources { answer } => self.sources(answer, out)?,
            Input::Cite { ordinal, answer } => self.cite(ordinal, answer, out)?,
            Input::Close => self.inspector.dismiss(),
            Input::Clear => {
                self.chat.clear();
                self.inspector.dismiss();
                writeln!(out, "Conversation cleared.")?;
            }
            Input::Help => writeln!(out, "{HELP}")?,
            Input::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    async fn send(&mut self, text: &str, out: &mut impl Write) -> Result<()> {
        let mut printer = AnswerPrinter::new(self.colors);
        let cancel = CancellationToken::new();
        let interrupt = CancelOnInterrupt::new(&cancel);

        let outcome = self
            .chat
            .send(text, cancel, |turn| {
                if let Err(error) = printer.update(turn, &mut *out) {
                    warn!(%error, "Failed to write answer.");
                }
            })
            .await;
        drop(interrupt);

        match outcome {
            Ok(Outcome::Finalized(id)) => {
                if let Some(turn) = self.chat.accumulator().conversation().get(id) {
                    printer.finish(turn, out)?;
                    write_cited_sources(turn, self.colors, out)?;
                }
            }
            Ok(Outcome::Failed(message)) => {
                // Partial text may already be on screen.
                writeln!(out)?;
                self.notice(&format!("Answer failed: {message}"), out)?;
            }
            Ok(Outcome::Cancelled) => {
                writeln!(out)?;
                self.notice("(cancelled)", out)?;
            }
            Err(rejection) => self.notice(&rejection.to_string(), out)?,
        }

        Ok(())
    }

    fn sources(&mut self, answer: Option<NonZeroUsize>, out: &mut impl Write) -> Result<()> {
        let Some(turn) = find_answer(&self.chat, answer) else {
            return self.no_answer(answer, out);
        };

        if !self.inspector.show_all(turn) {
            self.inspector.show_all(turn);
        }

        write_inspector(&self.inspector, self.colors, out)?;
        Ok(())
    }

    fn cite(
        &mut self,
        ordinal: usize,
        answer: Option<NonZeroUsize>,
        out: &mut impl Write,
    ) -> Result<()> {
        let Some(turn) = find_answer(&self.chat, answer) else {
            return self.no_answer(answer, out);
        };

        let Some(citation) =
            citations(turn.text(), turn.sources()).find(|citation| citation.ordinal == ordinal)
        else {
            return self.notice(&format!("No citation [{ordinal}] in that answer."), out);
        };

        if !self.inspector.activate(turn.id(), &citation) {
            self.inspector.activate(turn.id(), &citation);
        }

        write_inspector(&self.inspector, self.colors, out)?;
        Ok(())
    }

    fn no_answer(&self, answer: Option<NonZeroUsize>, out: &mut impl Write) -> Result<()> {
        match answer {
            Some(n) => self.notice(&format!("No answer #{n}."), out),
            None => self.notice("No answers yet.", out),
        }
    }

    fn notice(&self, message: &str, out: &mut impl Write) -> Result<()> {
        if self.colors {
            writeln!(out, "{}", message.red())?;
        } else {
            writeln!(out, "{message}")?;
        }

        Ok(())
    }
}

/// The `n`th finished answer, counted from 1, or the last one.
fn find_answer<T: Transport>(
    chat: &qc_conversation::Chat<T>,
    n: Option<NonZeroUsize>,
) -> Option<&Turn> {
    let mut answers = chat
        .accumulator()
        .conversation()
        .assistant_turns()
        .filter(|turn| !turn.is_in_flight());

    match n {
        Some(n) => answers.nth(n.get() - 1),
        None => answers.next_back(),
    }
}

#[cfg(test)]
#[path = "chat_tests.rs"]
mod tests;
