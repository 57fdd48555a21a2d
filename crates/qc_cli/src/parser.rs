//! Parsing of interactive chat input.

use std::{num::NonZeroUsize, str::FromStr};

/// One line typed at the chat prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Input {
    /// A message for the assistant.
    Message(String),

    /// Show all sources of an answer.
    Sources { answer: Option<NonZeroUsize> },

    /// Show the source behind citation marker `[ordinal]` of an answer.
    Cite {
        ordinal: usize,
        answer: Option<NonZeroUsize>,
    },

    /// Close the source inspector.
    Close,

    /// Remove every turn of the conversation.
    Clear,

    /// Leave the chat.
    Quit,

    /// List the commands.
    Help,
}

pub(crate) const HELP: &str = "\
/sources [ANSWER]     show all sources of the last (or given) answer
/cite N [ANSWER]      show the source cited as [N] in the last (or given) answer
/close                close the sources
/clear                start a new conversation
/quit                 leave the chat
//TEXT                send TEXT as a message starting with /

Answers are numbered from 1, oldest first. Ctrl-C cancels an answer in
progress.";

impl FromStr for Input {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let Some(command) = line.strip_prefix('/') else {
            return Ok(Self::Message(line.to_owned()));
        };

        if command.starts_with('/') {
            return Ok(Self::Message(command.to_owned()));
        }

        let mut words = command.split_whitespace();
        let name = words.next().unwrap_or_default();
        let args = words.collect::<Vec<_>>();

        match (name, args.as_slice()) {
            ("sources" | "s", [answer @ ..]) if answer.len() <= 1 => Ok(Self::Sources {
                answer: answer.first().map(|n| parse_answer(n)).transpose()?,
            }),
            ("cite" | "c", [ordinal, answer @ ..]) if answer.len() <= 1 => Ok(Self::Cite {
                ordinal: ordinal
                    .parse()
                    .map_err(|_| format!("Invalid citation number: {ordinal}"))?,
                answer: answer.first().map(|n| parse_answer(n)).transpose()?,
            }),
            ("close", []) => Ok(Self::Close),
            ("clear", []) => Ok(Self::Clear),
            ("quit" | "exit" | "q", []) => Ok(Self::Quit),
            ("help" | "h" | "?", []) => Ok(Self::Help),
            ("sources" | "s" | "cite" | "c" | "close" | "clear" | "quit" | "exit" | "q", _) => {
                Err(format!("Invalid arguments for /{name}. Type /help for usage."))
            }
            _ => Err(format!("Unknown command: /{name}. Type /help for usage.")),
        }
    }
}

fn parse_answer(value: &str) -> Result<NonZeroUsize, String> {
    value
        .parse()
        .map_err(|_| format!("Invalid answer number: {value}"))
}
