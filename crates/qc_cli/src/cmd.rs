mod ask;
mod chat;
mod init;

use serde_json::Value;

use crate::{Ctx, Result};

#[derive(Debug, clap::Subcommand)]
pub(crate) enum Commands {
    /// Write a default configuration file.
    Init(init::Init),

    /// Ask a single question and print the cited answer.
    #[command(visible_alias = "a")]
    Ask(ask::Ask),

    /// Start an interactive conversation.
    #[command(visible_alias = "c")]
    Chat(chat::Chat),
}

impl Commands {
    pub(crate) async fn run(self, ctx: &mut Ctx) -> Result<Success> {
        match self {
            Commands::Init(args) => args.run(ctx),
            Commands::Ask(args) => args.run(ctx).await,
            Commands::Chat(args) => args.run(ctx).await,
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Commands::Init(_) => "init",
            Commands::Ask(_) => "ask",
            Commands::Chat(_) => "chat",
        }
    }
}

/// The type of output that should be printed to the screen.
#[derive(Debug)]
pub(crate) enum Success {
    /// The command was successful, and already wrote its output.
    Ok,

    /// Single message to be printed to the screen.
    Message(String),

    /// JSON value to be printed.
    Json(Value),
}

impl From<()> for Success {
    fn from(_value: ()) -> Self {
        Self::Ok
    }
}

impl From<String> for Success {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

impl From<Value> for Success {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}
