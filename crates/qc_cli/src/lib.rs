mod cmd;
mod ctx;
mod error;
mod parser;
mod render;
mod signals;

use std::{
    fmt,
    io::{self, IsTerminal as _, Write as _},
    process::ExitCode,
};

use camino::Utf8PathBuf;
use clap::{
    ArgAction, Parser,
    builder::{BoolValueParser, TypedValueParser as _},
};
use cmd::{Commands, Success};
use ctx::Ctx;
use error::{Error, Result};
use qc_config::{Config, KvAssignment};
use tracing::{error, trace};

/// Ask questions about your documents, with cited answers.
#[derive(Parser)]
#[command(name = "qc", author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten, next_help_heading = "Global Options")]
    globals: Globals,

    #[command(subcommand, next_help_heading = "Options")]
    command: Commands,
}

#[derive(Debug, clap::Args)]
pub(crate) struct Globals {
    /// Override a configuration value for the duration of the command.
    #[arg(short, long, value_name = "KEY=VALUE", global = true, action = ArgAction::Append)]
    config: Vec<KvAssignment>,

    /// Read the configuration from this file, instead of searching for one.
    #[arg(long, value_name = "PATH", global = true)]
    config_file: Option<Utf8PathBuf>,

    /// Increase verbosity of logging.
    ///
    /// Can be specified multiple times to increase verbosity.
    ///
    /// Defaults to printing "error" messages. For each increase in verbosity,
    /// the log level is set to "warn", "info", "debug", and "trace"
    /// respectively.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Suppress all output, including errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[arg(
        long = "no-color",
        alias = "no-colors",
        global = true,
        default_value_t = false,
        value_parser = BoolValueParser::new().map(|v| !v),
        help = "Disable color in the output.",
    )]
    colors: bool,
}

impl fmt::Display for Cli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entry(&"config", &self.globals.config)
            .entry(&"config_file", &self.globals.config_file)
            .entry(&"verbose", &self.globals.verbose)
            .entry(&"quiet", &self.globals.quiet)
            .finish()
    }
}

#[must_use]
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let is_tty = io::stdout().is_terminal();
    let quiet = cli.globals.quiet;

    configure_logging(cli.globals.verbose, quiet);
    trace!(command = cli.command.name(), arguments = %cli, "Starting CLI run.");

    let result = tokio::runtime::Runtime::new()
        .map_err(Error::from)
        .and_then(|runtime| runtime.block_on(run_inner(cli, is_tty)));

    let (code, output) = match result {
        Ok(output) if is_tty => (0, output_to_string(output)),
        Ok(output) => (0, parse_json_output(output)),
        Err(error) => {
            error!(%error, "Command failed.");
            if quiet {
                return ExitCode::from(error.code());
            }

            let (code, message) = parse_error(&error, is_tty);
            writeln!(io::stderr(), "{message}").ok();
            return ExitCode::from(code);
        }
    };

    if !output.is_empty() {
        writeln!(io::stdout(), "{output}").ok();
    }

    ExitCode::from(code)
}

async fn run_inner(cli: Cli, is_tty: bool) -> Result<Success> {
    let Cli { globals, command } = cli;

    let mut config = Config::load(globals.config_file.as_deref())?;
    config.apply_env(std::env::vars())?;
    config.apply_assignments(globals.config.iter().cloned())?;

    let mut ctx = Ctx::new(&globals, config, is_tty);
    command.run(&mut ctx).await
}

fn output_to_string(output: Success) -> String {
    match output {
        Success::Ok => String::new(),
        Success::Message(msg) => msg,
        Success::Json(value) => {
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
        }
    }
}

fn parse_json_output(output: Success) -> String {
    let value = match output {
        Success::Ok => return String::new(),
        Success::Message(msg) => serde_json::json!({ "message": msg }),
        Success::Json(value) => value,
    };

    serde_json::to_string(&value).unwrap_or_else(|_| value.to_string())
}

fn parse_error(error: &Error, is_tty: bool) -> (u8, String) {
    let code = error.code();
    let message = strip_ansi_escapes::strip_str(error.to_string());

    if is_tty {
        return (code, message);
    }

    let error = serde_json::json!({
        "message": message,
        "code": code,
    });

    (code, error.to_string())
}

fn configure_logging(verbose: u8, quiet: bool) {
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::fmt;

    let mut level = match verbose {
        0 => LevelFilter::ERROR,
        1 => LevelFilter::WARN,
        2 => LevelFilter::INFO,
        3 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    if quiet {
        level = LevelFilter::OFF;
    }

    let mut filter = vec!["off".to_owned()];
    for krate in [
        "citation",
        "cli",
        "config",
        "conversation",
        "source",
        "transport",
    ] {
        filter.push(format!("qc_{krate}={level}"));
    }

    let format = fmt::format().with_target(false).compact();

    if level < LevelFilter::DEBUG {
        tracing_subscriber::fmt()
            .event_format(format)
            .without_time()
            .with_ansi(true)
            .with_target(false)
            .with_writer(io::stderr)
            .with_env_filter(filter.join(","))
            .init();
    } else {
        tracing_subscriber::fmt()
            .event_format(format)
            .with_ansi(true)
            .with_target(false)
            .with_writer(io::stderr)
            .with_env_filter(filter.join(","))
            .init();
    }
}
