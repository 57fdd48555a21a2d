use qc_config::Config;
use qc_transport::Client;

use crate::{Globals, Result};

/// State shared by the commands.
pub(crate) struct Ctx {
    pub(crate) config: Config,

    /// Whether to style terminal output.
    pub(crate) colors: bool,

    /// Whether stdout is a terminal.
    pub(crate) is_tty: bool,
}

impl Ctx {
    pub(crate) fn new(globals: &Globals, config: Config, is_tty: bool) -> Self {
        Self {
            config,
            colors: globals.colors && is_tty,
            is_tty,
        }
    }

    /// A client for the configured backend.
    pub(crate) fn client(&self) -> Result<Client> {
        let server = &self.config.server;

        Client::with_timeouts(
            server.base_url.as_str(),
            server.connect_timeout(),
            server.idle_timeout(),
        )
        .map_err(Into::into)
    }
}
