use camino::Utf8PathBuf;
use crossterm::style::Stylize as _;
use tracing::info;

use crate::{Ctx, Error, Result, cmd::Success};

const DEFAULT_CONFIG_PATH: &str = "qc.toml";

#[derive(Debug, clap::Args)]
pub(crate) struct Init {
    /// Where to write the configuration. Defaults to `./qc.toml`.
    path: Option<Utf8PathBuf>,

    /// Overwrite an existing file.
    #[arg(short, long)]
    force: bool,
}

impl Init {
    pub(crate) fn run(&self, ctx: &Ctx) -> Result<Success> {
        let path = self
            .path
            .clone()
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_CONFIG_PATH));

        if path.exists() && !self.force {
            return Err(Error::Exists(path));
        }

        qc_config::generate_default_config(&path)?;
        info!(%path, "Wrote default configuration.");

        let shown = if ctx.colors {
            path.as_str().bold().to_string()
        } else {
            path.to_string()
        };

        Ok(format!("Wrote default configuration to {shown}").into())
    }
}
