//! Configuration of the `qc` client.
//!
//! Values come from, in increasing order of precedence: built-in defaults,
//! a TOML file, `QC_*` environment variables and `-c key=value` arguments.

mod assignment;
mod error;

use std::{env, fs, time::Duration};

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use url::Url;

pub use assignment::{AssignKeyValue, ENV_PREFIX, KvAssignment};
use assignment::missing_key;
pub use error::Error;
use error::Result;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 60;
const DEFAULT_BOT: &str = "default";

/// Files searched for a configuration, in order.
pub const DEFAULT_CONFIG_PATHS: &[&str] =
    &["./qc.toml", "./.config/qc.toml", "~/.config/qc/config.toml"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub chat: ChatConfig,
}

/// Where and how to reach the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub base_url: Url,

    /// Seconds to wait for the connection and the response headers.
    pub connect_timeout_secs: u64,

    /// Seconds to wait for the next frame of a streamed answer.
    pub idle_timeout_secs: u64,
}

impl ServerConfig {
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
        }
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("valid default URL")
}

impl AssignKeyValue for ServerConfig {
    fn assign(&mut self, kv: KvAssignment) -> Result<()> {
        match kv.remaining() {
            "base_url" => self.base_url = kv.try_url()?,
            "connect_timeout_secs" => self.connect_timeout_secs = kv.try_u64()?,
            "idle_timeout_secs" => self.idle_timeout_secs = kv.try_u64()?,
            _ => return Err(missing_key(&kv)),
        }

        Ok(())
    }
}

/// Which bot to talk to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChatConfig {
    /// Slug of the bot answering questions.
    pub bot: String,

    /// Backend chat session to continue, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<u64>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            bot: DEFAULT_BOT.to_owned(),
            chat_id: None,
        }
    }
}

impl AssignKeyValue for ChatConfig {
    fn assign(&mut self, kv: KvAssignment) -> Result<()> {
        match kv.remaining() {
            "bot" => self.bot = kv.try_string()?,
            "chat_id" => self.chat_id = kv.try_opt_u64()?,
            _ => return Err(missing_key(&kv)),
        }

        Ok(())
    }
}

impl AssignKeyValue for Config {
    fn assign(&mut self, mut kv: KvAssignment) -> Result<()> {
        if kv.p("server") {
            self.server.assign(kv)
        } else if kv.p("chat") {
            self.chat.assign(kv)
        } else {
            Err(missing_key(&kv))
        }
    }
}

impl Config {
    /// Every assignable key.
    #[must_use]
    pub fn fields() -> &'static [&'static str] {
        &[
            "chat.bot",
            "chat.chat_id",
            "server.base_url",
            "server.connect_timeout_secs",
            "server.idle_timeout_secs",
        ]
    }

    /// Load the configuration from `config_path`, or the first existing file
    /// of [`DEFAULT_CONFIG_PATHS`]. Falls back to the defaults if no file
    /// exists.
    pub fn load(config_path: Option<&Utf8Path>) -> Result<Self> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(Error::NotFound(path.to_owned()));
            }

            return Self::load_from_file(path);
        }

        let home = env::var("HOME").ok();
        DEFAULT_CONFIG_PATHS
            .iter()
            .map(|path| expand_home(path, home.as_deref()))
            .find(|path| path.exists())
            .map_or_else(
                || {
                    debug!("No config file found, using defaults.");
                    Ok(Self::default())
                },
                Self::load_from_file,
            )
    }

    pub fn load_from_file(path: impl AsRef<Utf8Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(%path, "Loading config file.");

        let contents = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| Error::Parse {
            path: path.to_owned(),
            source,
        })
    }

    pub fn save(&self, path: impl AsRef<Utf8Path>) -> Result<()> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| Error::Io {
                path: parent.to_owned(),
                source,
            })?;
        }

        fs::write(path, contents).map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })
    }

    /// Apply the `QC_*` variables among `vars`.
    ///
    /// Variables that do not name a configuration key are ignored.
    pub fn apply_env<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (name, value) in vars {
            let Some(kv) = KvAssignment::from_env(name.as_ref(), value.as_ref()) else {
                continue;
            };

            trace!(name = name.as_ref(), key = kv.key(), "Applying environment override.");
            self.assign(kv)?;
        }

        Ok(())
    }

    /// Apply `key=value` overrides, in order.
    pub fn apply_assignments(
        &mut self,
        assignments: impl IntoIterator<Item = KvAssignment>,
    ) -> Result<()> {
        for kv in assignments {
            trace!(key = kv.key(), value = kv.value(), "Applying override.");
            self.assign(kv)?;
        }

        Ok(())
    }
}

/// Write the default configuration to `path`.
pub fn generate_default_config(path: impl AsRef<Utf8Path>) -> Result<()> {
    Config::default().save(path)
}

fn expand_home(path: &str, home: Option<&str>) -> Utf8PathBuf {
    match (path.strip_prefix("~/"), home) {
        (Some(rest), Some(home)) => Utf8Path::new(home).join(rest),
        _ => Utf8PathBuf::from(path),
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
