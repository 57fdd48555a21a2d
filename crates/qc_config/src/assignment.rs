use std::str::FromStr;

use crate::{Config, Error, error::Result};

/// Prefix of the environment variables that override configuration keys.
pub const ENV_PREFIX: &str = "QC_";

pub trait AssignKeyValue {
    /// Assign a value to a key in a configuration.
    fn assign(&mut self, kv: KvAssignment) -> Result<()>;
}

/// A single `key=value` override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvAssignment {
    /// The remaining, dot-delimited key path.
    key: String,

    /// The full key path, unchanged by [`KvAssignment::p`].
    full_key: String,

    value: String,
}

impl KvAssignment {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();

        Self {
            full_key: key.clone(),
            key,
            value: value.into(),
        }
    }

    /// Parse an assignment from an environment variable.
    ///
    /// The variable name is matched against the known configuration keys,
    /// e.g. `QC_SERVER_BASE_URL` sets `server.base_url`. Returns `None` for
    /// variables that do not name a configuration key.
    #[must_use]
    pub fn from_env(name: &str, value: &str) -> Option<Self> {
        let suffix = name.strip_prefix(ENV_PREFIX)?;

        Config::fields()
            .iter()
            .find(|field| field.replace('.', "_").eq_ignore_ascii_case(suffix))
            .map(|field| Self::new(*field, value))
    }

    /// The full key path.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.full_key
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The part of the key not yet consumed by [`KvAssignment::p`].
    pub(crate) fn remaining(&self) -> &str {
        &self.key
    }

    /// Returns `true` if the remaining key is exactly `segment`, or starts
    /// with it, in which case the segment is trimmed.
    pub(crate) fn p(&mut self, segment: &str) -> bool {
        if self.key == segment {
            return true;
        }

        match self.key.strip_prefix(segment).and_then(|rest| rest.strip_prefix('.')) {
            Some(rest) => {
                self.key = rest.to_owned();
                true
            }
            None => false,
        }
    }

    pub(crate) fn try_string(&self) -> Result<String> {
        let value = self.value.trim();
        if value.is_empty() {
            return Err(self.invalid("a non-empty string"));
        }

        Ok(value.to_owned())
    }

    pub(crate) fn try_u64(&self) -> Result<u64> {
        self.value
            .trim()
            .parse()
            .map_err(|_| self.invalid("a non-negative integer"))
    }

    /// An empty value unsets the key.
    pub(crate) fn try_opt_u64(&self) -> Result<Option<u64>> {
        if self.value.trim().is_empty() {
            return Ok(None);
        }

        self.try_u64().map(Some)
    }

    pub(crate) fn try_url(&self) -> Result<url::Url> {
        let url = url::Url::parse(self.value.trim()).map_err(|_| self.invalid("an absolute URL"))?;
        if url.cannot_be_a_base() {
            return Err(self.invalid("an absolute URL"));
        }

        Ok(url)
    }

    pub(crate) fn invalid(&self, need: &str) -> Error {
        Error::InvalidConfigValue {
            key: self.full_key.clone(),
            value: self.value.clone(),
            need: need.to_owned(),
        }
    }
}

impl FromStr for KvAssignment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| Error::InvalidAssignment(s.to_owned()))?;

        let key = key.trim();
        if key.is_empty() {
            return Err(Error::InvalidAssignment(s.to_owned()));
        }

        Ok(Self::new(key, value))
    }
}

/// The error for a key that does not exist, listing the keys that share the
/// longest known prefix with it.
pub(crate) fn missing_key(kv: &KvAssignment) -> Error {
    let fields = Config::fields();
    let mut available_keys = fields.iter().map(ToString::to_string).collect::<Vec<_>>();

    let mut path = Some(kv.key());
    while let Some(prefix) = path {
        path = prefix.rsplit_once('.').map(|(prefix, _)| prefix);

        let matches = fields
            .iter()
            .filter(|field| field.starts_with(prefix))
            .map(ToString::to_string)
            .collect::<Vec<_>>();

        if !matches.is_empty() {
            available_keys = matches;
            break;
        }
    }

    Error::UnknownConfigKey {
        key: kv.key().to_owned(),
        available_keys,
    }
}
