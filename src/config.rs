use log::debug;
use serde::Deserialize;
use std::{
    env::VarError,
    fmt, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::error::Error;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_MAX_REDIRECTS: usize = 5;
/// Following redirects at all means following at least this many.
const MIN_REDIRECTS_LIMIT: usize = 5;
const MAX_REDIRECTS_LIMIT: usize = 10;

/// Environment variable holding the host accepted in full-URL mode.
pub const ENV_TRUSTED_HOST: &str = "NTFY";
/// Environment variable holding the base URL topics are published under.
pub const ENV_BASE_URL: &str = "NTFY_BASE_URL";
/// Environment variable holding an optional gateway access token.
pub const ENV_TOKEN: &str = "NTFY_TOKEN";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub probe: ProbeOptions,
    pub notify: NotifyOptions,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeOptions {
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub max_redirects: usize,
    pub retry_delay_ms: u64,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            retry_delay_ms: 0,
        }
    }
}

impl ProbeOptions {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotifyOptions {
    pub timeout_secs: u64,
    pub trusted_host: Option<String>,
    pub base_url: Option<String>,
    pub token: Option<String>,
}

impl Default for NotifyOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            trusted_host: None,
            base_url: None,
            token: None,
        }
    }
}

// The token must never end up in logs.
impl fmt::Debug for NotifyOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifyOptions")
            .field("timeout_secs", &self.timeout_secs)
            .field("trusted_host", &self.trusted_host)
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl NotifyOptions {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Loads the configuration from defaults, the config file and the environment.
    ///
    /// An explicit `path` must exist. Without one, the default location
    /// (`<config_dir>/sitecheck/config.toml`) is read only when present.
    /// Environment variables (and a `.env` file) override file values.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if an
    /// environment variable is not valid unicode, or if a value is out of range.
    pub fn load(path: Option<&Path>) -> Result<Config, Error> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => {
                    debug!("No configuration file found, using defaults");
                    Config::default()
                }
            },
        };

        config.apply_env(env_var)?;
        config.validate()
    }

    /// Location of the per-user configuration file, if the platform has one.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sitecheck").join("config.toml"))
    }

    fn from_file(path: &Path) -> Result<Config, Error> {
        debug!("Reading configuration from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// # Errors
    ///
    /// Returns an error if `content` is not a valid configuration document.
    pub fn from_toml_str(content: &str) -> Result<Config, Error> {
        Ok(toml::from_str(content)?)
    }

    /// Overlays notification settings found through `lookup`.
    ///
    /// # Errors
    ///
    /// Propagates any error returned by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), Error>
    where
        F: Fn(&str) -> Result<Option<String>, Error>,
    {
        if let Some(host) = lookup(ENV_TRUSTED_HOST)? {
            self.notify.trusted_host = Some(host);
        }
        if let Some(base_url) = lookup(ENV_BASE_URL)? {
            self.notify.base_url = Some(base_url);
        }
        if let Some(token) = lookup(ENV_TOKEN)? {
            self.notify.token = Some(token);
        }
        Ok(())
    }

    /// Checks value ranges and normalizes the notification settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a value is out of range.
    pub fn validate(mut self) -> Result<Self, Error> {
        if self.probe.timeout_secs == 0 {
            return Err(Error::Config("probe.timeout_secs must be positive".into()));
        }
        if self.probe.max_attempts == 0 {
            return Err(Error::Config("probe.max_attempts must be at least 1".into()));
        }
        let redirects = self.probe.max_redirects;
        if redirects != 0 && !(MIN_REDIRECTS_LIMIT..=MAX_REDIRECTS_LIMIT).contains(&redirects) {
            return Err(Error::Config(format!(
                "probe.max_redirects must be 0 (do not follow) or between \
                 {MIN_REDIRECTS_LIMIT} and {MAX_REDIRECTS_LIMIT}"
            )));
        }
        if self.notify.timeout_secs == 0 {
            return Err(Error::Config("notify.timeout_secs must be positive".into()));
        }

        self.notify.trusted_host = non_empty(self.notify.trusted_host).map(|h| h.to_lowercase());
        self.notify.base_url = non_empty(self.notify.base_url);
        self.notify.token = non_empty(self.notify.token);

        Ok(self)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_var(key: &str) -> Result<Option<String>, Error> {
    match dotenvy::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(dotenvy::Error::EnvVar(VarError::NotPresent)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
