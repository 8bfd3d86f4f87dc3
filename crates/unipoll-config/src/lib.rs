//! Configuration for the unipoll binary.
//!
//! A flat TOML file layered with `UNIPOLL_*` environment variables,
//! credential resolution (env + keyring + plaintext), and translation to
//! the runtime types in `unipoll_core::config`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use unipoll_api::BatchConfig;
use unipoll_core::{ControllerConfig, InfluxConfig, PollerConfig, TlsVerification};

/// Environment variable prefix for every config key.
pub const ENV_PREFIX: &str = "UNIPOLL_";

/// Keyring service the controller password may be stored under.
const KEYRING_SERVICE: &str = "unipoll";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("no password configured for controller user '{username}'")]
    NoCredentials { username: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config struct ──────────────────────────────────────────────

/// Everything unipoll reads from `config.toml` and the environment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// `influx` to poll forever, `lambda` to run one cycle and exit.
    pub mode: String,

    /// Seconds between cycles.
    pub interval: u64,

    /// Stop after more than this many failed cycles; negative disables.
    pub max_errors: i64,

    /// Site names to poll, or `["all"]`.
    pub sites: Vec<String>,

    pub debug: bool,
    pub quiet: bool,

    /// Controller base URL (e.g., "https://192.168.1.1:8443").
    pub unifi_url: Option<String>,
    pub unifi_user: Option<String>,
    /// Controller password (plaintext, prefer keyring or env var).
    pub unifi_pass: Option<String>,

    /// Verify the controller's TLS certificate.
    pub verify_ssl: bool,

    pub influx_url: String,
    pub influx_user: Option<String>,
    pub influx_pass: Option<String>,
    pub influx_db: String,

    /// HTTP request timeout in seconds.
    pub timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: "influx".into(),
            interval: 30,
            max_errors: 0,
            sites: vec![unipoll_core::ALL_SITES.into()],
            debug: false,
            quiet: false,
            unifi_url: None,
            unifi_user: None,
            unifi_pass: None,
            verify_ssl: false,
            influx_url: "http://127.0.0.1:8086".into(),
            influx_user: None,
            influx_pass: None,
            influx_db: "unifi".into(),
            timeout: 30,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "unipoll", "unipoll").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("unipoll");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from defaults, a TOML file, and the environment.
///
/// An explicit `path` must exist. Without one, the platform config file
/// is used if present.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(p) if !p.exists() => {
            return Err(ConfigError::NotFound {
                path: p.to_path_buf(),
            });
        }
        Some(p) => p.to_path_buf(),
        None => config_path(),
    };

    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&file))
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()?;
    Ok(config)
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the controller password: env var, then keyring, then plaintext.
pub fn resolve_unifi_password(config: &Config, username: &str) -> Result<SecretString, ConfigError> {
    // 1. Env var
    if let Ok(pw) = std::env::var(format!("{ENV_PREFIX}UNIFI_PASS")) {
        return Ok(SecretString::from(pw));
    }

    // 2. Keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{username}/password")) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = config.unifi_pass {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        username: username.into(),
    })
}

// ── Translation to runtime config ───────────────────────────────────

fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    let url: Url = raw
        .parse()
        .map_err(|e| invalid(field, format!("invalid URL '{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(field, format!("unsupported scheme '{}'", url.scheme())));
    }
    Ok(url)
}

impl Config {
    fn tls(&self) -> TlsVerification {
        if self.verify_ssl {
            TlsVerification::SystemDefaults
        } else {
            TlsVerification::DangerAcceptInvalid
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.max(1))
    }

    /// Build the controller connection settings, resolving the password.
    pub fn controller_config(&self) -> Result<ControllerConfig, ConfigError> {
        let raw_url = self
            .unifi_url
            .as_deref()
            .ok_or_else(|| invalid("unifi_url", "not set"))?;
        let url = parse_url("unifi_url", raw_url)?;
        let username = self
            .unifi_user
            .clone()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| invalid("unifi_user", "not set"))?;
        let password = resolve_unifi_password(self, &username)?;

        Ok(ControllerConfig {
            url,
            username,
            password,
            tls: self.tls(),
            timeout: self.timeout(),
        })
    }

    /// Build the InfluxDB connection settings.
    pub fn influx_config(&self) -> Result<InfluxConfig, ConfigError> {
        Ok(InfluxConfig {
            url: parse_url("influx_url", &self.influx_url)?,
            username: self.influx_user.clone().filter(|u| !u.is_empty()),
            password: self.influx_pass.clone().map(SecretString::from),
            tls: self.tls(),
            timeout: self.timeout(),
        })
    }

    /// Build the poll loop settings.
    pub fn poller_config(&self) -> Result<PollerConfig, ConfigError> {
        if self.influx_db.trim().is_empty() {
            return Err(invalid("influx_db", "database name is empty"));
        }
        if self.interval == 0 {
            return Err(invalid("interval", "must be at least 1 second"));
        }

        Ok(PollerConfig {
            mode: self.mode.clone(),
            interval: Duration::from_secs(self.interval),
            sites: self.sites.clone(),
            max_errors: self.max_errors,
            batch: BatchConfig::new(self.influx_db.clone()),
        })
    }
}
