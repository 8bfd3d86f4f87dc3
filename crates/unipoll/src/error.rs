//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use unipoll_config::ConfigError;
use unipoll_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to {url}")]
    #[diagnostic(
        code(unipoll::connection_failed),
        help(
            "Check that the service is running and reachable.\n\
             For self-signed controller certificates leave verify_ssl = false."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: CoreError,
    },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(unipoll::auth_failed),
        help("Verify unifi_user and the controller password.")
    )]
    AuthFailed { message: String },

    #[error("No password configured for controller user '{username}'")]
    #[diagnostic(
        code(unipoll::no_credentials),
        help(
            "Set UNIPOLL_UNIFI_PASS, store it in the system keyring under\n\
             service 'unipoll', entry '{username}/password', or set unifi_pass in config.toml."
        )
    )]
    NoCredentials { username: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(unipoll::validation))]
    Validation { field: String, reason: String },

    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(unipoll::no_config),
        help("Pass an existing file with --config, or omit it to use {default}")
    )]
    NoConfig { path: String, default: String },

    #[error("Could not load configuration")]
    #[diagnostic(code(unipoll::config))]
    Config(#[source] ConfigError),

    // ── Polling ──────────────────────────────────────────────────────

    #[error("Poller stopped after {count} failed cycles (max_errors = {max})")]
    #[diagnostic(
        code(unipoll::max_errors),
        help("Raise max_errors, or set it to -1 to keep polling through failures.")
    )]
    MaxErrors { count: u64, max: i64 },

    #[error(transparent)]
    #[diagnostic(code(unipoll::poll))]
    Poll(CoreError),

    // ── Serialization ────────────────────────────────────────────────

    #[error("Could not encode JSON output: {0}")]
    #[diagnostic(code(unipoll::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Validation { .. } | Self::NoConfig { .. } | Self::Config(_) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { ref url, .. } => CliError::ConnectionFailed {
                url: url.clone(),
                source: err,
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            ref e if e.is_auth_failure() => CliError::AuthFailed {
                message: e.to_string(),
            },

            CoreError::MaxErrorsReached { count, max } => CliError::MaxErrors { count, max },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            other => CliError::Poll(other),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NotFound { path } => CliError::NoConfig {
                path: path.display().to_string(),
                default: unipoll_config::config_path().display().to_string(),
            },
            ConfigError::NoCredentials { username } => CliError::NoCredentials { username },
            other => CliError::Config(other),
        }
    }
}
