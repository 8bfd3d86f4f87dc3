// ── Core error types ──
//
// Poller-level errors. Transport failures from unipoll-api are wrapped
// with the stage they happened in, so the poll loop can decide which
// ones end a cycle and which ones only get logged.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to controller at {url}: {source}")]
    ConnectionFailed {
        url: String,
        #[source]
        source: unipoll_api::Error,
    },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    // ── Cycle errors ─────────────────────────────────────────────────
    /// Site, client, or device retrieval failed. Logged; the cycle continues.
    #[error("fetching {what} from controller: {source}")]
    Fetch {
        what: &'static str,
        #[source]
        source: unipoll_api::Error,
    },

    /// The point batch could not be created. Nothing can be reported.
    #[error("creating point batch: {0}")]
    BatchInit(#[source] unipoll_api::Error),

    /// The batch could not be written.
    #[error("{context}: {source}")]
    Write {
        context: &'static str,
        #[source]
        source: unipoll_api::Error,
    },

    // ── Poller errors ────────────────────────────────────────────────
    #[error("reached maximum error count, stopping poller ({count} > {max})")]
    MaxErrorsReached { count: u64, max: i64 },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Wrap a controller fetch failure.
    pub fn fetch(what: &'static str) -> impl FnOnce(unipoll_api::Error) -> Self {
        move |source| Self::Fetch { what, source }
    }

    /// Whether the failure came from an expired or rejected session.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::AuthenticationFailed { .. } => true,
            Self::Fetch { source, .. } => source.is_auth_expired(),
            _ => false,
        }
    }
}

impl From<unipoll_api::Error> for CoreError {
    fn from(err: unipoll_api::Error) -> Self {
        match err {
            unipoll_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            unipoll_api::Error::SessionExpired => CoreError::AuthenticationFailed {
                message: "Session expired -- re-authentication required".into(),
            },
            unipoll_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            unipoll_api::Error::InvalidBatch { .. } => CoreError::BatchInit(err),
            source @ (unipoll_api::Error::Transport(_) | unipoll_api::Error::Tls(_)) => {
                CoreError::ConnectionFailed {
                    url: String::new(),
                    source,
                }
            }
            other => CoreError::Fetch {
                what: "data",
                source: other,
            },
        }
    }
}
