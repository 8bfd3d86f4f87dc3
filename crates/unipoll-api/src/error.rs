use thiserror::Error;

/// Top-level error type for the `unipoll-api` crate.
///
/// Covers every failure mode across both HTTP surfaces:
/// controller authentication, transport, the legacy API envelope,
/// and the InfluxDB write endpoint. `unipoll-core` maps these into
/// poller-level errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (wrong credentials, account locked, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Session has expired (cookie expired or revoked).
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Legacy API ──────────────────────────────────────────────────
    /// Error from the legacy API (parsed from the `{meta: {rc, msg}}` envelope).
    #[error("Legacy API error: {message}")]
    LegacyApi { message: String },

    // ── InfluxDB ────────────────────────────────────────────────────
    /// The write endpoint answered with something other than `204 No Content`.
    #[error("InfluxDB write failed (HTTP {status}): {message}")]
    Influx { status: u16, message: String },

    /// A point in the batch could not be encoded as line protocol.
    #[error("Cannot encode batch: {0}")]
    Encode(#[from] crate::influx::PointError),

    /// A batch could not be created from the given configuration.
    #[error("Invalid batch configuration: {reason}")]
    InvalidBatch { reason: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates auth has expired
    /// and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        match self {
            Self::Authentication { .. } | Self::SessionExpired => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::UNAUTHORIZED),
            _ => false,
        }
    }
}
