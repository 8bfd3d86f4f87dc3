// ── Runtime configuration ──
//
// These types describe how to reach the controller and InfluxDB and how
// the poll loop behaves. They never touch disk: unipoll-config builds
// them from files and the environment and hands them in.

use std::time::Duration;

use secrecy::SecretString;
use unipoll_api::{BatchConfig, TlsMode, TransportConfig};
use url::Url;

/// Mode that runs exactly one collect-and-report cycle and exits.
pub const LAMBDA_MODE: &str = "lambda";

/// Returns `true` when `mode` asks for a single-shot run.
pub fn is_lambda(mode: &str) -> bool {
    mode.to_lowercase().contains(LAMBDA_MODE)
}

/// TLS verification strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Skip verification (self-signed certs). Default for local controllers.
    #[default]
    DangerAcceptInvalid,
}

impl From<TlsVerification> for TlsMode {
    fn from(tls: TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// How to reach and authenticate with the UniFi controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Controller URL (e.g., `https://192.168.1.1:8443`).
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    pub tls: TlsVerification,
    pub timeout: Duration,
}

impl ControllerConfig {
    /// Transport settings with a cookie jar for the session login.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.into(),
            timeout: self.timeout,
            cookie_jar: None,
        }
        .with_cookie_jar()
    }
}

/// How to reach InfluxDB.
#[derive(Debug, Clone)]
pub struct InfluxConfig {
    pub url: Url,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub tls: TlsVerification,
    pub timeout: Duration,
}

impl InfluxConfig {
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.into(),
            timeout: self.timeout,
            cookie_jar: None,
        }
    }
}

/// Poll loop behaviour.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// `"influx"` to poll forever, anything containing `"lambda"` to run once.
    pub mode: String,
    /// Time between cycles. Rounded to whole seconds.
    pub interval: Duration,
    /// Site names to poll, or `["all"]`.
    pub sites: Vec<String>,
    /// Stop after more than this many failed cycles. Negative disables.
    pub max_errors: i64,
    /// Target database and precision for each cycle's batch.
    pub batch: BatchConfig,
}

impl PollerConfig {
    pub fn is_lambda(&self) -> bool {
        is_lambda(&self.mode)
    }

    /// The configured interval rounded to the nearest second, at least one.
    pub fn tick_interval(&self) -> Duration {
        let rounded = self
            .interval
            .saturating_add(Duration::from_millis(500))
            .as_secs()
            .max(1);
        Duration::from_secs(rounded)
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            mode: "influx".into(),
            interval: Duration::from_secs(30),
            sites: vec![crate::sites::ALL_SITES.into()],
            max_errors: 0,
            batch: BatchConfig::new("unifi"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lambda_mode_is_case_insensitive_substring() {
        assert!(is_lambda("lambda"));
        assert!(is_lambda("AWS-Lambda"));
        assert!(!is_lambda("influx"));
        assert!(!is_lambda(""));
    }

    #[test]
    fn tick_interval_rounds_to_whole_seconds() {
        let mut config = PollerConfig {
            interval: Duration::from_millis(29_600),
            ..PollerConfig::default()
        };
        assert_eq!(config.tick_interval(), Duration::from_secs(30));

        config.interval = Duration::from_millis(30_400);
        assert_eq!(config.tick_interval(), Duration::from_secs(30));

        config.interval = Duration::from_millis(200);
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
    }
}
