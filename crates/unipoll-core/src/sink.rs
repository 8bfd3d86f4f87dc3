// ── Metrics sink ──

use async_trait::async_trait;
use unipoll_api::{BatchConfig, BatchPoints, InfluxClient};

use crate::config::InfluxConfig;
use crate::error::CoreError;

/// Where each cycle's points go.
#[async_trait]
pub trait MetricsSink: Send + Sync {
    /// Start an empty batch for one cycle.
    fn new_batch(&self, config: &BatchConfig) -> Result<BatchPoints, CoreError> {
        BatchPoints::new(config).map_err(CoreError::BatchInit)
    }

    async fn write(&self, batch: &BatchPoints) -> Result<(), unipoll_api::Error>;
}

#[async_trait]
impl MetricsSink for InfluxClient {
    async fn write(&self, batch: &BatchPoints) -> Result<(), unipoll_api::Error> {
        InfluxClient::write(self, batch).await
    }
}

/// Build an InfluxDB client. No request is made until the first write.
pub fn connect_influx(config: &InfluxConfig) -> Result<InfluxClient, CoreError> {
    InfluxClient::new(
        config.url.clone(),
        config.username.clone(),
        config.password.clone(),
        &config.transport(),
    )
    .map_err(|source| CoreError::ConnectionFailed {
        url: config.url.to_string(),
        source,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::TlsVerification;

    struct NullSink;

    #[async_trait]
    impl MetricsSink for NullSink {
        async fn write(&self, _batch: &BatchPoints) -> Result<(), unipoll_api::Error> {
            Ok(())
        }
    }

    #[test]
    fn default_batch_rejects_missing_database() {
        let err = NullSink.new_batch(&BatchConfig::new("")).unwrap_err();
        assert!(matches!(err, CoreError::BatchInit(_)));
        assert!(NullSink.new_batch(&BatchConfig::new("unifi")).is_ok());
    }

    #[test]
    fn influx_client_keeps_configured_url() {
        let config = InfluxConfig {
            url: "http://127.0.0.1:8086".parse().unwrap(),
            username: None,
            password: None,
            tls: TlsVerification::SystemDefaults,
            timeout: Duration::from_secs(5),
        };
        let client = connect_influx(&config);
        assert!(client.is_ok_and(|c| c.base_url().as_str() == "http://127.0.0.1:8086/"));
    }
}
