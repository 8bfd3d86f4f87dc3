// ── Metrics collection ──

use tracing::error;

use crate::error::CoreError;
use crate::metrics::Metrics;
use crate::poller::Poller;
use crate::sink::MetricsSink;
use crate::source::InventorySource;

impl<S: InventorySource, K: MetricsSink> Poller<S, K> {
    /// Gather one snapshot from the controller.
    ///
    /// Site, client, and device fetch failures are logged and leave their
    /// part of the snapshot empty. Only a batch that cannot be created
    /// fails the collection.
    pub async fn collect_metrics(&self) -> Result<Metrics, CoreError> {
        let sites = self
            .sites()
            .filtered_sites(self.source())
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, "site fetch failed");
                Vec::new()
            });

        let clients = self.source().fetch_clients(&sites).await.unwrap_or_else(|e| {
            error!(error = %e, "client fetch failed");
            Vec::new()
        });

        let devices = match self.source().fetch_devices(&sites).await {
            Ok(devices) => Some(devices),
            Err(e) => {
                error!(error = %e, "device fetch failed");
                None
            }
        };

        let batch = self
            .sink()
            .new_batch(&self.config().batch)
            .inspect_err(|e| error!(error = %e, "creating point batch failed"))?;

        Ok(Metrics {
            sites,
            clients,
            devices,
            batch,
        })
    }
}
