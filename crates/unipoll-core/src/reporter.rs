// ── Metrics reporting ──

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use crate::error::CoreError;
use crate::metrics::Metrics;
use crate::poller::Poller;
use crate::sink::MetricsSink;
use crate::source::InventorySource;

const WRITE_CONTEXT: &str = "writing points to InfluxDB";

/// Counts from one successful report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub sites: usize,
    pub clients: usize,
    pub uaps: usize,
    pub usgs: usize,
    pub usws: usize,
    pub points: usize,
    pub fields: usize,
    /// Entities that produced no points because of an error.
    pub failures: usize,
}

impl<S: InventorySource, K: MetricsSink> Poller<S, K> {
    /// Convert a snapshot into points and write them as one batch.
    ///
    /// Per-entity point failures are logged and counted; only the write
    /// itself can fail the report.
    pub async fn report_metrics(&self, mut metrics: Metrics) -> Result<ReportSummary, CoreError> {
        let report = metrics.process_points();

        self.sink()
            .write(&metrics.batch)
            .await
            .map_err(|source| CoreError::Write {
                context: WRITE_CONTEXT,
                source,
            })?;

        let fields = metrics
            .batch
            .points()
            .iter()
            .filter_map(|p| p.fields().ok())
            .map(BTreeMap::len)
            .sum();
        let (uaps, usgs, usws) = metrics.device_counts();

        let summary = ReportSummary {
            sites: metrics.sites.len(),
            clients: metrics.clients.len(),
            uaps,
            usgs,
            usws,
            points: metrics.batch.len(),
            fields,
            failures: report.failures.len(),
        };

        info!(
            sites = summary.sites,
            clients = summary.clients,
            uaps = summary.uaps,
            usgs = summary.usgs,
            usws = summary.usws,
            points = summary.points,
            fields = summary.fields,
            "measurements recorded"
        );

        Ok(summary)
    }
}
