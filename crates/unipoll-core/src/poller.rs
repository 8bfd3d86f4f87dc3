// ── Poll loop ──
//
// Owns the controller source, the metrics sink, and the error counter.
// Each tick runs one collect-and-report cycle to completion before the
// next tick is awaited.

use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::config::PollerConfig;
use crate::error::CoreError;
use crate::reporter::ReportSummary;
use crate::sink::MetricsSink;
use crate::sites::{SiteCheck, SiteFilter};
use crate::source::InventorySource;

/// Failed-cycle bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollState {
    pub error_count: u64,
    /// Stop once `error_count` exceeds this. Negative never stops.
    pub max_errors: i64,
}

impl PollState {
    pub fn new(max_errors: i64) -> Self {
        Self {
            error_count: 0,
            max_errors,
        }
    }

    pub fn threshold_exceeded(&self) -> bool {
        u64::try_from(self.max_errors).is_ok_and(|max| self.error_count > max)
    }

    /// Count a failed cycle; errors once the threshold is crossed.
    pub fn record_failure(&mut self) -> Result<(), CoreError> {
        self.error_count += 1;
        if self.threshold_exceeded() {
            return Err(CoreError::MaxErrorsReached {
                count: self.error_count,
                max: self.max_errors,
            });
        }
        Ok(())
    }
}

/// Periodically moves controller inventory into the metrics sink.
pub struct Poller<S, K> {
    config: PollerConfig,
    source: S,
    sink: K,
    sites: SiteFilter,
    state: PollState,
}

impl<S: InventorySource, K: MetricsSink> Poller<S, K> {
    pub fn new(config: PollerConfig, source: S, sink: K) -> Self {
        Self {
            sites: SiteFilter::new(config.sites.clone()),
            state: PollState::new(config.max_errors),
            config,
            source,
            sink,
        }
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sites(&self) -> &SiteFilter {
        &self.sites
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Startup site verification. Does nothing in lambda mode.
    pub async fn check_sites(&mut self) -> Result<Option<SiteCheck>, CoreError> {
        self.sites.check_sites(&self.source, &self.config.mode).await
    }

    /// Lambda mode runs a single cycle; any other mode polls until the
    /// error threshold is crossed.
    pub async fn run(&mut self) -> Result<(), CoreError> {
        if self.config.is_lambda() {
            info!(mode = %self.config.mode, "running a single collection");
            return self.collect_and_report().await.map(|_| ());
        }
        self.poll_controller().await
    }

    /// Poll forever, one cycle per tick.
    ///
    /// Returns only with [`CoreError::MaxErrorsReached`].
    pub async fn poll_controller(&mut self) -> Result<(), CoreError> {
        let period = self.config.tick_interval();
        info!(
            mode = %self.config.mode,
            interval = ?period,
            max_errors = self.state.max_errors,
            "poller started"
        );

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await; // consume the immediate first tick

        loop {
            ticker.tick().await;
            if self.collect_and_report().await.is_err() {
                self.state.record_failure().inspect_err(|e| error!(error = %e, "stopping"))?;
                warn!(
                    errors = self.state.error_count,
                    "cycle failed, next attempt in {}s",
                    period.as_secs()
                );
            }
        }
    }

    /// One collection followed by one report.
    pub async fn collect_and_report(&self) -> Result<ReportSummary, CoreError> {
        let metrics = self.collect_metrics().await?;
        self.report_metrics(metrics)
            .await
            .inspect_err(|e| error!(error = %e, "reporting metrics failed"))
    }
}
