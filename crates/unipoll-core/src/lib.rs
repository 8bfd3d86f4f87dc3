// unipoll-core: Site filtering, metrics collection, and the poll loop.

pub mod collector;
pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod poller;
pub mod reporter;
pub mod sink;
pub mod sites;
pub mod source;

#[cfg(test)]
mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ControllerConfig, InfluxConfig, PollerConfig, TlsVerification};
pub use error::CoreError;
pub use metrics::{Metrics, PointReport};
pub use poller::{PollState, Poller};
pub use reporter::ReportSummary;
pub use sink::{MetricsSink, connect_influx};
pub use sites::{ALL_SITES, SiteCheck, SiteFilter};
pub use source::{InventorySource, UnifiSource};

pub use model::{
    Client, DeviceStats, Devices, EntityId, EntityKind, PointSource, Site, SiteHealth, Uap, Usg,
    Usw,
};
