// ── Per-cycle snapshot ──

use tracing::error;
use unipoll_api::{BatchPoints, PointError};

use crate::model::{Client, Devices, EntityId, PointSource, Site, optional_points};

/// Everything collected in one cycle, plus the batch it will be written as.
#[derive(Debug)]
pub struct Metrics {
    pub sites: Vec<Site>,
    pub clients: Vec<Client>,
    /// `None` when the device fetch failed, as opposed to a site with no devices.
    pub devices: Option<Devices>,
    pub batch: BatchPoints,
}

/// What `process_points` added to the batch.
#[derive(Debug, Default)]
pub struct PointReport {
    /// Entities visited.
    pub entities: usize,
    /// Points added to the batch.
    pub points: usize,
    pub failures: Vec<(EntityId, PointError)>,
}

impl PointReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl Metrics {
    pub fn new(batch: BatchPoints) -> Self {
        Self {
            sites: Vec::new(),
            clients: Vec::new(),
            devices: None,
            batch,
        }
    }

    /// Turn every collected entity into points and add them to the batch.
    ///
    /// An entity that fails is recorded and logged; the rest still report.
    pub fn process_points(&mut self) -> PointReport {
        let mut report = PointReport::default();

        let sites = self.sites.iter().map(|s| s as &dyn PointSource);
        let clients = self.clients.iter().map(|c| c as &dyn PointSource);
        let devices = self.devices.iter().flat_map(Devices::entities);

        for entity in sites.chain(clients).chain(devices) {
            report.entities += 1;
            match optional_points(Some(entity)) {
                Ok(points) => {
                    report.points += points.len();
                    self.batch.add_points(points);
                }
                Err(e) => {
                    let id = entity.entity_id();
                    error!(entity = %id, error = %e, "failed to produce points");
                    report.failures.push((id, e));
                }
            }
        }

        report
    }

    pub fn device_counts(&self) -> (usize, usize, usize) {
        self.devices
            .as_ref()
            .map_or((0, 0, 0), |d| (d.uaps.len(), d.usgs.len(), d.usws.len()))
    }
}
