// In-memory source and sink for unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use unipoll_api::BatchPoints;

use crate::error::CoreError;
use crate::model::{Client, Devices, Site};
use crate::sink::MetricsSink;
use crate::source::InventorySource;

fn boom() -> unipoll_api::Error {
    unipoll_api::Error::LegacyApi {
        message: "api.err.Invalid".into(),
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeSource {
    pub sites: Vec<Site>,
    pub clients: Vec<Client>,
    pub devices: Devices,
    pub fail_sites: bool,
    pub fail_clients: bool,
    pub fail_devices: bool,
    site_fetches: AtomicUsize,
}

impl FakeSource {
    pub fn with_sites(sites: &[(&str, &str)]) -> Self {
        Self {
            sites: sites.iter().map(|(name, desc)| Site::new(*name, *desc)).collect(),
            ..Self::default()
        }
    }

    pub fn failing_sites(mut self) -> Self {
        self.fail_sites = true;
        self
    }

    pub fn site_fetches(&self) -> usize {
        self.site_fetches.load(Ordering::SeqCst)
    }
}

fn on_sites(sites: &[Site], site_name: &str) -> bool {
    sites.iter().any(|s| s.name == site_name)
}

#[async_trait]
impl InventorySource for FakeSource {
    async fn fetch_sites(&self) -> Result<Vec<Site>, CoreError> {
        self.site_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_sites {
            return Err(CoreError::fetch("sites")(boom()));
        }
        Ok(self.sites.clone())
    }

    async fn fetch_clients(&self, sites: &[Site]) -> Result<Vec<Client>, CoreError> {
        if self.fail_clients {
            return Err(CoreError::fetch("clients")(boom()));
        }
        Ok(self
            .clients
            .iter()
            .filter(|c| on_sites(sites, &c.site_name))
            .cloned()
            .collect())
    }

    async fn fetch_devices(&self, sites: &[Site]) -> Result<Devices, CoreError> {
        if self.fail_devices {
            return Err(CoreError::fetch("devices")(boom()));
        }
        Ok(Devices {
            uaps: self
                .devices
                .uaps
                .iter()
                .filter(|d| on_sites(sites, &d.stats.site_name))
                .cloned()
                .collect(),
            usgs: self
                .devices
                .usgs
                .iter()
                .filter(|d| on_sites(sites, &d.stats.site_name))
                .cloned()
                .collect(),
            usws: self
                .devices
                .usws
                .iter()
                .filter(|d| on_sites(sites, &d.stats.site_name))
                .cloned()
                .collect(),
        })
    }
}

/// Records the size of every batch it is asked to write.
#[derive(Debug, Default)]
pub(crate) struct FakeSink {
    pub fail: bool,
    writes: Mutex<Vec<BatchPoints>>,
}

impl FakeSink {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Every batch passed to `write`, including failed attempts.
    pub fn writes(&self) -> Vec<BatchPoints> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl MetricsSink for FakeSink {
    async fn write(&self, batch: &BatchPoints) -> Result<(), unipoll_api::Error> {
        if let Ok(mut writes) = self.writes.lock() {
            writes.push(batch.clone());
        }
        if self.fail {
            return Err(unipoll_api::Error::Influx {
                status: 500,
                message: "database unavailable".into(),
            });
        }
        Ok(())
    }
}
