// Legacy API device endpoints

use tracing::debug;

use crate::error::Error;
use crate::legacy::client::LegacyClient;
use crate::legacy::models::LegacyDevice;

impl LegacyClient {
    /// List all devices on a site with full statistics.
    ///
    /// `GET /api/s/{site}/stat/device`
    pub async fn list_devices(&self, site: &str) -> Result<Vec<LegacyDevice>, Error> {
        let url = self.site_url(site, "stat/device")?;
        debug!(site, "listing devices");
        self.get(url).await
    }
}
