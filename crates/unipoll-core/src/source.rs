// ── Controller inventory ──
//
// The poller reads sites, clients, and devices through `InventorySource`.
// `UnifiSource` is the production implementation on top of the legacy API.

use std::future::Future;

use async_trait::async_trait;
use secrecy::SecretString;
use tracing::{debug, info, warn};
use unipoll_api::LegacyClient;

use crate::config::ControllerConfig;
use crate::error::CoreError;
use crate::model::{Client, Devices, Site};

/// Read access to the controller's inventory.
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Every site on the controller, in controller order.
    async fn fetch_sites(&self) -> Result<Vec<Site>, CoreError>;

    /// Connected clients across `sites`.
    async fn fetch_clients(&self, sites: &[Site]) -> Result<Vec<Client>, CoreError>;

    /// Network devices across `sites`, sorted by type.
    async fn fetch_devices(&self, sites: &[Site]) -> Result<Devices, CoreError>;
}

/// Session-authenticated UniFi controller.
pub struct UnifiSource {
    client: LegacyClient,
    username: String,
    password: SecretString,
}

impl UnifiSource {
    /// Detect the controller platform and log in.
    pub async fn connect(config: &ControllerConfig) -> Result<Self, CoreError> {
        let url = config.url.to_string();
        let transport = config.transport();

        let platform = LegacyClient::detect_platform(&config.url, &transport)
            .await
            .map_err(|source| CoreError::ConnectionFailed {
                url: url.clone(),
                source,
            })?;
        debug!(?platform, "controller platform detected");

        let client = LegacyClient::new(config.url.clone(), platform, &transport)?;
        let source = Self::with_client(client, config.username.clone(), config.password.clone());
        source.login().await.map_err(|err| match err {
            err @ unipoll_api::Error::Transport(_) => CoreError::ConnectionFailed {
                url: url.clone(),
                source: err,
            },
            other => CoreError::from(other),
        })?;

        info!(%url, "authenticated to controller");
        Ok(source)
    }

    /// Wrap an already-configured client. No login is attempted.
    pub fn with_client(client: LegacyClient, username: String, password: SecretString) -> Self {
        Self {
            client,
            username,
            password,
        }
    }

    pub async fn login(&self) -> Result<(), unipoll_api::Error> {
        self.client.login(&self.username, &self.password).await
    }

    /// End the session. Failures are logged, not returned.
    pub async fn disconnect(&self) {
        if let Err(e) = self.client.logout().await {
            warn!(error = %e, "logout failed (non-fatal)");
        }
    }

    /// Run `op`, logging in again and retrying once if the session expired.
    async fn with_relogin<T, F, Fut>(&self, what: &'static str, op: F) -> Result<T, CoreError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, unipoll_api::Error>>,
    {
        match op().await {
            Err(e) if e.is_auth_expired() => {
                warn!(error = %e, "controller session expired, logging in again");
                self.login().await.map_err(CoreError::fetch(what))?;
                op().await.map_err(CoreError::fetch(what))
            }
            result => result.map_err(CoreError::fetch(what)),
        }
    }
}

#[async_trait]
impl InventorySource for UnifiSource {
    async fn fetch_sites(&self) -> Result<Vec<Site>, CoreError> {
        let sites = self
            .with_relogin("sites", || self.client.list_sites())
            .await?;
        Ok(sites.into_iter().map(Site::from).collect())
    }

    async fn fetch_clients(&self, sites: &[Site]) -> Result<Vec<Client>, CoreError> {
        let mut clients = Vec::new();
        for site in sites {
            let entries = self
                .with_relogin("clients", || self.client.list_clients(&site.name))
                .await?;
            debug!(site = %site.name, count = entries.len(), "fetched clients");
            clients.extend(
                entries
                    .into_iter()
                    .map(|entry| Client::from_legacy(&site.name, entry)),
            );
        }
        Ok(clients)
    }

    async fn fetch_devices(&self, sites: &[Site]) -> Result<Devices, CoreError> {
        let mut devices = Devices::default();
        for site in sites {
            let entries = self
                .with_relogin("devices", || self.client.list_devices(&site.name))
                .await?;
            debug!(site = %site.name, count = entries.len(), "fetched devices");
            devices.extend_from_legacy(&site.name, entries);
        }
        Ok(devices)
    }
}
