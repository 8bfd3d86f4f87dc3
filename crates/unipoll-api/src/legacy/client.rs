// Legacy API HTTP client
//
// Wraps `reqwest::Client` with UniFi-specific URL construction, envelope
// unwrapping, and platform-aware path prefixing. Endpoint modules
// (sites, devices, clients) are implemented as inherent methods in
// separate files to keep this module focused on transport mechanics.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::ControllerPlatform;
use crate::error::Error;
use crate::legacy::models::LegacyResponse;
use crate::transport::TransportConfig;

/// Raw HTTP client for the UniFi controller's legacy API.
///
/// Handles the `{ data: [], meta: { rc, msg } }` envelope, site-scoped
/// URL construction, and platform-aware path prefixing. All methods return
/// unwrapped `data` payloads -- the envelope is stripped before the caller
/// sees it.
///
/// Unlike a single-site client, every site-scoped call takes the site name
/// explicitly: the poller walks many sites with one session.
pub struct LegacyClient {
    http: reqwest::Client,
    base_url: Url,
    platform: ControllerPlatform,
}

impl LegacyClient {
    /// Create a new legacy client from a `TransportConfig`.
    ///
    /// If the config doesn't already include a cookie jar, one is created
    /// automatically (legacy auth requires cookies). The `base_url` should be
    /// the controller root (e.g. `https://192.168.1.1` for UniFi OS or
    /// `https://controller:8443` for standalone).
    pub fn new(
        base_url: Url,
        platform: ControllerPlatform,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        Ok(Self {
            http,
            base_url,
            platform,
        })
    }

    /// Create a legacy client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, platform: ControllerPlatform) -> Self {
        Self {
            http,
            base_url,
            platform,
        }
    }

    /// The underlying HTTP client (for auth flows that need direct access).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The controller base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The detected controller platform.
    pub fn platform(&self) -> ControllerPlatform {
        self.platform
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for a controller-level API path.
    ///
    /// Applies the platform-specific legacy prefix, then appends `/api/{path}`.
    /// For example, on UniFi OS: `https://host/proxy/network/api/{path}`
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let prefix = self.platform.legacy_prefix();
        Ok(self.base_url.join(&format!("{prefix}/api/{path}"))?)
    }

    /// Build a site-scoped URL: `{base}{prefix}/api/s/{site}/{path}`
    pub(crate) fn site_url(&self, site: &str, path: &str) -> Result<Url, Error> {
        self.api_url(&format!("s/{site}/{path}"))
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and unwrap the legacy envelope.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, Error> {
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_envelope(resp).await
    }

    /// Parse the `{ meta, data }` envelope, returning `data` on success
    /// or an `Error::LegacyApi` if `meta.rc != "ok"`.
    async fn parse_envelope<T: DeserializeOwned>(resp: reqwest::Response) -> Result<Vec<T>, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::SessionExpired);
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        let envelope: LegacyResponse<T> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        match envelope.meta.rc.as_str() {
            "ok" => Ok(envelope.data),
            _ if envelope.meta.msg.as_deref() == Some("api.err.LoginRequired") => {
                Err(Error::SessionExpired)
            }
            _ => Err(Error::LegacyApi {
                message: envelope
                    .meta
                    .msg
                    .unwrap_or_else(|| format!("rc={}", envelope.meta.rc)),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(platform: ControllerPlatform) -> LegacyClient {
        LegacyClient::with_client(
            reqwest::Client::new(),
            Url::parse("https://10.0.0.1:8443/").unwrap(),
            platform,
        )
    }

    #[test]
    fn site_url_on_classic_controller() {
        let url = client(ControllerPlatform::ClassicController)
            .site_url("ops", "stat/sta")
            .unwrap();
        assert_eq!(url.as_str(), "https://10.0.0.1:8443/api/s/ops/stat/sta");
    }

    #[test]
    fn api_url_on_unifi_os() {
        let url = client(ControllerPlatform::UnifiOs)
            .api_url("self/sites")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://10.0.0.1:8443/proxy/network/api/self/sites"
        );
    }
}
