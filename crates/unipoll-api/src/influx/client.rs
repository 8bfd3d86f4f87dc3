// InfluxDB 1.x HTTP write client

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::influx::batch::BatchPoints;
use crate::transport::TransportConfig;

/// Client for the InfluxDB 1.x `/write` endpoint.
pub struct InfluxClient {
    http: reqwest::Client,
    base_url: Url,
    username: Option<String>,
    password: Option<SecretString>,
}

impl InfluxClient {
    pub fn new(
        base_url: Url,
        username: Option<String>,
        password: Option<SecretString>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, username, password))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        username: Option<String>,
        password: Option<SecretString>,
    ) -> Self {
        Self {
            http,
            base_url,
            username,
            password,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/write`, keeping any path prefix on the base URL.
    fn write_url(&self) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push("write");
        Ok(url)
    }

    /// Write a batch. Empty batches are not sent.
    ///
    /// `POST /write?db={db}&precision={p}[&rp={rp}]` with a line-protocol
    /// body. Anything other than `204 No Content` is an error.
    pub async fn write(&self, batch: &BatchPoints) -> Result<(), Error> {
        if batch.is_empty() {
            debug!("empty batch, skipping write");
            return Ok(());
        }

        let body = batch.to_line_protocol()?;

        let mut url = self.write_url()?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("db", batch.database());
            query.append_pair("precision", batch.precision().as_str());
            if let Some(rp) = batch.retention_policy() {
                query.append_pair("rp", rp);
            }
        }

        debug!(points = batch.len(), "POST {}", url);

        let mut req = self.http.post(url).body(body);
        if let Some(ref user) = self.username {
            req = req.basic_auth(user, self.password.as_ref().map(ExposeSecret::expose_secret));
        }

        let resp = req.send().await.map_err(Error::Transport)?;
        let status = resp.status();
        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(());
        }

        let message = resp.text().await.unwrap_or_default();
        Err(Error::Influx {
            status: status.as_u16(),
            message,
        })
    }
}
