// ── Site selection ──
//
// Resolves the configured site names against what the controller has.

use serde::Serialize;
use tracing::{info, warn};

use crate::config::is_lambda;
use crate::error::CoreError;
use crate::model::Site;
use crate::source::InventorySource;

/// Configured-site sentinel meaning "every site on the controller".
pub const ALL_SITES: &str = "all";

/// Outcome of the startup site check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SiteCheck {
    /// Site names the controller reported, in controller order.
    pub found: Vec<String>,
    /// Configured names the controller does not have.
    pub missing: Vec<String>,
}

/// The configured site list and the queries that apply it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteFilter {
    sites: Vec<String>,
}

impl SiteFilter {
    pub fn new(sites: Vec<String>) -> Self {
        Self { sites }
    }

    pub fn configured(&self) -> &[String] {
        &self.sites
    }

    /// An empty list or one containing `"all"` selects every site.
    pub fn selects_all(&self) -> bool {
        self.sites.is_empty() || self.sites.iter().any(|s| s == ALL_SITES)
    }

    /// Verify the configured sites exist on the controller.
    ///
    /// Skipped in lambda mode. A list containing `"all"` is normalized to
    /// exactly `["all"]`. Unknown site names are logged, never fatal.
    pub async fn check_sites<S>(&mut self, source: &S, mode: &str) -> Result<Option<SiteCheck>, CoreError>
    where
        S: InventorySource + ?Sized,
    {
        if is_lambda(mode) {
            return Ok(None);
        }

        let sites = source.fetch_sites().await?;
        let listing = sites
            .iter()
            .map(|s| format!("{} ({})", s.name, s.desc))
            .collect::<Vec<_>>()
            .join(", ");
        info!("found {} site(s) on controller: {listing}", sites.len());

        let found: Vec<String> = sites.into_iter().map(|s| s.name).collect();

        if self.sites.iter().any(|s| s == ALL_SITES) {
            self.sites = vec![ALL_SITES.to_owned()];
            return Ok(Some(SiteCheck {
                found,
                missing: Vec::new(),
            }));
        }

        let missing: Vec<String> = self
            .sites
            .iter()
            .filter(|configured| !found.contains(*configured))
            .cloned()
            .collect();
        for site in &missing {
            warn!(site = %site, "configured site not found on controller");
        }

        Ok(Some(SiteCheck { found, missing }))
    }

    /// The controller's sites narrowed to the configured ones, in controller order.
    pub async fn filtered_sites<S>(&self, source: &S) -> Result<Vec<Site>, CoreError>
    where
        S: InventorySource + ?Sized,
    {
        let mut sites = source.fetch_sites().await?;
        if !self.selects_all() {
            sites.retain(|site| self.sites.contains(&site.name));
        }
        Ok(sites)
    }
}
