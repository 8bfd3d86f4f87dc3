use std::collections::BTreeMap;

use serde::Serialize;
use unipoll_api::legacy::models::{LegacySite, LegacySiteHealth};
use unipoll_api::{FieldValue, Point, PointError};

use super::entity::{EntityId, EntityKind, PointSource};

/// A site (administrative partition) on the controller. Identity is `name`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Site {
    pub name: String,
    pub desc: String,
    pub health: Vec<SiteHealth>,
}

/// Health counters for one subsystem (`wlan`, `lan`, `wan`, `www`, `vpn`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteHealth {
    pub subsystem: String,
    pub status: String,
    /// Numeric counters reported for this subsystem, keyed as the controller names them.
    pub counters: BTreeMap<String, FieldValue>,
}

impl Site {
    pub fn new(name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            desc: desc.into(),
            health: Vec::new(),
        }
    }
}

impl From<LegacySite> for Site {
    fn from(site: LegacySite) -> Self {
        Self {
            desc: site.desc.unwrap_or_default(),
            health: site.health.into_iter().map(SiteHealth::from).collect(),
            name: site.name,
        }
    }
}

impl From<LegacySiteHealth> for SiteHealth {
    fn from(health: LegacySiteHealth) -> Self {
        let counters = health
            .extra
            .into_iter()
            .filter_map(|(key, value)| {
                let value = value
                    .as_i64()
                    .map(FieldValue::Integer)
                    .or_else(|| value.as_f64().map(FieldValue::Float))?;
                Some((key, value))
            })
            .collect();

        Self {
            subsystem: health.subsystem,
            status: health.status.unwrap_or_default(),
            counters,
        }
    }
}

impl PointSource for Site {
    fn entity_id(&self) -> EntityId {
        EntityId::new(EntityKind::Site, &self.name)
    }

    /// One `subsystems` point per health entry that carries counters.
    /// An entry with no counters has no fields to write and yields no point.
    fn points(&self) -> Result<Vec<Point>, PointError> {
        self.health
            .iter()
            .filter(|h| !h.counters.is_empty())
            .map(|h| {
                let mut builder = Point::builder("subsystems")
                    .tag("name", &self.name)
                    .tag("site_name", &self.name)
                    .tag("desc", &self.desc)
                    .tag("subsystem", &h.subsystem)
                    .tag("status", &h.status);
                for (key, value) in &h.counters {
                    builder = builder.field(key, value.clone());
                }
                builder.build()
            })
            .collect()
    }
}
