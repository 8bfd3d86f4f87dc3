use std::fmt;

use serde::Serialize;
use strum::Display;
use unipoll_api::{Point, PointError};

/// The closed set of things the poller turns into points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Site,
    Client,
    /// Wireless access point.
    Uap,
    /// Gateway.
    Usg,
    /// Switch.
    Usw,
}

/// Identifies one polled entity in error reports: `uap:aa:bb:cc:dd:ee:ff`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EntityId {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityId {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Anything that can turn itself into time-series points.
///
/// An entity with nothing to report returns an empty vector, not an error.
pub trait PointSource {
    fn entity_id(&self) -> EntityId;

    fn points(&self) -> Result<Vec<Point>, PointError>;
}

/// Points for an entity that may be absent. `None` reports nothing.
pub fn optional_points<T: PointSource + ?Sized>(entity: Option<&T>) -> Result<Vec<Point>, PointError> {
    entity.map_or_else(|| Ok(Vec::new()), T::points)
}

/// Parse a controller-reported decimal string ("0.42", "13.7").
///
/// Blank or unparsable values are treated as unreported. Values that parse
/// to NaN or infinity are kept so point validation can reject them.
pub(crate) fn parse_gauge(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
}
