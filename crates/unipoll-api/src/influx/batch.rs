// Point batches staged for a single `/write` request.

use crate::error::Error;
use crate::influx::point::{Point, PointError, Precision};

/// Settings a batch is created with.
#[derive(Debug, Clone, Default)]
pub struct BatchConfig {
    /// Target database. Required.
    pub database: String,
    /// Timestamp precision (`ns`, `us`, `ms`, `s`). Empty means `ns`.
    pub precision: String,
    /// Retention policy; the database default when `None`.
    pub retention_policy: Option<String>,
}

impl BatchConfig {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Self::default()
        }
    }
}

/// A mutable batch of points for one database.
#[derive(Debug, Clone)]
pub struct BatchPoints {
    database: String,
    precision: Precision,
    retention_policy: Option<String>,
    points: Vec<Point>,
}

impl BatchPoints {
    /// Create an empty batch, validating the configuration.
    pub fn new(config: &BatchConfig) -> Result<Self, Error> {
        if config.database.trim().is_empty() {
            return Err(Error::InvalidBatch {
                reason: "database name is empty".into(),
            });
        }
        let precision = config
            .precision
            .parse::<Precision>()
            .map_err(|reason| Error::InvalidBatch { reason })?;

        Ok(Self {
            database: config.database.clone(),
            precision,
            retention_policy: config.retention_policy.clone(),
            points: Vec::new(),
        })
    }

    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn add_points(&mut self, points: impl IntoIterator<Item = Point>) {
        self.points.extend(points);
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn retention_policy(&self) -> Option<&str> {
        self.retention_policy.as_deref()
    }

    /// Encode every point, newline-separated.
    pub fn to_line_protocol(&self) -> Result<String, PointError> {
        let mut body = String::new();
        for point in &self.points {
            body.push_str(&point.to_line(self.precision)?);
            body.push('\n');
        }
        Ok(body)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_database() {
        let err = BatchPoints::new(&BatchConfig::new("  ")).unwrap_err();
        assert!(matches!(err, Error::InvalidBatch { .. }));
    }

    #[test]
    fn rejects_unknown_precision() {
        let config = BatchConfig {
            database: "unifi".into(),
            precision: "fortnight".into(),
            retention_policy: None,
        };
        assert!(matches!(
            BatchPoints::new(&config),
            Err(Error::InvalidBatch { reason }) if reason.contains("fortnight")
        ));
    }

    #[test]
    fn encodes_one_line_per_point() {
        let mut batch = BatchPoints::new(&BatchConfig::new("unifi")).unwrap();
        assert!(batch.is_empty());
        batch.add_points(vec![
            Point::builder("a").field("x", 1_i64).build().unwrap(),
            Point::builder("b").field("y", 2_i64).build().unwrap(),
        ]);

        let body = batch.to_line_protocol().unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(body.lines().count(), 2);
        assert!(body.ends_with('\n'));
    }
}
