// InfluxDB points and line-protocol encoding.

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Timestamp precision accepted by the `/write` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    #[default]
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
}

impl Precision {
    /// The `precision=` query value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nanoseconds => "ns",
            Self::Microseconds => "us",
            Self::Milliseconds => "ms",
            Self::Seconds => "s",
        }
    }

    fn timestamp(self, time: &DateTime<Utc>) -> Option<i64> {
        match self {
            Self::Nanoseconds => time.timestamp_nanos_opt(),
            Self::Microseconds => Some(time.timestamp_micros()),
            Self::Milliseconds => Some(time.timestamp_millis()),
            Self::Seconds => Some(time.timestamp()),
        }
    }
}

impl FromStr for Precision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "ns" | "n" => Ok(Self::Nanoseconds),
            "us" | "u" => Ok(Self::Microseconds),
            "ms" => Ok(Self::Milliseconds),
            "s" => Ok(Self::Seconds),
            other => Err(format!("unknown precision '{other}'")),
        }
    }
}

/// A single field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Float(f64),
    Integer(i64),
    String(String),
    Boolean(bool),
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}i"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::String(v) => {
                f.write_char('"')?;
                for c in v.chars() {
                    if matches!(c, '"' | '\\') {
                        f.write_char('\\')?;
                    }
                    f.write_char(c)?;
                }
                f.write_char('"')
            }
        }
    }
}

/// Field key → value, ordered so encoded lines are stable.
pub type FieldSet = BTreeMap<String, FieldValue>;

/// Why a point cannot be built or encoded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PointError {
    #[error("point has an empty measurement name")]
    EmptyMeasurement,

    #[error("point '{measurement}' has no fields")]
    NoFields { measurement: String },

    #[error("field '{field}' of point '{measurement}' is not a finite number")]
    NonFiniteField { measurement: String, field: String },

    #[error("timestamp of point '{measurement}' cannot be expressed in {precision}")]
    TimestampOutOfRange {
        measurement: String,
        precision: &'static str,
    },
}

/// One time-series measurement: name, tags, fields, and a timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    measurement: String,
    tags: BTreeMap<String, String>,
    fields: FieldSet,
    time: DateTime<Utc>,
}

impl Point {
    /// Start building a point for `measurement`, timestamped now.
    pub fn builder(measurement: impl Into<String>) -> PointBuilder {
        PointBuilder {
            measurement: measurement.into(),
            tags: BTreeMap::new(),
            fields: FieldSet::new(),
            time: Utc::now(),
        }
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// The point's field set, or the reason it cannot be written.
    pub fn fields(&self) -> Result<&FieldSet, PointError> {
        validate(&self.measurement, &self.fields)?;
        Ok(&self.fields)
    }

    /// Encode as one line of InfluxDB line protocol (no trailing newline).
    pub fn to_line(&self, precision: Precision) -> Result<String, PointError> {
        let fields = self.fields()?;
        let ts = precision
            .timestamp(&self.time)
            .ok_or_else(|| PointError::TimestampOutOfRange {
                measurement: self.measurement.clone(),
                precision: precision.as_str(),
            })?;

        let mut line = String::with_capacity(64 + fields.len() * 16);
        push_escaped(&mut line, &self.measurement, &[',', ' ']);
        for (key, value) in &self.tags {
            line.push(',');
            push_escaped(&mut line, key, &[',', '=', ' ']);
            line.push('=');
            push_escaped(&mut line, value, &[',', '=', ' ']);
        }
        line.push(' ');
        for (i, (key, value)) in fields.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            push_escaped(&mut line, key, &[',', '=', ' ']);
            line.push('=');
            let _ = write!(line, "{value}");
        }
        let _ = write!(line, " {ts}");
        Ok(line)
    }
}

/// Builder returned by [`Point::builder`].
#[derive(Debug)]
pub struct PointBuilder {
    measurement: String,
    tags: BTreeMap<String, String>,
    fields: FieldSet,
    time: DateTime<Utc>,
}

impl PointBuilder {
    /// Add a tag. Empty values are skipped: InfluxDB rejects them.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.tags.insert(key.into(), value);
        }
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Add a field only when the controller reported it.
    pub fn field_opt<V: Into<FieldValue>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.field(key, v),
            None => self,
        }
    }

    pub fn timestamp(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self
    }

    pub fn build(self) -> Result<Point, PointError> {
        validate(&self.measurement, &self.fields)?;
        Ok(Point {
            measurement: self.measurement,
            tags: self.tags,
            fields: self.fields,
            time: self.time,
        })
    }
}

fn validate(measurement: &str, fields: &FieldSet) -> Result<(), PointError> {
    if measurement.is_empty() {
        return Err(PointError::EmptyMeasurement);
    }
    if fields.is_empty() {
        return Err(PointError::NoFields {
            measurement: measurement.to_owned(),
        });
    }
    if let Some((key, _)) = fields
        .iter()
        .find(|(_, v)| matches!(v, FieldValue::Float(f) if !f.is_finite()))
    {
        return Err(PointError::NonFiniteField {
            measurement: measurement.to_owned(),
            field: key.clone(),
        });
    }
    Ok(())
}

fn push_escaped(out: &mut String, s: &str, special: &[char]) {
    for c in s.chars() {
        if c == '\\' || special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}
