// InfluxDB 1.x sink
//
// Points, batches, line-protocol encoding, and the HTTP write client.

pub mod batch;
pub mod client;
pub mod point;

pub use batch::{BatchConfig, BatchPoints};
pub use client::InfluxClient;
pub use point::{FieldSet, FieldValue, Point, PointBuilder, PointError, Precision};
