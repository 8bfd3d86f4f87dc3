// unipoll-api: Async clients for the UniFi legacy API and the InfluxDB 1.x write API

pub mod auth;
pub mod error;
pub mod influx;
pub mod legacy;
pub mod transport;

pub use auth::ControllerPlatform;
pub use error::Error;
pub use influx::{
    BatchConfig, BatchPoints, FieldSet, FieldValue, InfluxClient, Point, PointBuilder, PointError,
    Precision,
};
pub use legacy::LegacyClient;
pub use transport::{TlsMode, TransportConfig};
