// ── Domain model ──
//
// Entities the poller collects and the points each one produces.

pub mod client;
pub mod device;
pub mod entity;
pub mod site;

pub use client::Client;
pub use device::{DeviceStats, Devices, Uap, Usg, Usw};
pub use entity::{EntityId, EntityKind, PointSource, optional_points};
pub use site::{Site, SiteHealth};
