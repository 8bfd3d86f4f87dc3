// Legacy API client modules
//
// Hand-written client for the UniFi controller's legacy (non-OpenAPI)
// endpoints the poller reads: sites, stations, and devices, all wrapped
// in the standard `{ meta: { rc, msg }, data: [...] }` envelope.

pub mod auth;
pub mod client;
pub mod clients;
pub mod devices;
pub mod models;
pub mod sites;

pub use client::LegacyClient;
