// Legacy API response types
//
// Models for the UniFi controller's legacy JSON API. All responses are wrapped
// in the `LegacyResponse<T>` envelope. Fields use `#[serde(default)]` liberally
// because the API is inconsistent about field presence across firmware versions.

use serde::{Deserialize, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// Standard UniFi legacy API response envelope.
///
/// Every legacy endpoint wraps its payload:
/// ```json
/// { "meta": { "rc": "ok", "msg": "optional" }, "data": [...] }
/// ```
#[derive(Debug, Deserialize)]
pub struct LegacyResponse<T> {
    pub meta: Meta,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Metadata from the legacy envelope. `rc` == `"ok"` means success.
#[derive(Debug, Deserialize)]
pub struct Meta {
    pub rc: String,
    #[serde(default)]
    pub msg: Option<String>,
}

// ── Device ───────────────────────────────────────────────────────────

/// Full device object from `stat/device`.
///
/// The legacy API can return 100+ fields per device. We model the ones the
/// poller records; everything else lands in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyDevice {
    #[serde(rename = "_id")]
    pub id: String,
    pub mac: String,
    /// `uap`, `ugw`/`usg`/`udm`, or `usw`.
    #[serde(rename = "type")]
    pub device_type: String,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub adopted: bool,
    /// 0=offline, 1=online, 2=pending, 4=upgrading, 5=provisioning
    #[serde(default)]
    pub state: i32,
    #[serde(default)]
    pub sys_stats: Option<SysStats>,
    #[serde(default, rename = "system-stats")]
    pub system_stats: Option<SystemStats>,
    #[serde(default)]
    pub uptime: Option<i64>,
    #[serde(default)]
    pub num_sta: Option<i64>,
    #[serde(default, rename = "user-num_sta")]
    pub user_num_sta: Option<i64>,
    #[serde(default, rename = "guest-num_sta")]
    pub guest_num_sta: Option<i64>,
    #[serde(default)]
    pub bytes: Option<i64>,
    #[serde(default)]
    pub rx_bytes: Option<i64>,
    #[serde(default)]
    pub tx_bytes: Option<i64>,
    #[serde(default)]
    pub site_id: Option<String>,
    /// Gateway uplink.
    #[serde(default)]
    pub wan1: Option<WanPort>,
    /// Switch (and some gateway) ports.
    #[serde(default)]
    pub port_table: Vec<PortEntry>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// System statistics nested inside `LegacyDevice`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SysStats {
    #[serde(default, rename = "loadavg_1")]
    pub load_1: Option<String>,
    #[serde(default, rename = "loadavg_5")]
    pub load_5: Option<String>,
    #[serde(default, rename = "loadavg_15")]
    pub load_15: Option<String>,
    #[serde(default)]
    pub mem_total: Option<i64>,
    #[serde(default)]
    pub mem_used: Option<i64>,
}

/// CPU / memory utilisation percentages, reported as strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStats {
    #[serde(default)]
    pub cpu: Option<String>,
    #[serde(default)]
    pub mem: Option<String>,
}

/// A gateway WAN interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WanPort {
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub up: Option<bool>,
    #[serde(default)]
    pub rx_bytes: Option<i64>,
    #[serde(default)]
    pub tx_bytes: Option<i64>,
}

/// One row of a device's `port_table`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortEntry {
    #[serde(default)]
    pub port_idx: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub up: bool,
    #[serde(default)]
    pub rx_bytes: Option<i64>,
    #[serde(default)]
    pub tx_bytes: Option<i64>,
}

// ── Client (Station) ─────────────────────────────────────────────────

/// Connected client from `stat/sta`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyClientEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub mac: String,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub oui: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_guest: Option<bool>,
    #[serde(default)]
    pub is_wired: Option<bool>,
    #[serde(default)]
    pub signal: Option<i64>,
    #[serde(default)]
    pub tx_bytes: Option<i64>,
    #[serde(default)]
    pub rx_bytes: Option<i64>,
    #[serde(default)]
    pub tx_rate: Option<i64>,
    #[serde(default)]
    pub rx_rate: Option<i64>,
    #[serde(default)]
    pub uptime: Option<i64>,
    #[serde(default)]
    pub site_id: Option<String>,
    #[serde(default)]
    pub essid: Option<String>,
    #[serde(default)]
    pub channel: Option<i64>,
    #[serde(default)]
    pub radio: Option<String>,
    #[serde(default)]
    pub rssi: Option<i64>,
    #[serde(default)]
    pub noise: Option<i64>,
    #[serde(default)]
    pub satisfaction: Option<i64>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Site ─────────────────────────────────────────────────────────────

/// Site object from `/api/self/sites`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacySite {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    /// Per-subsystem health (`wlan`, `lan`, `wan`, `www`, `vpn`).
    #[serde(default)]
    pub health: Vec<LegacySiteHealth>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One subsystem's health entry. Counters vary by subsystem, so they
/// stay in `extra` and are picked out by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacySiteHealth {
    pub subsystem: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
