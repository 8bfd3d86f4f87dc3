use serde::Serialize;
use tracing::debug;
use unipoll_api::legacy::models::LegacyDevice;
use unipoll_api::{Point, PointBuilder, PointError};

use super::entity::{EntityId, EntityKind, PointSource, parse_gauge};

/// Statistics every device type reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceStats {
    pub site_name: String,
    pub mac: String,
    pub name: String,
    pub model: String,
    pub version: String,
    pub serial: String,
    pub device_type: String,
    pub ip: String,
    pub state: i32,
    pub uptime: Option<i64>,
    pub num_sta: Option<i64>,
    pub user_num_sta: Option<i64>,
    pub guest_num_sta: Option<i64>,
    pub loadavg_1: Option<String>,
    pub loadavg_5: Option<String>,
    pub loadavg_15: Option<String>,
    pub mem_total: Option<i64>,
    pub mem_used: Option<i64>,
    pub cpu: Option<String>,
    pub mem: Option<String>,
    pub bytes: Option<i64>,
    pub rx_bytes: Option<i64>,
    pub tx_bytes: Option<i64>,
}

impl DeviceStats {
    fn from_legacy(site_name: &str, device: &LegacyDevice) -> Self {
        let sys = device.sys_stats.as_ref();
        let system = device.system_stats.as_ref();
        Self {
            site_name: site_name.to_owned(),
            mac: device.mac.clone(),
            name: device.name.clone().unwrap_or_default(),
            model: device.model.clone().unwrap_or_default(),
            version: device.version.clone().unwrap_or_default(),
            serial: device.serial.clone().unwrap_or_default(),
            device_type: device.device_type.clone(),
            ip: device.ip.clone().unwrap_or_default(),
            state: device.state,
            uptime: device.uptime,
            num_sta: device.num_sta,
            user_num_sta: device.user_num_sta,
            guest_num_sta: device.guest_num_sta,
            loadavg_1: sys.and_then(|s| s.load_1.clone()),
            loadavg_5: sys.and_then(|s| s.load_5.clone()),
            loadavg_15: sys.and_then(|s| s.load_15.clone()),
            mem_total: sys.and_then(|s| s.mem_total),
            mem_used: sys.and_then(|s| s.mem_used),
            cpu: system.and_then(|s| s.cpu.clone()),
            mem: system.and_then(|s| s.mem.clone()),
            bytes: device.bytes,
            rx_bytes: device.rx_bytes,
            tx_bytes: device.tx_bytes,
        }
    }

    /// Tags and fields shared by `uap`, `usg`, and `usw` points.
    fn point(&self, measurement: &str) -> PointBuilder {
        Point::builder(measurement)
            .tag("mac", &self.mac)
            .tag("site_name", &self.site_name)
            .tag("name", &self.name)
            .tag("model", &self.model)
            .tag("version", &self.version)
            .tag("type", &self.device_type)
            .tag("serial", &self.serial)
            .field("ip", self.ip.as_str())
            .field("state", self.state)
            .field_opt("uptime", self.uptime)
            .field_opt("num_sta", self.num_sta)
            .field_opt("user-num_sta", self.user_num_sta)
            .field_opt("guest-num_sta", self.guest_num_sta)
            .field_opt("loadavg_1", parse_gauge(self.loadavg_1.as_deref()))
            .field_opt("loadavg_5", parse_gauge(self.loadavg_5.as_deref()))
            .field_opt("loadavg_15", parse_gauge(self.loadavg_15.as_deref()))
            .field_opt("mem_total", self.mem_total)
            .field_opt("mem_used", self.mem_used)
            .field_opt("cpu", parse_gauge(self.cpu.as_deref()))
            .field_opt("mem", parse_gauge(self.mem.as_deref()))
            .field_opt("bytes", self.bytes)
            .field_opt("rx_bytes", self.rx_bytes)
            .field_opt("tx_bytes", self.tx_bytes)
    }
}

/// Wireless access point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Uap {
    #[serde(flatten)]
    pub stats: DeviceStats,
}

/// Gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Usg {
    #[serde(flatten)]
    pub stats: DeviceStats,
    pub wan_ip: Option<String>,
    pub wan_rx_bytes: Option<i64>,
    pub wan_tx_bytes: Option<i64>,
}

/// Switch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Usw {
    #[serde(flatten)]
    pub stats: DeviceStats,
    pub num_ports: usize,
    pub ports_up: usize,
}

impl PointSource for Uap {
    fn entity_id(&self) -> EntityId {
        EntityId::new(EntityKind::Uap, &self.stats.mac)
    }

    fn points(&self) -> Result<Vec<Point>, PointError> {
        Ok(vec![self.stats.point("uap").build()?])
    }
}

impl PointSource for Usg {
    fn entity_id(&self) -> EntityId {
        EntityId::new(EntityKind::Usg, &self.stats.mac)
    }

    fn points(&self) -> Result<Vec<Point>, PointError> {
        let point = self
            .stats
            .point("usg")
            .field_opt("wan-ip", self.wan_ip.clone())
            .field_opt("wan-rx_bytes", self.wan_rx_bytes)
            .field_opt("wan-tx_bytes", self.wan_tx_bytes)
            .build()?;
        Ok(vec![point])
    }
}

impl PointSource for Usw {
    fn entity_id(&self) -> EntityId {
        EntityId::new(EntityKind::Usw, &self.stats.mac)
    }

    fn points(&self) -> Result<Vec<Point>, PointError> {
        let point = self
            .stats
            .point("usw")
            .field("num_ports", i64::try_from(self.num_ports).unwrap_or(i64::MAX))
            .field("ports_up", i64::try_from(self.ports_up).unwrap_or(i64::MAX))
            .build()?;
        Ok(vec![point])
    }
}

/// Devices from one collection cycle, split by type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Devices {
    pub uaps: Vec<Uap>,
    pub usgs: Vec<Usg>,
    pub usws: Vec<Usw>,
}

impl Devices {
    /// Sort `stat/device` entries from `site_name` into their categories.
    ///
    /// Types the poller does not record are skipped.
    pub fn extend_from_legacy(&mut self, site_name: &str, devices: Vec<LegacyDevice>) {
        for device in devices {
            let stats = DeviceStats::from_legacy(site_name, &device);
            match device.device_type.as_str() {
                "uap" => self.uaps.push(Uap { stats }),
                "ugw" | "usg" | "udm" | "uxg" => self.usgs.push(Usg {
                    stats,
                    wan_ip: device.wan1.as_ref().and_then(|w| w.ip.clone()),
                    wan_rx_bytes: device.wan1.as_ref().and_then(|w| w.rx_bytes),
                    wan_tx_bytes: device.wan1.as_ref().and_then(|w| w.tx_bytes),
                }),
                "usw" => self.usws.push(Usw {
                    stats,
                    num_ports: device.port_table.len(),
                    ports_up: device.port_table.iter().filter(|p| p.up).count(),
                }),
                other => debug!(mac = %device.mac, device_type = other, "skipping unsupported device type"),
            }
        }
    }

    /// Every device as a point source, in category order.
    pub fn entities(&self) -> impl Iterator<Item = &dyn PointSource> {
        let uaps = self.uaps.iter().map(|d| d as &dyn PointSource);
        let usgs = self.usgs.iter().map(|d| d as &dyn PointSource);
        let usws = self.usws.iter().map(|d| d as &dyn PointSource);
        uaps.chain(usgs).chain(usws)
    }

    pub fn len(&self) -> usize {
        self.uaps.len() + self.usgs.len() + self.usws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use unipoll_api::FieldValue;

    use super::*;

    fn legacy(value: serde_json::Value) -> LegacyDevice {
        serde_json::from_value(value).unwrap()
    }

    fn devices() -> Devices {
        let mut devices = Devices::default();
        devices.extend_from_legacy(
            "default",
            vec![
                legacy(json!({
                    "_id": "1", "mac": "aa:00", "type": "uap", "name": "Lobby AP",
                    "num_sta": 7,
                    "sys_stats": { "loadavg_1": "0.12", "mem_total": 1000, "mem_used": 400 },
                    "system-stats": { "cpu": "5.5", "mem": "40" }
                })),
                legacy(json!({
                    "_id": "2", "mac": "aa:01", "type": "ugw",
                    "wan1": { "ip": "203.0.113.7", "rx_bytes": 10, "tx_bytes": 20 }
                })),
                legacy(json!({
                    "_id": "3", "mac": "aa:02", "type": "usw",
                    "port_table": [{ "up": true }, { "up": false }, { "up": true }]
                })),
                legacy(json!({ "_id": "4", "mac": "aa:03", "type": "uph" })),
            ],
        );
        devices
    }

    #[test]
    fn sorts_devices_by_type() {
        let devices = devices();
        assert_eq!(devices.uaps.len(), 1);
        assert_eq!(devices.usgs.len(), 1);
        assert_eq!(devices.usws.len(), 1);
        assert_eq!(devices.len(), 3);
        assert_eq!(devices.usws[0].ports_up, 2);
    }

    #[test]
    fn entities_walk_categories_in_order() {
        let ids: Vec<String> = devices()
            .entities()
            .map(|e| e.entity_id().to_string())
            .collect();
        assert_eq!(ids, ["uap:aa:00", "usg:aa:01", "usw:aa:02"]);
    }

    #[test]
    fn uap_point_parses_gauges() {
        let devices = devices();
        let points = devices.uaps[0].points().unwrap();
        let fields = points[0].fields().unwrap();

        assert_eq!(points[0].measurement(), "uap");
        assert_eq!(fields["loadavg_1"], FieldValue::Float(0.12));
        assert_eq!(fields["cpu"], FieldValue::Float(5.5));
        assert_eq!(fields["num_sta"], FieldValue::Integer(7));
        assert!(!fields.contains_key("loadavg_5"));
    }

    #[test]
    fn usg_and_usw_add_their_own_fields() {
        let devices = devices();

        let usg = devices.usgs[0].points().unwrap();
        assert_eq!(
            usg[0].fields().unwrap()["wan-ip"],
            FieldValue::String("203.0.113.7".into())
        );

        let usw = devices.usws[0].points().unwrap();
        assert_eq!(usw[0].fields().unwrap()["num_ports"], FieldValue::Integer(3));
    }

    #[test]
    fn non_finite_gauge_is_a_point_error() {
        let mut devices = Devices::default();
        devices.extend_from_legacy(
            "default",
            vec![legacy(json!({
                "_id": "1", "mac": "aa:00", "type": "uap",
                "system-stats": { "cpu": "NaN" }
            }))],
        );

        let err = devices.uaps[0].points().unwrap_err();
        assert!(matches!(err, PointError::NonFiniteField { field, .. } if field == "cpu"));
    }
}
