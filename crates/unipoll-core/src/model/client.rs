use serde::Serialize;
use unipoll_api::legacy::models::LegacyClientEntry;
use unipoll_api::{Point, PointError};

use super::entity::{EntityId, EntityKind, PointSource};

/// A connected client (station).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Client {
    pub site_name: String,
    pub mac: String,
    pub name: String,
    pub hostname: String,
    pub ip: String,
    pub oui: String,
    pub essid: String,
    pub radio: String,
    pub is_wired: bool,
    pub is_guest: bool,
    pub channel: Option<i64>,
    pub signal: Option<i64>,
    pub rssi: Option<i64>,
    pub noise: Option<i64>,
    pub satisfaction: Option<i64>,
    pub uptime: Option<i64>,
    pub rx_bytes: Option<i64>,
    pub tx_bytes: Option<i64>,
    pub rx_rate: Option<i64>,
    pub tx_rate: Option<i64>,
}

impl Client {
    /// Convert a `stat/sta` entry fetched from `site_name`.
    pub fn from_legacy(site_name: &str, entry: LegacyClientEntry) -> Self {
        Self {
            site_name: site_name.to_owned(),
            name: entry.name.unwrap_or_default(),
            hostname: entry.hostname.unwrap_or_default(),
            ip: entry.ip.unwrap_or_default(),
            oui: entry.oui.unwrap_or_default(),
            essid: entry.essid.unwrap_or_default(),
            radio: entry.radio.unwrap_or_default(),
            is_wired: entry.is_wired.unwrap_or(false),
            is_guest: entry.is_guest.unwrap_or(false),
            channel: entry.channel,
            signal: entry.signal,
            rssi: entry.rssi,
            noise: entry.noise,
            satisfaction: entry.satisfaction,
            uptime: entry.uptime,
            rx_bytes: entry.rx_bytes,
            tx_bytes: entry.tx_bytes,
            rx_rate: entry.rx_rate,
            tx_rate: entry.tx_rate,
            mac: entry.mac,
        }
    }

    /// Hostname, falling back to the MAC when the controller knows no name.
    fn display_name(&self) -> &str {
        [&self.name, &self.hostname]
            .into_iter()
            .find(|s| !s.is_empty())
            .map_or(self.mac.as_str(), String::as_str)
    }
}

impl PointSource for Client {
    fn entity_id(&self) -> EntityId {
        EntityId::new(EntityKind::Client, &self.mac)
    }

    fn points(&self) -> Result<Vec<Point>, PointError> {
        let point = Point::builder("clients")
            .tag("mac", &self.mac)
            .tag("site_name", &self.site_name)
            .tag("name", self.display_name())
            .tag("oui", &self.oui)
            .tag("essid", &self.essid)
            .tag("radio", &self.radio)
            .tag("is_wired", self.is_wired.to_string())
            .tag("is_guest", self.is_guest.to_string())
            .field("ip", self.ip.as_str())
            .field("hostname", self.hostname.as_str())
            .field_opt("channel", self.channel)
            .field_opt("signal", self.signal)
            .field_opt("rssi", self.rssi)
            .field_opt("noise", self.noise)
            .field_opt("satisfaction", self.satisfaction)
            .field_opt("uptime", self.uptime)
            .field_opt("rx_bytes", self.rx_bytes)
            .field_opt("tx_bytes", self.tx_bytes)
            .field_opt("rx_rate", self.rx_rate)
            .field_opt("tx_rate", self.tx_rate)
            .build()?;
        Ok(vec![point])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use unipoll_api::FieldValue;

    use super::*;

    fn legacy(value: serde_json::Value) -> LegacyClientEntry {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn wireless_client_point() {
        let client = Client::from_legacy(
            "ops",
            legacy(json!({
                "_id": "c1",
                "mac": "11:22:33:44:55:66",
                "hostname": "laptop",
                "ip": "10.0.0.20",
                "essid": "corp",
                "radio": "na",
                "is_wired": false,
                "rssi": 42,
                "rx_bytes": 1000
            })),
        );

        let points = client.points().unwrap();

        assert_eq!(points.len(), 1);
        let point = &points[0];
        assert_eq!(point.measurement(), "clients");
        assert_eq!(point.tags()["name"], "laptop");
        assert_eq!(point.tags()["site_name"], "ops");
        assert_eq!(point.tags()["is_wired"], "false");
        let fields = point.fields().unwrap();
        assert_eq!(fields["rssi"], FieldValue::Integer(42));
        assert_eq!(fields["ip"], FieldValue::String("10.0.0.20".into()));
        assert!(!fields.contains_key("noise"));
    }

    #[test]
    fn unnamed_client_is_tagged_by_mac() {
        let client = Client::from_legacy("default", legacy(json!({ "_id": "c2", "mac": "aa:aa" })));
        let points = client.points().unwrap();
        assert_eq!(points[0].tags()["name"], "aa:aa");
        assert_eq!(client.entity_id().to_string(), "client:aa:aa");
    }
}
