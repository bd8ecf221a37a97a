use std::net::{IpAddr, Ipv4Addr};

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::constants::defaults;
use crate::interfaces::system::SystemCounters;

use super::firmware::FirmwareInfo;
use super::identity::Identity;
use super::schema::{merge, SchemaStore};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkInfo {
    pub mode: String,
    pub ip: IpAddr,
    pub mac: String,
}

/// Self-description published on connect and served on the adoption route
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdoptionDocument {
    pub firmware: FirmwareInfo,
    pub system: SystemCounters,
    pub network: NetworkInfo,
    pub config_schema: Value,
    pub command_schema: Value,
}

impl AdoptionDocument {
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

pub fn network_info(mode: &str, ip: Option<IpAddr>, identity: Option<&Identity>) -> NetworkInfo {
    NetworkInfo {
        mode: mode.to_string(),
        ip: ip.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
        mac: identity.map(Identity::to_string).unwrap_or_default(),
    }
}

fn schema_properties(fragment: &Value) -> Map<String, Value> {
    let mut properties = Value::Object(Map::new());
    if !fragment.is_null() {
        merge(&mut properties, fragment);
    }
    match properties {
        Value::Object(map) => map,
        // A firmware schema that is not an object has no properties to offer
        _ => Map::new(),
    }
}

fn envelope(title: &str, properties: Map<String, Value>) -> Value {
    json!({
        "$schema": defaults::JSON_SCHEMA_VERSION,
        "title": title,
        "type": "object",
        "properties": properties,
    })
}

pub fn config_schema(firmware: &FirmwareInfo, schemas: &SchemaStore) -> Value {
    envelope(&firmware.short_name, schema_properties(schemas.config()))
}

/// Firmware command schema plus the built-in commands handled by the dispatcher
pub fn command_schema(firmware: &FirmwareInfo, schemas: &SchemaStore) -> Value {
    let mut properties = schema_properties(schemas.command());
    properties.insert(
        "restart".into(),
        json!({"title": "Restart", "type": "boolean"}),
    );
    envelope(&firmware.short_name, properties)
}

pub fn build(
    firmware: &FirmwareInfo,
    system: SystemCounters,
    network: NetworkInfo,
    schemas: &SchemaStore,
) -> AdoptionDocument {
    AdoptionDocument {
        firmware: firmware.clone(),
        system,
        network,
        config_schema: config_schema(firmware, schemas),
        command_schema: command_schema(firmware, schemas),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn firmware() -> FirmwareInfo {
        FirmwareInfo {
            name: "Test Dimmer".into(),
            short_name: "dimmer".into(),
            maker: "Acme".into(),
            version: "0.0.1".into(),
            github_url: Some("https://github.com/acme/dimmer".into()),
        }
    }

    fn document(schemas: &SchemaStore) -> Value {
        let identity = Identity::new([0xa4, 0xcf, 0x12, 0x0b, 0x3d, 0x7e]);
        build(
            &firmware(),
            SystemCounters::default(),
            network_info("wifi", Some("192.168.1.20".parse().unwrap()), Some(&identity)),
            schemas,
        )
        .to_value()
    }

    #[test]
    fn restart_present_without_firmware_commands() {
        let doc = document(&SchemaStore::new());
        assert_eq!(
            doc["commandSchema"]["properties"]["restart"],
            json!({"title": "Restart", "type": "boolean"})
        );
    }

    #[test]
    fn restart_present_alongside_firmware_commands() {
        let mut schemas = SchemaStore::new();
        schemas.set_command_schema(&json!({
            "dim": {"type": "integer"},
            "restart": {"type": "string"}
        }));
        let props = &document(&schemas)["commandSchema"]["properties"];
        assert_eq!(props["dim"], json!({"type": "integer"}));
        assert_eq!(props["restart"]["type"], "boolean");
    }

    #[test]
    fn top_level_sections_and_envelope() {
        let mut schemas = SchemaStore::new();
        schemas.set_config_schema(&json!({"channels": {"type": "integer"}}));
        let doc = document(&schemas);

        assert_eq!(doc["firmware"]["shortName"], "dimmer");
        assert_eq!(doc["firmware"]["githubUrl"], "https://github.com/acme/dimmer");
        assert!(doc["system"]["memoryTotalBytes"].is_u64());
        assert_eq!(
            doc["network"],
            json!({"mode": "wifi", "ip": "192.168.1.20", "mac": "A4:CF:12:0B:3D:7E"})
        );
        assert_eq!(
            doc["configSchema"],
            json!({
                "$schema": defaults::JSON_SCHEMA_VERSION,
                "title": "dimmer",
                "type": "object",
                "properties": {"channels": {"type": "integer"}}
            })
        );
        assert_eq!(doc["commandSchema"]["title"], "dimmer");
        assert_eq!(doc["commandSchema"]["type"], "object");
    }

    #[test]
    fn building_does_not_touch_stored_schemas() {
        let mut schemas = SchemaStore::new();
        schemas.set_command_schema(&json!({"dim": {"type": "integer"}}));
        let before = schemas.command().clone();
        document(&schemas);
        assert_eq!(schemas.command(), &before);
    }

    #[test]
    fn missing_network_defaults() {
        let info = network_info("wifi", None, None);
        assert_eq!(info.ip.to_string(), "0.0.0.0");
        assert!(info.mac.is_empty());
    }
}
