//! Test data fixtures for the mock server.
//!
//! Provides factory functions for creating realistic API objects.

use std::collections::HashMap;

use serde_json::{json, Value};

use crate::config::Credentials;
use crate::models::ModuleType;

/// Collection of fixture factories for test data.
pub struct Fixtures;

impl Fixtures {
    pub const ACCESS_ID: &'static str = "mock-access-id";
    pub const ACCESS_KEY: &'static str = "mock-access-key";

    /// Credentials the default scenario accepts.
    pub fn credentials() -> Credentials {
        Credentials::new(Self::ACCESS_ID, Self::ACCESS_KEY, "mock")
    }

    // =========================================================================
    // LogicModule Fixtures
    // =========================================================================

    /// A module object with the fields every type shares.
    pub fn module(id: u64, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "displayName": name,
            "description": format!("{name} fixture"),
            "appliesTo": "isLinux()",
            "version": 1_700_000_000,
        })
    }

    /// A DataSource with collection settings.
    pub fn datasource(id: u64, name: &str) -> Value {
        let mut ds = Self::module(id, name);
        ds["collectMethod"] = json!("snmp");
        ds["collectInterval"] = json!(180);
        ds["dataPoints"] = json!([{ "id": id * 10, "name": "value" }]);
        ds
    }

    /// An SNMP SysOID mapping (no name field).
    pub fn oid(id: u64, oid: &str, category: &str) -> Value {
        json!({
            "id": id,
            "oid": oid,
            "categories": category,
        })
    }

    /// `count` modules named `<prefix>-<n>`, ids starting at 1.
    pub fn numbered_modules(prefix: &str, count: u64) -> Vec<Value> {
        (1..=count)
            .map(|n| Self::module(n, &format!("{prefix}-{n}")))
            .collect()
    }

    // =========================================================================
    // Device Fixtures
    // =========================================================================

    /// A device with the properties the device table shows.
    pub fn device(id: u64, display_name: &str, manufacturer: &str) -> Value {
        json!({
            "id": id,
            "name": format!("10.0.0.{id}"),
            "displayName": display_name,
            "preferredCollectorId": 1,
            "hostStatus": "normal",
            "autoProperties": [
                { "name": "auto.endpoint.manufacturer", "value": manufacturer },
                { "name": "auto.entphysical.descr", "value": format!("{manufacturer} appliance") }
            ],
            "systemProperties": [
                { "name": "system.sysinfo", "value": format!("{manufacturer} OS 1.0") }
            ],
            "customProperties": []
        })
    }

    /// A DataSource applied to a device.
    pub fn device_datasource(
        id: u64,
        device_id: u64,
        data_source_id: u64,
        name: &str,
    ) -> Value {
        json!({
            "id": id,
            "deviceId": device_id,
            "dataSourceId": data_source_id,
            "dataSourceName": name,
            "deviceName": format!("10.0.0.{device_id}"),
            "deviceDisplayName": format!("device-{device_id}"),
            "graphs": [
                { "id": data_source_id * 100 + 1, "name": "Overview" },
                { "id": data_source_id * 100 + 2, "name": "Detail" }
            ]
        })
    }

    /// An instance of a device DataSource.
    pub fn instance(id: u64, device_id: u64, hdsid: u64, data_source_id: u64, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "displayName": name,
            "deviceId": device_id,
            "deviceDataSourceId": hdsid,
            "dataSourceId": data_source_id,
            "deviceDisplayName": format!("device-{device_id}"),
        })
    }

    // =========================================================================
    // Scenario Builders
    // =========================================================================

    /// Create a default scenario with common test data.
    ///
    /// Includes:
    /// - 3 DataSources, 1 EventSource, 2 SysOIDs; other module types empty
    /// - 3 devices; device 1 has 2 DataSources
    /// - 2 instances of device 1's DataSource 900
    pub fn default_scenario() -> DefaultScenario {
        let modules = vec![
            (
                ModuleType::DataSources,
                vec![
                    Self::datasource(101, "SNMP_Network_Interfaces"),
                    Self::datasource(102, "Ping"),
                    Self::datasource(103, "Linux CPU/Memory"),
                ],
            ),
            (
                ModuleType::EventSources,
                vec![Self::module(201, "Syslog Critical")],
            ),
            (
                ModuleType::Oids,
                vec![
                    Self::oid(301, "1.3.6.1.4.1.9.1.1208", "Cisco"),
                    Self::oid(302, "1.3.6.1.4.1.2636.1.1.1.2.29", "Juniper"),
                ],
            ),
        ];

        let devices = vec![
            Self::device(1, "core-switch-01", "Cisco"),
            Self::device(2, "edge-router-01", "Juniper"),
            Self::device(3, "linux-web-01", "Dell"),
        ];

        let mut device_datasources = HashMap::new();
        device_datasources.insert(
            1,
            vec![
                Self::device_datasource(900, 1, 101, "SNMP_Network_Interfaces"),
                Self::device_datasource(901, 1, 102, "Ping"),
            ],
        );

        let mut instances = HashMap::new();
        instances.insert(
            (1, 900),
            vec![
                Self::instance(5001, 1, 900, 101, "GigabitEthernet0/1"),
                Self::instance(5002, 1, 900, 101, "GigabitEthernet0/2"),
            ],
        );

        DefaultScenario {
            modules,
            devices,
            device_datasources,
            instances,
        }
    }
}

/// A complete test scenario.
#[derive(Debug, Clone)]
pub struct DefaultScenario {
    pub modules: Vec<(ModuleType, Vec<Value>)>,
    pub devices: Vec<Value>,
    pub device_datasources: HashMap<u64, Vec<Value>>,
    pub instances: HashMap<(u64, u64), Vec<Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Device, DeviceDataSource, LogicModule};

    #[test]
    fn test_fixtures_deserialize_into_models() {
        let device: Device = serde_json::from_value(Fixtures::device(1, "a", "Cisco")).unwrap();
        assert_eq!(device.manufacturer().as_deref(), Some("Cisco"));

        let ds: DeviceDataSource =
            serde_json::from_value(Fixtures::device_datasource(900, 1, 101, "Ping")).unwrap();
        assert_eq!(ds.graph_ids(), vec![10101, 10102]);

        let oid: LogicModule =
            serde_json::from_value(Fixtures::oid(1, "1.3.6", "Cisco")).unwrap();
        assert_eq!(oid.name(), None);
    }

    #[test]
    fn test_default_scenario_counts() {
        let scenario = Fixtures::default_scenario();
        assert_eq!(scenario.devices.len(), 3);
        assert_eq!(scenario.modules[0].1.len(), 3);
    }
}
