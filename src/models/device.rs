//! Device, device DataSource and instance models.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::LmClient;
use crate::error::{LmError, Result};
use crate::pagination::ListOptions;
use crate::traits::{Get, List};

const MANUFACTURER_PROPERTY: &str = "auto.endpoint.manufacturer";
const SYSINFO_PROPERTY: &str = "system.sysinfo";
const DESCRIPTION_PROPERTY: &str = "auto.entphysical.descr";

/// A name/value property attached to a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub value: Option<String>,
}

/// Read a property array leniently: a missing or non-array field is empty,
/// entries that are not objects are skipped, scalar values become text.
fn properties(object: &Map<String, Value>, key: &str) -> Vec<Property> {
    let Some(Value::Array(entries)) = object.get(key) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|entry| {
            let name = entry.get("name").and_then(Value::as_str)?;
            Some(Property {
                name: name.to_string(),
                value: entry.get("value").and_then(scalar_text),
            })
        })
        .collect()
}

fn lookup(properties: Vec<Property>, name: &str) -> Option<String> {
    properties
        .into_iter()
        .find(|p| p.name == name)
        .and_then(|p| p.value)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Ids arrive as numbers, occasionally as numeric strings.
fn id_field(object: &Map<String, Value>, key: &str) -> Option<u64> {
    match object.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text_field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object.get(key).and_then(Value::as_str)
}

/// A monitored device (resource).
///
/// The object is kept verbatim, in the key order the API sent, so it
/// serializes back unchanged. Accessors read fields leniently: a field that
/// is absent (e.g. dropped by a `fields` projection) or oddly typed reads as
/// `None` instead of failing the whole listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Device(pub Map<String, Value>);

impl Device {
    pub fn id(&self) -> Option<u64> {
        id_field(&self.0, "id")
    }

    pub fn name(&self) -> Option<&str> {
        text_field(&self.0, "name")
    }

    pub fn display_name(&self) -> Option<&str> {
        text_field(&self.0, "displayName")
    }

    /// Properties discovered by PropertySources.
    pub fn auto_properties(&self) -> Vec<Property> {
        properties(&self.0, "autoProperties")
    }

    /// Properties set by the collector.
    pub fn system_properties(&self) -> Vec<Property> {
        properties(&self.0, "systemProperties")
    }

    pub fn auto_property(&self, name: &str) -> Option<String> {
        lookup(self.auto_properties(), name)
    }

    pub fn system_property(&self, name: &str) -> Option<String> {
        lookup(self.system_properties(), name)
    }

    /// `auto.endpoint.manufacturer`
    pub fn manufacturer(&self) -> Option<String> {
        self.auto_property(MANUFACTURER_PROPERTY)
    }

    /// `system.sysinfo`
    pub fn sysinfo(&self) -> Option<String> {
        self.system_property(SYSINFO_PROPERTY)
    }

    /// `auto.entphysical.descr`
    pub fn description(&self) -> Option<String> {
        self.auto_property(DESCRIPTION_PROPERTY)
    }

    pub fn as_object(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// A DataSource applied to one device.
///
/// `id()` is the device-datasource id that addresses the instances
/// endpoint; `data_source_id()` is the id of the LogicModule itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceDataSource(pub Map<String, Value>);

impl DeviceDataSource {
    pub fn id(&self) -> Option<u64> {
        id_field(&self.0, "id")
    }

    pub fn data_source_id(&self) -> Option<u64> {
        id_field(&self.0, "dataSourceId")
    }

    pub fn data_source_name(&self) -> Option<&str> {
        text_field(&self.0, "dataSourceName")
    }

    pub fn device_name(&self) -> Option<&str> {
        text_field(&self.0, "deviceName")
    }

    pub fn device_display_name(&self) -> Option<&str> {
        text_field(&self.0, "deviceDisplayName")
    }

    /// Ids of the graphs defined for this DataSource.
    pub fn graph_ids(&self) -> Vec<u64> {
        match self.0.get("graphs") {
            Some(Value::Array(graphs)) => graphs
                .iter()
                .filter_map(|g| g.get("id").and_then(Value::as_u64))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn as_object(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// One instance of a DataSource on a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataSourceInstance(pub Map<String, Value>);

impl DataSourceInstance {
    pub fn id(&self) -> Option<u64> {
        id_field(&self.0, "id")
    }

    pub fn name(&self) -> Option<&str> {
        text_field(&self.0, "name")
    }

    pub fn device_data_source_id(&self) -> Option<u64> {
        id_field(&self.0, "deviceDataSourceId")
    }

    pub fn device_display_name(&self) -> Option<&str> {
        text_field(&self.0, "deviceDisplayName")
    }

    pub fn data_source_id(&self) -> Option<u64> {
        id_field(&self.0, "dataSourceId")
    }

    pub fn as_object(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Query type for instance listing: (device id, device-datasource id).
pub type InstanceQuery = (u64, u64);

#[async_trait]
impl Get for Device {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &LmClient, id: u64) -> Result<Self> {
        let path = format!("/device/devices/{id}");

        let value = match client.get_json(&path, &[("format", "json")]).await {
            Err(LmError::ApiError {
                status_code: Some(404),
                ..
            }) => {
                return Err(LmError::NotFound {
                    entity_type: "Device",
                    id: id.to_string(),
                })
            }
            other => other?,
        };

        // v1/v2 wrap the object in `data`.
        let body = match value {
            Value::Object(mut map) if map.get("data").is_some_and(Value::is_object) => {
                map.remove("data").unwrap_or_default()
            }
            other => other,
        };
        Ok(serde_json::from_value(body)?)
    }
}

impl List for Device {
    type Query = ();

    fn resource_path(_: &()) -> String {
        "/device/devices".to_string()
    }
}

impl List for DeviceDataSource {
    type Query = u64; // device id

    fn resource_path(device_id: &u64) -> String {
        format!("/device/devices/{device_id}/devicedatasources")
    }
}

impl List for DataSourceInstance {
    type Query = InstanceQuery;

    fn resource_path((device_id, device_datasource_id): &InstanceQuery) -> String {
        format!("/device/devices/{device_id}/devicedatasources/{device_datasource_id}/instances")
    }
}

// Convenience functions

/// Fetch all devices, honoring `options.filter`.
pub async fn get_devices(client: &LmClient, options: &ListOptions) -> Result<Vec<Device>> {
    Device::list_all(client, &(), options).await
}

/// Fetch the DataSources applied to a device.
pub async fn get_device_datasources(
    client: &LmClient,
    device_id: u64,
    options: &ListOptions,
) -> Result<Vec<DeviceDataSource>> {
    DeviceDataSource::list_all(client, &device_id, options).await
}

/// Fetch the instances of one device DataSource.
///
/// # Arguments
///
/// * `device_id` - The device id
/// * `device_datasource_id` - The device-datasource id (the `id` of a
///   [`DeviceDataSource`], not its `dataSourceId`)
pub async fn get_datasource_instances(
    client: &LmClient,
    device_id: u64,
    device_datasource_id: u64,
    options: &ListOptions,
) -> Result<Vec<DataSourceInstance>> {
    DataSourceInstance::list_all(client, &(device_id, device_datasource_id), options).await
}
