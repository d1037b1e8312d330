//! Device listing: devices, then optionally one device's DataSources and
//! one DataSource's instances.
//!
//! Each non-empty step is saved under the output directory:
//!
//! ```text
//! <out>/devices/
//! <out>/device_<id>/datasources/
//! <out>/device_<id>/datasource_<hdsid>/instances/
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;
use tabled::{Table, Tabled};

use crate::client::LmClient;
use crate::error::Result;
use crate::models::{
    get_datasource_instances, get_device_datasources, get_devices, DataSourceInstance, Device,
    DeviceDataSource,
};
use crate::output::{self, item_file_stem, CollectionFiles};
use crate::pagination::ListOptions;
use crate::traits::Get;

const DIVIDER_WIDTH: usize = 50;

/// What to list and where to save it.
#[derive(Debug, Clone)]
pub struct DeviceListingOptions {
    pub out_dir: PathBuf,
    pub list: ListOptions,
    /// Also list the DataSources applied to this device.
    pub device_id: Option<u64>,
    /// Also list instances of this device DataSource.
    pub datasource_id: Option<u64>,
}

/// Items from one listing step and the files they were saved to.
///
/// `files` is `None` when nothing was written.
#[derive(Debug, Clone)]
pub struct Collected<T> {
    pub items: Vec<T>,
    pub files: Option<CollectionFiles>,
}

/// Everything one run of the device listing produced.
///
/// `datasources` is `None` when no device was requested; `instances` is
/// `None` when no DataSource was requested or the device had none.
#[derive(Debug, Clone)]
pub struct DeviceListing {
    pub devices: Collected<Device>,
    pub datasources: Option<Collected<DeviceDataSource>>,
    pub instances: Option<Collected<DataSourceInstance>>,
}

/// Directory for one device's DataSources and instances.
pub fn device_dir(out_dir: &Path, device_id: u64) -> PathBuf {
    out_dir.join(format!("device_{device_id}"))
}

/// Run the listing steps the options ask for.
///
/// The device list is always saved. An empty DataSource or instance list
/// ends the run without writing files for it.
///
/// # Errors
///
/// Fails on the first request or filesystem error. A requested device that
/// does not exist is [`LmError::NotFound`](crate::LmError::NotFound).
#[tracing::instrument(skip(client, options), fields(device_id = options.device_id, datasource_id = options.datasource_id))]
pub async fn list_devices(client: &LmClient, options: &DeviceListingOptions) -> Result<DeviceListing> {
    tracing::info!("Fetching devices");
    let devices = get_devices(client, &options.list).await?;
    let files = output::write_collection(&options.out_dir.join("devices"), &devices, device_stem)?;
    tracing::info!("Saved {} devices -> {}", devices.len(), files.index.display());

    let mut listing = DeviceListing {
        devices: Collected {
            items: devices,
            files: Some(files),
        },
        datasources: None,
        instances: None,
    };

    let Some(device_id) = options.device_id else {
        return Ok(listing);
    };

    // Listed already unless a filter or fields projection hid it.
    let listed = listing
        .devices
        .items
        .iter()
        .any(|d| d.id() == Some(device_id));
    if !listed {
        Device::get(client, device_id).await?;
    }

    tracing::info!("Fetching DataSources for device ID: {}", device_id);
    let datasources = get_device_datasources(client, device_id, &options.list).await?;
    let dir = device_dir(&options.out_dir, device_id);
    let datasources = save_non_empty(&dir.join("datasources"), datasources, datasource_stem)?;
    let has_datasources = !datasources.items.is_empty();
    listing.datasources = Some(datasources);

    let Some(datasource_id) = options.datasource_id.filter(|_| has_datasources) else {
        return Ok(listing);
    };

    tracing::info!("Fetching instances for device DataSource ID: {}", datasource_id);
    let instances =
        get_datasource_instances(client, device_id, datasource_id, &options.list).await?;
    let instances_dir = dir
        .join(format!("datasource_{datasource_id}"))
        .join("instances");
    listing.instances = Some(save_non_empty(&instances_dir, instances, instance_stem)?);

    Ok(listing)
}

fn save_non_empty<T, F>(dir: &Path, items: Vec<T>, file_stem: F) -> Result<Collected<T>>
where
    T: Serialize,
    F: Fn(&T) -> String,
{
    if items.is_empty() {
        return Ok(Collected { items, files: None });
    }
    let files = output::write_collection(dir, &items, file_stem)?;
    tracing::info!("Saved {} items -> {}", items.len(), files.index.display());
    Ok(Collected {
        items,
        files: Some(files),
    })
}

fn device_stem(d: &Device) -> String {
    let id = d.id().map(|id| id.to_string());
    item_file_stem(id.as_deref(), d.display_name().or(d.name()))
}

fn datasource_stem(ds: &DeviceDataSource) -> String {
    let id = ds.id().map(|id| id.to_string());
    item_file_stem(id.as_deref(), ds.data_source_name())
}

fn instance_stem(i: &DataSourceInstance) -> String {
    let id = i.id().map(|id| id.to_string());
    item_file_stem(id.as_deref(), i.name())
}

/// Render a listing for the terminal: a titled table per step, or the raw
/// JSON arrays with `json`.
///
/// # Errors
///
/// Returns a serialization error in JSON mode.
pub fn render_listing(listing: &DeviceListing, json: bool) -> Result<String> {
    let mut out = render::<_, DeviceRow>(&listing.devices.items, json, "LogicMonitor Devices")?;

    if let Some(datasources) = &listing.datasources {
        out.push('\n');
        if datasources.items.is_empty() {
            out.push_str("No DataSources found.");
        } else {
            out.push_str(&render::<_, DataSourceRow>(
                &datasources.items,
                json,
                "Device DataSources",
            )?);
        }
    }

    if let Some(instances) = &listing.instances {
        out.push('\n');
        if instances.items.is_empty() {
            out.push_str("No instances found.");
        } else {
            out.push_str(&render::<_, InstanceRow>(
                &instances.items,
                json,
                "DataSource Instances",
            )?);
        }
    }

    Ok(out)
}

fn render<T, R>(items: &[T], json: bool, title: &str) -> Result<String>
where
    T: Serialize,
    R: Tabled + for<'a> From<&'a T>,
{
    if json {
        return Ok(serde_json::to_string_pretty(items)?);
    }
    let divider = "=".repeat(DIVIDER_WIDTH);
    let rows: Vec<R> = items.iter().map(R::from).collect();
    Ok(format!("\n{divider}\n{title}\n{divider}\n{}", Table::new(rows)))
}

fn text(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn id_text(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

// Table row types

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Device ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Display Name")]
    display_name: String,
    #[tabled(rename = "Manufacturer")]
    manufacturer: String,
    #[tabled(rename = "Sysinfo")]
    sysinfo: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            id: id_text(d.id()),
            name: text(d.name()),
            display_name: text(d.display_name()),
            manufacturer: d.manufacturer().unwrap_or_default(),
            sysinfo: d.sysinfo().unwrap_or_default(),
            description: d.description().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct DataSourceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "DataSource ID")]
    data_source_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Device Name")]
    device_name: String,
    #[tabled(rename = "Display Name")]
    display_name: String,
    #[tabled(rename = "Graph IDs")]
    graphs: String,
}

impl From<&DeviceDataSource> for DataSourceRow {
    fn from(ds: &DeviceDataSource) -> Self {
        Self {
            id: id_text(ds.id()),
            data_source_id: id_text(ds.data_source_id()),
            name: text(ds.data_source_name()),
            device_name: text(ds.device_name()),
            display_name: text(ds.device_display_name()),
            graphs: ds
                .graph_ids()
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[derive(Tabled)]
struct InstanceRow {
    #[tabled(rename = "Device DataSource ID")]
    device_data_source_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Device Display Name")]
    device_display_name: String,
    #[tabled(rename = "Instance ID")]
    id: String,
    #[tabled(rename = "DataSource ID")]
    data_source_id: String,
}

impl From<&DataSourceInstance> for InstanceRow {
    fn from(i: &DataSourceInstance) -> Self {
        Self {
            device_data_source_id: id_text(i.device_data_source_id()),
            name: text(i.name()),
            device_display_name: text(i.device_display_name()),
            id: id_text(i.id()),
            data_source_id: id_text(i.data_source_id()),
        }
    }
}
