//! End-to-end tests against the bundled mock server.
//!
//! Run with `cargo test --features test-server`.

#![cfg(feature = "test-server")]

use std::time::Duration;

use lmexport::devices::{list_devices, render_listing, DeviceListingOptions};
use lmexport::export::{export_modules, select_module_types, ExportOptions};
use lmexport::mock_server::{Fixtures, MockServer, MockState, ScriptedFailure};
use lmexport::{
    get_datasource_instances, get_device_datasources, get_devices, Device, Get, ListOptions,
    LmClient, LmError, ModuleType, RetryPolicy,
};
use tempfile::TempDir;

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_retries: 3,
        rate_limit_backoff: Duration::from_millis(20),
        transient_backoff: Duration::from_millis(10),
    }
}

fn client_for(server: &MockServer) -> LmClient {
    LmClient::new(server.credentials(), server.url())
        .unwrap()
        .with_retry_policy(fast_retry())
}

#[tokio::test]
async fn test_export_all_types() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let out = TempDir::new().unwrap();

    let types = select_module_types(&["all"]).unwrap();
    let options = ExportOptions {
        out_dir: out.path().to_path_buf(),
        list: ListOptions {
            size: 2,
            ..ListOptions::default()
        },
    };
    let reports = export_modules(&client, &types, &options).await;

    assert_eq!(reports.len(), ModuleType::ALL.len());
    assert!(reports.iter().all(|r| r.is_ok()));

    let count = |t: ModuleType| {
        reports
            .iter()
            .find(|r| r.module_type == t)
            .and_then(|r| r.result.as_ref().ok())
            .map(|s| s.item_count)
    };
    assert_eq!(count(ModuleType::DataSources), Some(3));
    assert_eq!(count(ModuleType::EventSources), Some(1));
    assert_eq!(count(ModuleType::Oids), Some(2));
    assert_eq!(count(ModuleType::LogSources), Some(0));

    let ds_dir = out.path().join("datasources");
    assert!(ds_dir.join("index.json").exists());
    assert!(ds_dir.join("101__SNMP_Network_Interfaces.json").exists());
    assert!(ds_dir.join("103__Linux CPU_Memory.json").exists());
    // SysOIDs carry no name.
    assert!(out.path().join("oids/301__unnamed.json").exists());
    assert!(out.path().join("logsources/index.json").exists());

    // Three datasources at two per page.
    assert_eq!(server.request_count("/setting/datasources").await, 2);

    server.shutdown().await;
}

#[tokio::test]
async fn test_device_drill_down() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let options = ListOptions::default();

    let devices = get_devices(&client, &options).await.unwrap();
    assert_eq!(devices.len(), 3);
    assert_eq!(devices[0].manufacturer().as_deref(), Some("Cisco"));

    let device = Device::get(&client, 1).await.unwrap();
    assert_eq!(device.display_name(), Some("core-switch-01"));

    let sources = get_device_datasources(&client, 1, &options).await.unwrap();
    let ids: Vec<u64> = sources.iter().filter_map(|s| s.id()).collect();
    assert_eq!(ids, vec![900, 901]);

    let instances = get_datasource_instances(&client, 1, 900, &options)
        .await
        .unwrap();
    assert_eq!(instances.len(), 2);

    // A device without DataSources lists nothing.
    let none = get_device_datasources(&client, 2, &options).await.unwrap();
    assert!(none.is_empty());

    server.shutdown().await;
}

#[tokio::test]
async fn test_device_filter() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let options = ListOptions {
        filter: Some("displayName~\"edge\"".to_string()),
        ..ListOptions::default()
    };
    let devices = get_devices(&client, &options).await.unwrap();

    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].id(), Some(2));

    server.shutdown().await;
}

#[tokio::test]
async fn test_unknown_device_is_not_found() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let result = Device::get(&client, 404).await;
    assert!(matches!(result, Err(LmError::NotFound { .. })));

    server.shutdown().await;
}

#[tokio::test]
async fn test_rate_limit_then_success() {
    let state = MockState::new()
        .with_modules(ModuleType::Oids, vec![Fixtures::oid(1, "1.3.6.1", "Cisco")])
        .with_failure("/setting/oids", ScriptedFailure::rate_limited(None))
        .with_failure("/setting/oids", ScriptedFailure::status(503));
    let server = MockServer::with_state(state).await;
    let client = client_for(&server);

    let items = lmexport::list_modules(&client, ModuleType::Oids, &ListOptions::default())
        .await
        .unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(server.request_count("/setting/oids").await, 3);

    server.shutdown().await;
}

#[tokio::test]
async fn test_broken_type_does_not_stop_export() {
    let state = MockState::new()
        .with_modules(ModuleType::DataSources, Fixtures::numbered_modules("ds", 2))
        .with_modules(ModuleType::ConfigSources, Fixtures::numbered_modules("cfg", 1))
        .with_broken_path("/setting/logsources", 503);
    let server = MockServer::with_state(state).await;
    let client = client_for(&server);
    let out = TempDir::new().unwrap();

    let types = [
        ModuleType::DataSources,
        ModuleType::LogSources,
        ModuleType::ConfigSources,
    ];
    let options = ExportOptions {
        out_dir: out.path().to_path_buf(),
        list: ListOptions::default(),
    };
    let reports = export_modules(&client, &types, &options).await;

    assert!(reports[0].is_ok());
    assert!(!reports[1].is_ok());
    assert!(reports[2].is_ok());

    // Initial attempt plus three retries.
    assert_eq!(server.request_count("/setting/logsources").await, 4);
    assert!(out.path().join("configsources/1__cfg-1.json").exists());

    server.shutdown().await;
}

#[tokio::test]
async fn test_bad_signature_is_rejected_once() {
    let server = MockServer::start().await;
    let creds = lmexport::Credentials::new(Fixtures::ACCESS_ID, "not-the-key", "mock");
    let client = LmClient::new(creds, server.url())
        .unwrap()
        .with_retry_policy(fast_retry());

    let err = get_devices(&client, &ListOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LmError::ApiError {
            status_code: Some(401),
            ..
        }
    ));
    // 401 is final.
    assert_eq!(server.request_count("/device/devices").await, 1);

    server.shutdown().await;
}

fn listing_options(out: &TempDir, device_id: Option<u64>, datasource_id: Option<u64>) -> DeviceListingOptions {
    DeviceListingOptions {
        out_dir: out.path().to_path_buf(),
        list: ListOptions::default(),
        device_id,
        datasource_id,
    }
}

#[tokio::test]
async fn test_device_listing_writes_each_step() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let out = TempDir::new().unwrap();

    let listing = list_devices(&client, &listing_options(&out, Some(1), Some(900)))
        .await
        .unwrap();

    assert_eq!(listing.devices.items.len(), 3);
    assert_eq!(listing.datasources.as_ref().map(|c| c.items.len()), Some(2));
    assert_eq!(listing.instances.as_ref().map(|c| c.items.len()), Some(2));

    let root = out.path();
    assert!(root.join("devices/index.json").exists());
    assert!(root.join("devices/1__core-switch-01.json").exists());
    assert!(root.join("device_1/datasources/index.json").exists());
    assert!(root.join("device_1/datasources/900__SNMP_Network_Interfaces.json").exists());
    assert!(root
        .join("device_1/datasource_900/instances/5001__GigabitEthernet0_1.json")
        .exists());

    // The device was in the listing; no separate lookup.
    assert_eq!(server.request_count("/device/devices/1").await, 0);

    let table = render_listing(&listing, false).unwrap();
    assert!(table.contains("LogicMonitor Devices"));
    assert!(table.contains("Device DataSources"));
    assert!(table.contains("DataSource Instances"));
    assert!(table.contains("GigabitEthernet0/2"));

    server.shutdown().await;
}

#[tokio::test]
async fn test_device_without_datasources() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let out = TempDir::new().unwrap();

    let listing = list_devices(&client, &listing_options(&out, Some(2), Some(900)))
        .await
        .unwrap();

    let datasources = listing.datasources.as_ref().unwrap();
    assert!(datasources.items.is_empty());
    assert!(datasources.files.is_none());
    assert!(listing.instances.is_none());
    assert!(!out.path().join("device_2").exists());

    let rendered = render_listing(&listing, false).unwrap();
    assert!(rendered.ends_with("No DataSources found."));
    assert_eq!(
        server
            .request_count("/device/devices/2/devicedatasources/900/instances")
            .await,
        0
    );

    server.shutdown().await;
}

#[tokio::test]
async fn test_datasource_without_instances() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let out = TempDir::new().unwrap();

    let listing = list_devices(&client, &listing_options(&out, Some(1), Some(901)))
        .await
        .unwrap();

    let instances = listing.instances.as_ref().unwrap();
    assert!(instances.items.is_empty());
    assert!(!out.path().join("device_1/datasource_901").exists());

    let rendered = render_listing(&listing, false).unwrap();
    assert!(rendered.ends_with("No instances found."));

    server.shutdown().await;
}

#[tokio::test]
async fn test_filtered_out_device_is_looked_up() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let out = TempDir::new().unwrap();

    let mut options = listing_options(&out, Some(1), None);
    options.list.filter = Some("displayName~\"edge\"".to_string());

    let listing = list_devices(&client, &options).await.unwrap();

    assert_eq!(listing.devices.items.len(), 1);
    assert_eq!(server.request_count("/device/devices/1").await, 1);
    assert_eq!(listing.datasources.map(|c| c.items.len()), Some(2));

    // An unknown device stops the run.
    let err = list_devices(&client, &listing_options(&out, Some(404), None))
        .await
        .unwrap_err();
    assert!(matches!(err, LmError::NotFound { .. }));

    server.shutdown().await;
}

#[tokio::test]
async fn test_device_listing_json_output() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let out = TempDir::new().unwrap();

    let listing = list_devices(&client, &listing_options(&out, None, None))
        .await
        .unwrap();
    assert!(listing.datasources.is_none());

    let rendered = render_listing(&listing, true).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    let devices = parsed.as_array().unwrap();
    assert_eq!(devices.len(), 3);
    assert_eq!(devices[0]["displayName"], "core-switch-01");
    assert!(devices[0]["autoProperties"].is_array());

    // Saved files keep the API's key order.
    let saved = std::fs::read_to_string(out.path().join("devices/1__core-switch-01.json")).unwrap();
    let id_at = saved.find("\"id\"").unwrap();
    let name_at = saved.find("\"name\"").unwrap();
    assert!(id_at < name_at);

    server.shutdown().await;
}
