//! CLI argument parsing tests for both binaries.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use lmexport::cli::{DevicesCli, ExportModulesCli};
use lmexport::export::select_module_types;
use lmexport::ModuleType;

#[test]
fn test_export_defaults() {
    let cli = ExportModulesCli::parse_from(["lm-export-modules"]);

    assert_eq!(cli.types, vec!["all".to_string()]);
    assert_eq!(cli.out, PathBuf::from("output_modules"));
    assert_eq!(cli.request.size, 200);
    assert_eq!(cli.request.sleep, Duration::ZERO);
    assert_eq!(cli.request.max_retries, 3);
    assert!(cli.request.filter.is_none());
}

#[test]
fn test_export_types_and_options() {
    let cli = ExportModulesCli::parse_from([
        "lm-export-modules",
        "--types",
        "DataSources",
        "eventsources",
        "--out",
        "dump",
        "--size",
        "50",
        "--sleep",
        "0.25",
        "--filter",
        "name~\"CPU\"",
    ]);

    assert_eq!(cli.types, vec!["datasources", "eventsources"]);
    assert_eq!(cli.out, PathBuf::from("dump"));

    let options = cli.request.list_options();
    assert_eq!(options.size, 50);
    assert_eq!(options.delay, Duration::from_millis(250));
    assert_eq!(options.filter.as_deref(), Some("name~\"CPU\""));

    let types = select_module_types(&cli.types).unwrap();
    assert_eq!(types, vec![ModuleType::DataSources, ModuleType::EventSources]);
}

#[test]
fn test_export_rejects_unknown_type() {
    let result = ExportModulesCli::try_parse_from(["lm-export-modules", "--types", "widgets"]);
    assert!(result.is_err());
}

#[test]
fn test_export_rejects_bad_size_and_sleep() {
    assert!(ExportModulesCli::try_parse_from(["lm-export-modules", "--size", "0"]).is_err());
    assert!(ExportModulesCli::try_parse_from(["lm-export-modules", "--sleep", "-1"]).is_err());
    assert!(ExportModulesCli::try_parse_from(["lm-export-modules", "--sleep", "soon"]).is_err());
}

#[test]
fn test_devices_defaults() {
    let cli = DevicesCli::parse_from(["lm-devices"]);

    assert!(!cli.json);
    assert_eq!(cli.out, PathBuf::from("output"));
    assert!(cli.device_id.is_none());
    assert!(cli.datasource_id.is_none());
}

#[test]
fn test_devices_drill_down_args() {
    let cli = DevicesCli::parse_from([
        "lm-devices",
        "--device-id",
        "17",
        "--datasource-id",
        "900",
        "--json",
        "--max-retries",
        "1",
    ]);

    assert_eq!(cli.device_id, Some(17));
    assert_eq!(cli.datasource_id, Some(900));
    assert!(cli.json);
    assert_eq!(cli.request.retry_policy().max_retries, 1);
}

#[test]
fn test_datasource_requires_device() {
    let result = DevicesCli::try_parse_from(["lm-devices", "--datasource-id", "900"]);
    assert!(result.is_err());
}

#[test]
fn test_json_is_a_plain_switch() {
    let cli = DevicesCli::parse_from(["lm-devices", "--json"]);
    assert!(cli.json);
    assert!(DevicesCli::try_parse_from(["lm-devices", "--json", "true"]).is_err());
}
