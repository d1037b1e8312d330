//! CLI argument parsing types.
//!
//! This module provides the command-line interfaces of the
//! `lm-export-modules` and `lm-devices` binaries.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser};

use crate::export::ALL_TYPES;
use crate::models::ModuleType;
use crate::pagination::{ListOptions, DEFAULT_PAGE_SIZE};
use crate::retry::{RetryPolicy, DEFAULT_MAX_RETRIES};

/// Export LogicMonitor modules (LogicModules) to JSON files.
///
/// Credentials are read from ACCESS_ID, ACCESS_KEY and COMPANY.
#[derive(Parser, Debug)]
#[command(name = "lm-export-modules", version)]
pub struct ExportModulesCli {
    /// Module types to export, or 'all'.
    #[arg(
        long,
        num_args = 1..,
        default_value = ALL_TYPES,
        value_parser = parse_module_selection,
    )]
    pub types: Vec<String>,

    /// Output directory.
    #[arg(long, default_value = "output_modules")]
    pub out: PathBuf,

    #[command(flatten)]
    pub request: RequestArgs,
}

/// List LogicMonitor devices, their DataSources and DataSource instances.
///
/// Credentials are read from ACCESS_ID, ACCESS_KEY and COMPANY.
#[derive(Parser, Debug)]
#[command(name = "lm-devices", version)]
pub struct DevicesCli {
    /// Also list the DataSources applied to this device.
    #[arg(long)]
    pub device_id: Option<u64>,

    /// Also list instances of this device DataSource (its 'ID' column).
    #[arg(long, requires = "device_id")]
    pub datasource_id: Option<u64>,

    /// Output directory.
    #[arg(long, default_value = "output")]
    pub out: PathBuf,

    /// Print results as JSON instead of tables.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub request: RequestArgs,
}

/// Paging, filtering and retry flags shared by both tools.
#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    /// Page size for list endpoints.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = clap::value_parser!(u32).range(1..))]
    pub size: u32,

    /// Seconds to wait between page requests.
    #[arg(long, default_value = "0", value_parser = parse_seconds)]
    pub sleep: Duration,

    /// Comma-separated fields to request; some endpoints ignore this.
    #[arg(long)]
    pub fields: Option<String>,

    /// Server-side filter expression, e.g. 'name~"CPU"'.
    #[arg(long)]
    pub filter: Option<String>,

    /// Retries for rate-limited or transient failures.
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,
}

impl RequestArgs {
    pub fn list_options(&self) -> ListOptions {
        ListOptions {
            size: self.size,
            fields: self.fields.clone(),
            filter: self.filter.clone(),
            delay: self.sleep,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            ..RetryPolicy::default()
        }
    }
}

fn parse_module_selection(s: &str) -> Result<String, String> {
    let key = s.trim().to_ascii_lowercase();
    if key == ALL_TYPES {
        return Ok(key);
    }
    key.parse::<ModuleType>()
        .map(|t| t.key().to_string())
        .map_err(|e| e.to_string())
}

fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a number of seconds"))?;
    Duration::try_from_secs_f64(secs).map_err(|_| format!("'{s}' must be zero or positive"))
}
