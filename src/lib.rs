//! LogicMonitor export library.
//!
//! Retrieves LogicModules (DataSources, EventSources, ...) and device
//! metadata from the LogicMonitor REST API and writes them out as JSON.
//!
//! # Quick Start
//!
//! ```no_run
//! use lmexport::{get_devices, list_modules, ListOptions, LmClient, ModuleType};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> lmexport::Result<()> {
//!     // Create client from environment variables
//!     let client = LmClient::from_env()?;
//!
//!     // Every DataSource, paging 200 at a time
//!     let options = ListOptions::default();
//!     let sources = list_modules(&client, ModuleType::DataSources, &options).await?;
//!     println!("Found {} datasources", sources.len());
//!
//!     // Devices matching a filter
//!     let options = ListOptions {
//!         filter: Some("displayName~\"core\"".to_string()),
//!         ..ListOptions::default()
//!     };
//!     let devices = get_devices(&client, &options).await?;
//!     println!("Found {} devices", devices.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`LmClient`] signs each request (LMv1) and retries transient failures
//!   per its [`RetryPolicy`].
//! - [`List`] pages through offset/size endpoints; [`Get`] fetches one
//!   entity.
//! - [`export`] writes one directory per module type with an `index.json`
//!   and one file per module.
//! - [`devices`] lists devices and drills into one device's DataSources and
//!   instances.
//!
//! # Configuration
//!
//! The client reads configuration from environment variables:
//!
//! - `ACCESS_ID` (required) - API token access id
//! - `ACCESS_KEY` (required) - API token access key
//! - `COMPANY` (required) - portal name, as in `<company>.logicmonitor.com`
//! - `LM_API_URL` (optional) - base URL override

pub mod auth;
pub mod cli;
mod client;
pub mod config;
pub mod devices;
mod error;
pub mod export;
mod models;
pub mod output;
mod pagination;
mod retry;
mod traits;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use client::LmClient;
pub use config::Credentials;
pub use error::{LmError, Result};
pub use pagination::{ListEnvelope, ListOptions, Page, PageQuery, DEFAULT_PAGE_SIZE};
pub use retry::RetryPolicy;

// Re-export traits
pub use traits::{Get, List};

// Re-export models
pub use models::{
    // Module types
    LogicModule,
    ModuleType,
    // Device types
    DataSourceInstance,
    Device,
    DeviceDataSource,
    InstanceQuery,
    Property,
};

// Re-export convenience functions
pub use models::list_modules;
pub use models::{get_datasource_instances, get_device_datasources, get_devices};

/// Install the stderr log subscriber used by the binaries.
///
/// `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
