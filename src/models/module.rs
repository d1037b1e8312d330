//! LogicModule types and their list endpoints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::LmClient;
use crate::error::{LmError, Result};
use crate::pagination::ListOptions;
use crate::traits::List;

/// A category of LogicModule exposed under `/setting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleType {
    DataSources,
    EventSources,
    LogSources,
    ConfigSources,
    PropertySources,
    TopologySources,
    JobMonitors,
    AppliesToFunctions,
    Oids,
}

impl ModuleType {
    /// Every module type, in export order.
    pub const ALL: [ModuleType; 9] = [
        ModuleType::DataSources,
        ModuleType::EventSources,
        ModuleType::LogSources,
        ModuleType::ConfigSources,
        ModuleType::PropertySources,
        ModuleType::TopologySources,
        ModuleType::JobMonitors,
        ModuleType::AppliesToFunctions,
        ModuleType::Oids,
    ];

    /// Lowercase key used on the command line and as the output directory.
    pub fn key(self) -> &'static str {
        match self {
            ModuleType::DataSources => "datasources",
            ModuleType::EventSources => "eventsources",
            ModuleType::LogSources => "logsources",
            ModuleType::ConfigSources => "configsources",
            ModuleType::PropertySources => "propertysources",
            ModuleType::TopologySources => "topologysources",
            ModuleType::JobMonitors => "jobmonitors",
            ModuleType::AppliesToFunctions => "appliestofunctions",
            ModuleType::Oids => "oids",
        }
    }

    /// List endpoint for this module type.
    pub fn endpoint(self) -> &'static str {
        match self {
            ModuleType::DataSources => "/setting/datasources",
            ModuleType::EventSources => "/setting/eventsources",
            ModuleType::LogSources => "/setting/logsources",
            ModuleType::ConfigSources => "/setting/configsources",
            // PropertySources are served as property rules.
            ModuleType::PropertySources => "/setting/propertyrules",
            ModuleType::TopologySources => "/setting/topologysources",
            ModuleType::JobMonitors => "/setting/batchjobs",
            ModuleType::AppliesToFunctions => "/setting/functions",
            ModuleType::Oids => "/setting/oids",
        }
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ModuleType {
    type Err = LmError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        ModuleType::ALL
            .into_iter()
            .find(|t| t.key() == wanted)
            .ok_or_else(|| {
                LmError::InvalidArgument(format!(
                    "unknown module type '{s}', expected one of: {} or 'all'",
                    ModuleType::ALL.map(ModuleType::key).join(", ")
                ))
            })
    }
}

/// A single LogicModule as returned by the API.
///
/// The object is kept verbatim so it can be written back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicModule(pub Map<String, Value>);

impl LogicModule {
    /// The module id rendered as text, if present and scalar.
    pub fn id(&self) -> Option<String> {
        match self.0.get("id")? {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }

    /// `name`, falling back to `displayName`.
    pub fn name(&self) -> Option<&str> {
        ["name", "displayName"]
            .into_iter()
            .filter_map(|key| self.0.get(key).and_then(Value::as_str))
            .find(|s| !s.is_empty())
    }

    /// Borrow the raw JSON object.
    pub fn as_object(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl List for LogicModule {
    type Query = ModuleType;

    fn resource_path(query: &ModuleType) -> String {
        query.endpoint().to_string()
    }
}

/// Fetch every module of one type.
///
/// # Example
///
/// ```ignore
/// use lmexport::{list_modules, ListOptions, LmClient, ModuleType};
///
/// let client = LmClient::from_env()?;
/// let sources = list_modules(&client, ModuleType::DataSources, &ListOptions::default()).await?;
/// ```
pub async fn list_modules(
    client: &LmClient,
    module_type: ModuleType,
    options: &ListOptions,
) -> Result<Vec<LogicModule>> {
    LogicModule::list_all(client, &module_type, options).await
}
