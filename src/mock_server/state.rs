//! Mock server state management.
//!
//! Provides the in-memory data store for the mock LogicMonitor API server.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::config::Credentials;
use crate::models::ModuleType;

/// A canned error response served instead of the real one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedFailure {
    pub status: u16,
    /// Value for a `Retry-After` header, if any.
    pub retry_after: Option<String>,
}

impl ScriptedFailure {
    pub fn status(status: u16) -> Self {
        Self {
            status,
            retry_after: None,
        }
    }

    pub fn rate_limited(retry_after: Option<&str>) -> Self {
        Self {
            status: 429,
            retry_after: retry_after.map(str::to_string),
        }
    }
}

/// Shared state for the mock server.
///
/// Collections hold raw JSON objects, exactly as the real API would send
/// them. It's wrapped in `Arc<RwLock<_>>` for concurrent access.
#[derive(Debug, Default)]
pub struct MockState {
    /// LogicModules keyed by list endpoint (e.g. "/setting/datasources").
    pub modules: HashMap<String, Vec<Value>>,

    /// Devices keyed by id.
    pub devices: BTreeMap<u64, Value>,

    /// Device DataSources keyed by device id.
    pub device_datasources: HashMap<u64, Vec<Value>>,

    /// Instances keyed by (device id, device-datasource id).
    pub instances: HashMap<(u64, u64), Vec<Value>>,

    /// If set, requests must carry a valid LMv1 signature for these
    /// credentials.
    pub credentials: Option<Credentials>,

    /// Failures served, in order, before a path answers normally.
    pub failures: HashMap<String, VecDeque<ScriptedFailure>>,

    /// Paths that always fail with the given status.
    pub broken: HashMap<String, u16>,

    /// Every request path received, in order.
    pub requests: Vec<String>,
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Add modules of one type.
    pub fn with_modules(mut self, module_type: ModuleType, items: Vec<Value>) -> Self {
        self.modules
            .entry(module_type.endpoint().to_string())
            .or_default()
            .extend(items);
        self
    }

    /// Add a device. The object must carry a numeric `id`.
    pub fn with_device(mut self, device: Value) -> Self {
        if let Some(id) = device.get("id").and_then(Value::as_u64) {
            self.devices.insert(id, device);
        }
        self
    }

    /// Add DataSources applied to a device.
    pub fn with_device_datasources(mut self, device_id: u64, items: Vec<Value>) -> Self {
        self.device_datasources
            .entry(device_id)
            .or_default()
            .extend(items);
        self
    }

    /// Add instances of a device DataSource.
    pub fn with_instances(mut self, device_id: u64, hdsid: u64, items: Vec<Value>) -> Self {
        self.instances
            .entry((device_id, hdsid))
            .or_default()
            .extend(items);
        self
    }

    /// Require LMv1 signatures made with these credentials.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Queue a failure for the next request to `path`.
    pub fn with_failure(mut self, path: &str, failure: ScriptedFailure) -> Self {
        self.failures
            .entry(path.to_string())
            .or_default()
            .push_back(failure);
        self
    }

    /// Make every request to `path` fail with `status`.
    pub fn with_broken_path(mut self, path: &str, status: u16) -> Self {
        self.broken.insert(path.to_string(), status);
        self
    }

    /// Modules served at a list endpoint, if it exists.
    pub fn list_modules(&self, endpoint: &str) -> Option<&[Value]> {
        self.modules.get(endpoint).map(Vec::as_slice).or_else(|| {
            ModuleType::ALL
                .iter()
                .any(|t| t.endpoint() == endpoint)
                .then_some(&[][..])
        })
    }

    /// All devices in id order.
    pub fn list_devices(&self) -> Vec<Value> {
        self.devices.values().cloned().collect()
    }

    /// Get a device by id.
    pub fn get_device(&self, id: u64) -> Option<&Value> {
        self.devices.get(&id)
    }

    /// Number of requests received for `path`.
    pub fn request_count(&self, path: &str) -> usize {
        self.requests.iter().filter(|p| p.as_str() == path).count()
    }

    /// Record a request and return the failure to serve for it, if any.
    pub fn next_failure(&mut self, path: &str) -> Option<ScriptedFailure> {
        self.requests.push(path.to_string());

        if let Some(status) = self.broken.get(path) {
            return Some(ScriptedFailure::status(*status));
        }
        self.failures.get_mut(path).and_then(VecDeque::pop_front)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_state_add_and_list_modules() {
        let state = MockState::new().with_modules(
            ModuleType::DataSources,
            vec![json!({"id": 1, "name": "CPU"})],
        );

        assert_eq!(state.list_modules("/setting/datasources").unwrap().len(), 1);
        // Known endpoint without data is empty, unknown endpoint is absent.
        assert_eq!(state.list_modules("/setting/oids").unwrap().len(), 0);
        assert!(state.list_modules("/setting/widgets").is_none());
    }

    #[test]
    fn test_devices_ordered_by_id() {
        let state = MockState::new()
            .with_device(json!({"id": 9, "name": "b"}))
            .with_device(json!({"id": 2, "name": "a"}))
            .with_device(json!({"name": "no id"}));

        let ids: Vec<u64> = state
            .list_devices()
            .iter()
            .filter_map(|d| d["id"].as_u64())
            .collect();
        assert_eq!(ids, vec![2, 9]);
    }

    #[test]
    fn test_scripted_failures_drain_in_order() {
        let mut state = MockState::new()
            .with_failure("/setting/oids", ScriptedFailure::rate_limited(Some("1")))
            .with_failure("/setting/oids", ScriptedFailure::status(503));

        assert_eq!(state.next_failure("/setting/oids").unwrap().status, 429);
        assert_eq!(state.next_failure("/setting/oids").unwrap().status, 503);
        assert!(state.next_failure("/setting/oids").is_none());
        assert_eq!(state.request_count("/setting/oids"), 3);
    }

    #[test]
    fn test_broken_path_always_fails() {
        let mut state = MockState::new().with_broken_path("/setting/logsources", 403);
        for _ in 0..3 {
            assert_eq!(state.next_failure("/setting/logsources").unwrap().status, 403);
        }
    }
}
