//! Mock LogicMonitor API server.
//!
//! Provides an axum-based HTTP server that simulates the REST API.

use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::fixtures::{DefaultScenario, Fixtures};
use super::handlers;
use super::state::MockState;
use crate::config::Credentials;

/// A mock LogicMonitor API server for testing.
///
/// The server runs in the background and can be used to test the client
/// against a realistic API implementation.
pub struct MockServer {
    /// The URL where the server is listening.
    url: String,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Shared state that can be modified during tests.
    state: Arc<RwLock<MockState>>,
}

impl MockServer {
    /// Start a new mock server with default fixtures.
    ///
    /// Requests must be signed with [`Fixtures::credentials`]. The server
    /// listens on a random available port and returns immediately.
    pub async fn start() -> Self {
        Self::with_state(Self::default_state()).await
    }

    /// Start a mock server with empty state and no signature check.
    pub async fn start_empty() -> Self {
        Self::with_state(MockState::new()).await
    }

    /// Start a mock server with custom state.
    pub async fn with_state(state: MockState) -> Self {
        let shared_state = state.shared();
        let app = Self::create_router(shared_state.clone());

        // Bind to a random available port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self {
            url: format!("http://{}", addr),
            handle,
            state: shared_state,
        }
    }

    /// Get the base URL of the mock server.
    ///
    /// Use this URL when creating an `LmClient` for testing.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Credentials accepted by a server started with [`MockServer::start`].
    pub fn credentials(&self) -> Credentials {
        Fixtures::credentials()
    }

    /// Get access to the server's shared state.
    ///
    /// This allows modifying the mock data during a test.
    pub fn state(&self) -> Arc<RwLock<MockState>> {
        self.state.clone()
    }

    /// Number of requests the server received for `path`.
    pub async fn request_count(&self, path: &str) -> usize {
        self.state.read().await.request_count(path)
    }

    /// Shutdown the server.
    ///
    /// This aborts the server task. It's safe to call multiple times.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    /// Create the default state with common test fixtures.
    fn default_state() -> MockState {
        let scenario = Fixtures::default_scenario();
        Self::state_from_scenario(scenario).with_credentials(Fixtures::credentials())
    }

    /// Create state from a scenario.
    fn state_from_scenario(scenario: DefaultScenario) -> MockState {
        let mut state = MockState::new();

        for (module_type, items) in scenario.modules {
            state = state.with_modules(module_type, items);
        }

        for device in scenario.devices {
            state = state.with_device(device);
        }

        for (device_id, datasources) in scenario.device_datasources {
            state = state.with_device_datasources(device_id, datasources);
        }

        for ((device_id, hdsid), instances) in scenario.instances {
            state = state.with_instances(device_id, hdsid, instances);
        }

        state
    }

    /// Create the axum router with all routes.
    fn create_router(state: Arc<RwLock<MockState>>) -> Router {
        Router::new()
            // LogicModule routes
            .route("/setting/:kind", get(handlers::list_modules))
            // Device routes
            .route("/device/devices", get(handlers::list_devices))
            .route("/device/devices/:id", get(handlers::get_device))
            .route(
                "/device/devices/:id/devicedatasources",
                get(handlers::list_device_datasources),
            )
            .route(
                "/device/devices/:id/devicedatasources/:hdsid/instances",
                get(handlers::list_instances),
            )
            // Health check
            .route("/health", get(health_check))
            .with_state(state)
    }
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{list_modules, Device, Get, ListOptions, LmClient, ModuleType};

    #[tokio::test]
    async fn test_server_starts_and_responds() {
        let server = MockServer::start().await;

        // Server should be accessible
        let client = reqwest::Client::new();
        let response = client
            .get(format!("{}/health", server.url()))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());
        assert_eq!(response.text().await.unwrap(), "ok");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_list_modules_with_signed_client() {
        let server = MockServer::start().await;
        let client = LmClient::new(server.credentials(), server.url()).unwrap();

        let sources = list_modules(&client, ModuleType::DataSources, &ListOptions::default())
            .await
            .expect("Failed to list datasources");

        assert!(!sources.is_empty());

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_wrong_key_is_rejected() {
        let server = MockServer::start().await;
        let creds = Credentials::new(Fixtures::ACCESS_ID, "wrong-key", "mock");
        let client = LmClient::new(creds, server.url()).unwrap();

        let err = list_modules(&client, ModuleType::DataSources, &ListOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            crate::LmError::ApiError {
                status_code: Some(401),
                ..
            }
        ));

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_empty_server() {
        let server = MockServer::start_empty().await;
        let client = LmClient::new(Fixtures::credentials(), server.url()).unwrap();

        let result = Device::get(&client, 1).await;

        assert!(matches!(result, Err(crate::LmError::NotFound { .. })));

        server.shutdown().await;
    }
}
