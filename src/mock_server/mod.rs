//! Mock LogicMonitor API server for E2E testing.
//!
//! This module provides an in-memory mock server that simulates the
//! LogicMonitor REST API for integration and end-to-end testing. Unlike
//! wiremock which mocks at the HTTP level per-test, this server pages real
//! collections, checks LMv1 signatures and can replay scripted failures.
//!
//! # Example
//!
//! ```ignore
//! use lmexport::mock_server::MockServer;
//! use lmexport::{list_modules, ListOptions, LmClient, ModuleType};
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let client = LmClient::new(server.credentials(), server.url()).unwrap();
//!
//!     // Server comes with default fixtures
//!     let sources = list_modules(&client, ModuleType::DataSources, &ListOptions::default())
//!         .await
//!         .unwrap();
//!     assert!(!sources.is_empty());
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::Fixtures;
pub use server::MockServer;
pub use state::{MockState, ScriptedFailure};
