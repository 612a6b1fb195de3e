//! # Remote Inventory
//!
//! Access to the ThousandEyes HTTP server test inventory.
//!
//! [`TestsApi`] is the raw REST collaborator: it reports every HTTP response as a
//! value and only fails on transport problems. [`RemoteInventory`] layers dry-run
//! handling, the retry policy, logging and counters on top of it.

use crate::controller::retry::RetryPolicy;
use crate::model::{DesiredTest, ExistingTest};
use crate::observability::SyncMetrics;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

pub mod thousandeyes;

pub use thousandeyes::ThousandEyesClient;

/// Failures below the HTTP status level
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    Other(String),
}

/// Status and body of one API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// ThousandEyes HTTP server test endpoints
#[async_trait]
pub trait TestsApi: Send + Sync {
    /// `GET /tests/http-server`
    async fn list_tests(&self) -> Result<ApiResponse, InventoryError>;

    /// `POST /tests/http-server`
    async fn create_test(&self, test: &DesiredTest) -> Result<ApiResponse, InventoryError>;

    /// `PUT /tests/http-server/{test_id}`
    async fn update_test(
        &self,
        test_id: &str,
        test: &DesiredTest,
    ) -> Result<ApiResponse, InventoryError>;
}

/// Status the API answers a successful listing with
pub const LIST_SUCCESS_STATUS: u16 = 200;
/// Status the API answers a successful creation with
pub const CREATE_SUCCESS_STATUS: u16 = 201;
/// Status the API answers a successful update with
pub const UPDATE_SUCCESS_STATUS: u16 = 200;

#[derive(Debug, Deserialize)]
struct ListTestsResponse {
    #[serde(default)]
    tests: Vec<Value>,
}

/// Outcome of a single create or update call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    Succeeded,
    Failed,
    Skipped,
}

/// Remote test inventory with retries, dry-run and counters
#[derive(Debug)]
pub struct RemoteInventory<A> {
    api: A,
    retry: RetryPolicy,
    metrics: SyncMetrics,
}

impl<A: TestsApi> RemoteInventory<A> {
    pub fn new(api: A, retry: RetryPolicy, metrics: SyncMetrics) -> Self {
        Self {
            api,
            retry,
            metrics,
        }
    }

    pub fn metrics(&self) -> &SyncMetrics {
        &self.metrics
    }

    /// Fetch existing tests
    ///
    /// Any failure is logged and reported as an empty inventory.
    pub async fn list(&self) -> Vec<ExistingTest> {
        let response = match self.api.list_tests().await {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to fetch existing tests: {}", e);
                return Vec::new();
            }
        };

        if response.status != LIST_SUCCESS_STATUS {
            error!(
                "Failed to fetch existing tests: {} - {}",
                response.status, response.body
            );
            return Vec::new();
        }

        let listing: ListTestsResponse = match serde_json::from_str(&response.body) {
            Ok(listing) => listing,
            Err(e) => {
                error!("Failed to decode existing tests: {}", e);
                return Vec::new();
            }
        };

        listing
            .tests
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<ExistingTest>(entry) {
                Ok(test) => Some(test),
                Err(e) => {
                    warn!("Ignoring existing test without usable testId: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Create `test`, or only log the intent in dry-run mode
    pub async fn create(&self, test: &DesiredTest, dry_run: bool) -> CallOutcome {
        if dry_run {
            info!("[DRY RUN] Would create test: {}", test.name);
            return CallOutcome::Skipped;
        }

        let result = self
            .retry
            .retry("create_test", || self.api.create_test(test))
            .await;

        match result {
            Ok(response) if response.status == CREATE_SUCCESS_STATUS => {
                info!("Test '{}' created successfully.", test.name);
                self.metrics.increment_created();
                CallOutcome::Succeeded
            }
            Ok(response) => {
                error!(
                    "Failed to create test '{}': {} - {}",
                    test.name, response.status, response.body
                );
                self.metrics.increment_failed();
                CallOutcome::Failed
            }
            Err(e) => {
                error!(
                    "Failed to create test '{}' after {} attempts: {}",
                    test.name,
                    self.retry.max_attempts(),
                    e
                );
                self.metrics.increment_failed();
                CallOutcome::Failed
            }
        }
    }

    /// Update the remote test `test_id` from `test`, or only log the intent in dry-run mode
    pub async fn update(&self, test_id: &str, test: &DesiredTest, dry_run: bool) -> CallOutcome {
        if dry_run {
            info!(
                "[DRY RUN] Would update test: '{}' (ID: {})",
                test.name, test_id
            );
            return CallOutcome::Skipped;
        }

        let result = self
            .retry
            .retry("update_test", || self.api.update_test(test_id, test))
            .await;

        match result {
            Ok(response) if response.status == UPDATE_SUCCESS_STATUS => {
                info!("Test '{}' updated successfully.", test.name);
                self.metrics.increment_updated();
                CallOutcome::Succeeded
            }
            Ok(response) => {
                error!(
                    "Failed to update test '{}': {} - {}",
                    test.name, response.status, response.body
                );
                self.metrics.increment_failed();
                CallOutcome::Failed
            }
            Err(e) => {
                error!(
                    "Failed to update test '{}' (ID: {}) after {} attempts: {}",
                    test.name,
                    test_id,
                    self.retry.max_attempts(),
                    e
                );
                self.metrics.increment_failed();
                CallOutcome::Failed
            }
        }
    }
}
