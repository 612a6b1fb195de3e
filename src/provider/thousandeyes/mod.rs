//! ThousandEyes REST Client
//!
//! Native REST implementation of the ThousandEyes API v7 HTTP server test endpoints.
//! Uses reqwest with rustls and a bearer token.
//!
//! References:
//! - [ThousandEyes API v7](https://developer.cisco.com/docs/thousandeyes/v7/)

use super::{ApiResponse, InventoryError, TestsApi};
use crate::config::ApiToken;
use crate::constants::HTTP_SERVER_TESTS_PATH;
use crate::model::DesiredTest;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use std::time::{Duration, Instant};
use tracing::{debug, info_span, Instrument};

/// ThousandEyes REST client
pub struct ThousandEyesClient {
    http_client: Client,
    base_url: String,
    token: ApiToken,
}

impl std::fmt::Debug for ThousandEyesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThousandEyesClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ThousandEyesClient {
    /// Build a client for `base_url` (for example `https://api.thousandeyes.com/v7`)
    ///
    /// # Errors
    ///
    /// Fails when the underlying HTTP client cannot be built (TLS backend setup).
    pub fn new(base_url: &str, token: ApiToken, timeout: Duration) -> Result<Self, InventoryError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn tests_url(&self) -> String {
        format!("{}{}", self.base_url, HTTP_SERVER_TESTS_PATH)
    }

    fn test_url(&self, test_id: &str) -> String {
        format!("{}{}/{}", self.base_url, HTTP_SERVER_TESTS_PATH, test_id)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(self.token.expose())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
    }

    async fn send(&self, request: RequestBuilder) -> Result<ApiResponse, InventoryError> {
        let start = Instant::now();
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(
            status = status,
            duration_secs = start.elapsed().as_secs_f64(),
            "thousandeyes.response"
        );
        Ok(ApiResponse { status, body })
    }
}

#[async_trait]
impl TestsApi for ThousandEyesClient {
    async fn list_tests(&self) -> Result<ApiResponse, InventoryError> {
        let request = self.authorized(self.http_client.get(self.tests_url()));
        self.send(request)
            .instrument(info_span!("thousandeyes.list_tests"))
            .await
    }

    async fn create_test(&self, test: &DesiredTest) -> Result<ApiResponse, InventoryError> {
        let request = self.authorized(self.http_client.post(self.tests_url()).json(test));
        self.send(request)
            .instrument(info_span!("thousandeyes.create_test", test.url = test.url.as_str()))
            .await
    }

    async fn update_test(
        &self,
        test_id: &str,
        test: &DesiredTest,
    ) -> Result<ApiResponse, InventoryError> {
        let request = self.authorized(self.http_client.put(self.test_url(test_id)).json(test));
        self.send(request)
            .instrument(info_span!(
                "thousandeyes.update_test",
                test.id = test_id,
                test.url = test.url.as_str()
            ))
            .await
    }
}
