//! # Existing Tests
//!
//! HTTP server tests as reported by the ThousandEyes API.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// A test already present in the remote inventory
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExistingTest {
    #[serde(rename = "testId", deserialize_with = "deserialize_test_id")]
    pub test_id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "testName")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExistingTest {
    pub fn new(test_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            test_id: test_id.into(),
            url: Some(url.into()),
            name: None,
            extra: Map::new(),
        }
    }

    /// Whether this remote test has the given url
    ///
    /// Both sides are compared without surrounding whitespace, the same way desired
    /// urls are normalized at load time. Nothing else is normalized.
    pub fn matches_url(&self, url: &str) -> bool {
        self.url
            .as_deref()
            .is_some_and(|own| own.trim() == url.trim())
    }
}

/// Test identifiers are strings in API v7 but numbers in older payloads
fn deserialize_test_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Text(id) if !id.trim().is_empty() => Ok(id),
        RawId::Text(_) => Err(serde::de::Error::custom("testId is empty")),
        RawId::Number(id) => Ok(id.to_string()),
    }
}
