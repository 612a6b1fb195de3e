//! # Desired Tests
//!
//! HTTP server tests as declared in ConfigMaps, and their normalized form
//! sent to the ThousandEyes API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Agent assignment in the shape the ThousandEyes API expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    #[serde(rename = "agentId")]
    pub agent_id: String,
}

impl Agent {
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
        }
    }
}

/// Agent entry as written by users
///
/// `"32"`, `32` and `{agentId: 32}` all name the same agent. Any other scalar is
/// taken as written; `null` and lists name no agent.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct AgentRef(Value);

impl AgentRef {
    fn into_agent(self) -> Option<Agent> {
        agent_id(self.0)
            .filter(|id| !id.is_empty())
            .map(Agent::new)
    }
}

fn agent_id(value: Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.trim().to_string()),
        Value::Number(id) => Some(id.to_string()),
        Value::Bool(id) => Some(id.to_string()),
        Value::Object(mut record) => record.remove("agentId").and_then(agent_id),
        Value::Null | Value::Array(_) => None,
    }
}

/// One entry of a document's `httpTests` array, before defaults are applied
#[derive(Debug, Clone, Deserialize)]
pub struct RawHttpTest {
    #[serde(default, rename = "testName")]
    pub test_name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub agents: Option<Vec<AgentRef>>,
    /// Every other test property, passed through to the API untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawHttpTest {
    /// Decode one `httpTests` entry
    ///
    /// # Errors
    ///
    /// Returns [`DesiredTestError::Invalid`] when the entry is not a mapping or a
    /// known field has the wrong shape.
    pub fn from_yaml(entry: serde_yaml::Value) -> Result<Self, DesiredTestError> {
        serde_yaml::from_value(entry).map_err(|e| DesiredTestError::Invalid(e.to_string()))
    }

    /// `testName`, or a string `name` when `testName` is absent
    ///
    /// A `name` next to `testName` stays in `extra` and is sent as is.
    fn take_name(&mut self) -> Option<String> {
        if let Some(name) = self.test_name.take() {
            return Some(name);
        }
        if matches!(self.extra.get("name"), Some(Value::String(_))) {
            if let Some(Value::String(name)) = self.extra.remove("name") {
                return Some(name);
            }
        }
        None
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DesiredTestError {
    #[error("test '{0}' has no url")]
    MissingUrl(String),
    #[error("invalid test definition: {0}")]
    Invalid(String),
}

/// A test the remote inventory should contain
///
/// `name` and `agents` are never empty once built through [`DesiredTest::from_raw`].
/// `url` is the natural key used to match remote tests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DesiredTest {
    #[serde(rename = "testName")]
    pub name: String,
    pub url: String,
    pub agents: Vec<Agent>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DesiredTest {
    /// Apply load-time defaults
    ///
    /// A missing name becomes `Test-{url}`; missing or empty agents become `default_agents`.
    /// The url is trimmed, see [`crate::model::ExistingTest::matches_url`].
    ///
    /// # Errors
    ///
    /// Returns [`DesiredTestError::MissingUrl`] when the test has no usable url.
    pub fn from_raw(
        mut raw: RawHttpTest,
        default_agents: &[String],
    ) -> Result<Self, DesiredTestError> {
        let name = raw.take_name();
        let url = raw
            .url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                DesiredTestError::MissingUrl(name.clone().unwrap_or_else(|| "unnamed".into()))
            })?;

        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| default_name(&url));

        let agents: Vec<Agent> = raw
            .agents
            .unwrap_or_default()
            .into_iter()
            .filter_map(AgentRef::into_agent)
            .collect();
        let agents = if agents.is_empty() {
            default_agents.iter().map(Agent::new).collect()
        } else {
            agents
        };

        Ok(Self {
            name,
            url,
            agents,
            extra: raw.extra,
        })
    }
}

/// Name given to a test that does not declare one
pub fn default_name(url: &str) -> String {
    format!("Test-{url}")
}
