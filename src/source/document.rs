//! # Test Documents
//!
//! Parsing of the `config.yaml` payload carried by each labeled ConfigMap and
//! merging of all payloads into one desired state.

use crate::constants::CONFIG_DATA_KEY;
use crate::model::{DesiredTest, RawHttpTest};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, error, warn};

use super::SourceError;

/// A configuration document as handed over by the collaborator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    pub name: String,
    pub data: BTreeMap<String, String>,
}

impl ConfigDocument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: BTreeMap::new(),
        }
    }

    /// Attach a `config.yaml` payload
    #[must_use]
    pub fn with_payload(mut self, yaml: impl Into<String>) -> Self {
        self.data.insert(CONFIG_DATA_KEY.to_string(), yaml.into());
        self
    }
}

/// Content of a `config.yaml` payload
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestsDocument {
    /// Kept untyped so a non-boolean value can be ignored instead of failing the document
    #[serde(default)]
    pub dry_run: Option<serde_yaml::Value>,
    /// Decoded entry by entry so one bad test does not take its siblings down
    #[serde(default)]
    pub http_tests: Vec<serde_yaml::Value>,
}

impl TestsDocument {
    /// Parse the payload of `document`
    ///
    /// Returns `Ok(None)` when the document carries no `config.yaml` key.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Parse`] when the payload is not a valid tests document.
    pub fn parse(document: &ConfigDocument) -> Result<Option<Self>, SourceError> {
        let Some(payload) = document.data.get(CONFIG_DATA_KEY) else {
            return Ok(None);
        };
        serde_yaml::from_str(payload)
            .map(Some)
            .map_err(|source| SourceError::Parse {
                document: document.name.clone(),
                source,
            })
    }
}

/// Desired state derived from one listing of configuration documents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesiredState {
    pub dry_run: bool,
    pub tests: Vec<DesiredTest>,
}

/// Merge every parseable document, in listing order
///
/// The first explicit boolean `dryRun` wins; without one dry-run is off.
/// Documents that fail to parse are logged and skipped. Malformed test entries and
/// tests without a url are logged and skipped without affecting their siblings.
pub fn merge_documents(documents: &[ConfigDocument], default_agents: &[String]) -> DesiredState {
    let mut dry_run: Option<bool> = None;
    let mut tests = Vec::new();

    for document in documents {
        let parsed = match TestsDocument::parse(document) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => {
                debug!(
                    document = document.name.as_str(),
                    "ConfigMap has no {} key, skipping", CONFIG_DATA_KEY
                );
                continue;
            }
            Err(e) => {
                error!("Error parsing ConfigMap {}: {}", document.name, e);
                continue;
            }
        };

        if dry_run.is_none() {
            match parsed.dry_run.as_ref() {
                Some(serde_yaml::Value::Bool(value)) => dry_run = Some(*value),
                Some(other) => warn!(
                    document = document.name.as_str(),
                    "Ignoring non-boolean dryRun value: {:?}", other
                ),
                None => {}
            }
        }

        for entry in parsed.http_tests {
            let built = RawHttpTest::from_yaml(entry)
                .and_then(|raw| DesiredTest::from_raw(raw, default_agents));
            match built {
                Ok(test) => tests.push(test),
                Err(e) => error!(
                    document = document.name.as_str(),
                    "Skipping test definition: {}", e
                ),
            }
        }
    }

    DesiredState {
        dry_run: dry_run.unwrap_or(false),
        tests,
    }
}
