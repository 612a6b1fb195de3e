//! # Configuration Source
//!
//! Reads the labeled configuration documents and turns them into the desired
//! test inventory.
//!
//! The collaborator holding the documents is abstracted behind two traits:
//! - [`DocumentSource`] lists documents matching the label selector
//! - [`ConfigWatch`] opens a finite, restartable stream of change events
//!
//! [`ConfigMapSource`] implements both on top of Kubernetes ConfigMaps.

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;
use tracing::{error, info};

mod document;
mod configmap;

pub use document::{merge_documents, ConfigDocument, DesiredState, TestsDocument};
pub use configmap::ConfigMapSource;

/// Errors raised by the configuration collaborator
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),
    #[error("watch reported an error event: {0}")]
    WatchEvent(String),
    #[error("failed to parse ConfigMap {document}: {source}")]
    Parse {
        document: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("{0}")]
    Other(String),
}

/// Kind of change reported by the watch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "ADDED",
            Self::Modified => "MODIFIED",
            Self::Deleted => "DELETED",
        }
    }
}

/// One change to a labeled document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub name: String,
}

impl ChangeEvent {
    pub fn new(kind: ChangeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

/// Stream of change events for one watch connection
///
/// Ends when the per-connection timeout elapses.
pub type ChangeStream = BoxStream<'static, Result<ChangeEvent, SourceError>>;

/// Lists configuration documents matching the label selector
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn list_documents(&self) -> Result<Vec<ConfigDocument>, SourceError>;
}

/// Opens watch subscriptions on the same documents
#[async_trait]
pub trait ConfigWatch: Send + Sync {
    async fn subscribe(&self) -> Result<ChangeStream, SourceError>;
}

/// Loads the desired state from a [`DocumentSource`]
#[derive(Debug)]
pub struct ConfigSource<D> {
    documents: D,
    default_agents: Vec<String>,
}

impl<D: DocumentSource> ConfigSource<D> {
    pub fn new(documents: D, default_agents: Vec<String>) -> Self {
        Self {
            documents,
            default_agents,
        }
    }

    /// Read the dry-run flag and desired tests from one listing
    ///
    /// A listing failure is logged and yields an empty, non dry-run state.
    pub async fn load_desired(&self) -> DesiredState {
        let documents = match self.documents.list_documents().await {
            Ok(documents) => documents,
            Err(e) => {
                error!("Failed to list ConfigMaps: {}", e);
                return DesiredState::default();
            }
        };

        let state = merge_documents(&documents, &self.default_agents);
        info!(
            documents = documents.len(),
            tests = state.tests.len(),
            dry_run = state.dry_run,
            "Loaded desired tests"
        );
        state
    }
}
