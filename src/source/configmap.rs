//! # ConfigMap Source
//!
//! Lists and watches labeled ConfigMaps in a single namespace.

use super::{
    ChangeEvent, ChangeKind, ChangeStream, ConfigDocument, ConfigWatch, DocumentSource,
    SourceError,
};
use async_trait::async_trait;
use futures::{future, StreamExt};
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::{Api, ListParams, WatchEvent, WatchParams};
use kube::Client;

/// ConfigMaps in one namespace, filtered by a label selector
#[derive(Clone)]
pub struct ConfigMapSource {
    api: Api<ConfigMap>,
    namespace: String,
    label_selector: String,
    watch_timeout_secs: u32,
}

impl std::fmt::Debug for ConfigMapSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigMapSource")
            .field("namespace", &self.namespace)
            .field("label_selector", &self.label_selector)
            .field("watch_timeout_secs", &self.watch_timeout_secs)
            .finish_non_exhaustive()
    }
}

impl ConfigMapSource {
    pub fn new(
        client: Client,
        namespace: &str,
        label_selector: &str,
        watch_timeout_secs: u32,
    ) -> Self {
        Self {
            api: Api::namespaced(client, namespace),
            namespace: namespace.to_string(),
            label_selector: label_selector.to_string(),
            watch_timeout_secs,
        }
    }
}

impl From<ConfigMap> for ConfigDocument {
    fn from(configmap: ConfigMap) -> Self {
        Self {
            name: configmap.metadata.name.unwrap_or_default(),
            data: configmap.data.unwrap_or_default(),
        }
    }
}

#[async_trait]
impl DocumentSource for ConfigMapSource {
    async fn list_documents(&self) -> Result<Vec<ConfigDocument>, SourceError> {
        let params = ListParams::default().labels(&self.label_selector);
        let list = self.api.list(&params).await?;
        Ok(list.items.into_iter().map(ConfigDocument::from).collect())
    }
}

#[async_trait]
impl ConfigWatch for ConfigMapSource {
    async fn subscribe(&self) -> Result<ChangeStream, SourceError> {
        let params = WatchParams::default()
            .labels(&self.label_selector)
            .timeout(self.watch_timeout_secs);
        // "0" starts from any cached state, so existing ConfigMaps arrive as ADDED
        let stream = self.api.watch(&params, "0").await?;

        Ok(stream
            .filter_map(|item| future::ready(to_change_event(item)))
            .boxed())
    }
}

fn to_change_event(
    item: Result<WatchEvent<ConfigMap>, kube::Error>,
) -> Option<Result<ChangeEvent, SourceError>> {
    let event = match item {
        Ok(event) => event,
        Err(e) => return Some(Err(SourceError::from(e))),
    };
    match event {
        WatchEvent::Added(cm) => Some(Ok(ChangeEvent::new(ChangeKind::Added, name_of(&cm)))),
        WatchEvent::Modified(cm) => {
            Some(Ok(ChangeEvent::new(ChangeKind::Modified, name_of(&cm))))
        }
        WatchEvent::Deleted(cm) => Some(Ok(ChangeEvent::new(ChangeKind::Deleted, name_of(&cm)))),
        WatchEvent::Bookmark(_) => None,
        WatchEvent::Error(e) => Some(Err(SourceError::WatchEvent(format!("{e:?}")))),
    }
}

fn name_of(configmap: &ConfigMap) -> String {
    configmap
        .metadata
        .name
        .clone()
        .unwrap_or_else(|| "unknown".to_string())
}
