//! Shared fakes for the integration tests
//!
//! In-memory stand-ins for the two collaborators (ConfigMap documents and the
//! ThousandEyes API), plus rustls setup for tests that make real HTTP calls.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use prometheus::Registry;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use thousandeyes_sync::prelude::*;
use thousandeyes_sync::source::ChangeStream;

static RUSTLS_INIT: Once = Once::new();

/// Initialize rustls crypto provider for tests
///
/// Uses a `Once` to ensure it's only called once per test binary.
pub fn init_rustls() {
    RUSTLS_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

// ============================================================================
// ConfigMap documents
// ============================================================================

/// Document listing backed by a vector; can be switched to fail
#[derive(Clone, Default)]
pub struct FakeDocuments {
    documents: Arc<Mutex<Vec<ConfigDocument>>>,
    fail: Arc<AtomicBool>,
}

impl FakeDocuments {
    pub fn new(documents: Vec<ConfigDocument>) -> Self {
        Self {
            documents: Arc::new(Mutex::new(documents)),
            fail: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Single document carrying `yaml` as its `config.yaml`
    pub fn with_yaml(yaml: &str) -> Self {
        Self::new(vec![ConfigDocument::new("thousandeyes-tests").with_payload(yaml)])
    }

    pub fn failing() -> Self {
        let documents = Self::default();
        documents.fail.store(true, Ordering::SeqCst);
        documents
    }
}

#[async_trait]
impl DocumentSource for FakeDocuments {
    async fn list_documents(&self) -> Result<Vec<ConfigDocument>, SourceError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SourceError::Other("configmaps is forbidden".to_string()));
        }
        Ok(self.documents.lock().unwrap().clone())
    }
}

// ============================================================================
// ThousandEyes API
// ============================================================================

/// A call received by [`ScriptedApi`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List,
    Create(Value),
    Update(String, Value),
}

/// Scripted answer for one call
#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16, String),
    Transport(String),
}

#[derive(Default)]
struct ApiState {
    inventory: Vec<Value>,
    list_replies: VecDeque<Reply>,
    create_replies: VecDeque<Reply>,
    update_replies: VecDeque<Reply>,
    calls: Vec<Call>,
    next_id: u64,
}

/// Stateful fake of the HTTP server test endpoints
///
/// Without scripted replies it behaves like the real API: listings return the
/// current inventory, creations answer 201 and add the test, updates answer 200.
#[derive(Clone, Default)]
pub struct ScriptedApi {
    state: Arc<Mutex<ApiState>>,
}

impl ScriptedApi {
    pub fn with_existing(tests: Vec<Value>) -> Self {
        let api = Self::default();
        {
            let mut state = api.state.lock().unwrap();
            state.inventory = tests;
            state.next_id = 1000;
        }
        api
    }

    pub fn script_list(&self, reply: Reply) {
        self.state.lock().unwrap().list_replies.push_back(reply);
    }

    pub fn script_create(&self, replies: impl IntoIterator<Item = Reply>) {
        self.state.lock().unwrap().create_replies.extend(replies);
    }

    pub fn script_update(&self, replies: impl IntoIterator<Item = Reply>) {
        self.state.lock().unwrap().update_replies.extend(replies);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn creates(&self) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Create(body) => Some(body),
                _ => None,
            })
            .collect()
    }

    pub fn updates(&self) -> Vec<(String, Value)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Update(id, body) => Some((id, body)),
                _ => None,
            })
            .collect()
    }

    pub fn inventory(&self) -> Vec<Value> {
        self.state.lock().unwrap().inventory.clone()
    }
}

fn into_result(reply: Reply) -> Result<ApiResponse, InventoryError> {
    match reply {
        Reply::Status(status, body) => Ok(ApiResponse::new(status, body)),
        Reply::Transport(message) => Err(InventoryError::Other(message)),
    }
}

#[async_trait]
impl TestsApi for ScriptedApi {
    async fn list_tests(&self) -> Result<ApiResponse, InventoryError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::List);
        if let Some(reply) = state.list_replies.pop_front() {
            return into_result(reply);
        }
        let body = json!({ "tests": state.inventory }).to_string();
        Ok(ApiResponse::new(200, body))
    }

    async fn create_test(&self, test: &DesiredTest) -> Result<ApiResponse, InventoryError> {
        let body = serde_json::to_value(test).unwrap();
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Create(body));
        if let Some(reply) = state.create_replies.pop_front() {
            return into_result(reply);
        }
        state.next_id += 1;
        let id = state.next_id.to_string();
        state.inventory.push(json!({
            "testId": id,
            "testName": test.name,
            "url": test.url,
        }));
        Ok(ApiResponse::new(201, json!({ "testId": id }).to_string()))
    }

    async fn update_test(
        &self,
        test_id: &str,
        test: &DesiredTest,
    ) -> Result<ApiResponse, InventoryError> {
        let body = serde_json::to_value(test).unwrap();
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Update(test_id.to_string(), body));
        if let Some(reply) = state.update_replies.pop_front() {
            return into_result(reply);
        }
        Ok(ApiResponse::new(200, json!({ "testId": test_id }).to_string()))
    }
}

/// Reconciler over the two fakes with the default retry policy and fresh counters
pub fn reconciler(
    documents: FakeDocuments,
    api: ScriptedApi,
) -> Reconciler<FakeDocuments, ScriptedApi> {
    let metrics = SyncMetrics::register(&Registry::new()).unwrap();
    let inventory = RemoteInventory::new(api, RetryPolicy::default(), metrics);
    let source = ConfigSource::new(documents, vec!["32".to_string()]);
    Reconciler::new(source, inventory)
}

// ============================================================================
// Watch
// ============================================================================

/// One scripted subscription: either a failure to subscribe or a finite stream
pub enum Subscription {
    Fail(String),
    Events(Vec<Result<ChangeEvent, SourceError>>),
}

/// Watch that replays scripted subscriptions, then hangs on an endless empty one
#[derive(Clone, Default)]
pub struct FakeWatch {
    subscriptions: Arc<Mutex<VecDeque<Subscription>>>,
    opened: Arc<AtomicUsize>,
}

impl FakeWatch {
    pub fn new(subscriptions: Vec<Subscription>) -> Self {
        Self {
            subscriptions: Arc::new(Mutex::new(subscriptions.into())),
            opened: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of `subscribe` calls so far
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigWatch for FakeWatch {
    async fn subscribe(&self) -> Result<ChangeStream, SourceError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let next = self.subscriptions.lock().unwrap().pop_front();
        match next {
            Some(Subscription::Fail(message)) => Err(SourceError::Other(message)),
            Some(Subscription::Events(events)) => Ok(stream::iter(events).boxed()),
            None => Ok(stream::pending::<Result<ChangeEvent, SourceError>>().boxed()),
        }
    }
}

pub fn added(name: &str) -> Result<ChangeEvent, SourceError> {
    Ok(ChangeEvent::new(ChangeKind::Added, name))
}

pub fn modified(name: &str) -> Result<ChangeEvent, SourceError> {
    Ok(ChangeEvent::new(ChangeKind::Modified, name))
}

/// Reconciler stand-in that counts calls and tracks overlap
#[derive(Clone, Default)]
pub struct CountingReconciler {
    calls: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    work: Duration,
}

impl CountingReconciler {
    /// Each sync takes `work` of (virtual) time
    pub fn slow(work: Duration) -> Self {
        Self {
            work,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Reconcile for CountingReconciler {
    async fn reconcile(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.work.is_zero() {
            tokio::time::sleep(self.work).await;
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
