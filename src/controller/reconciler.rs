//! # Reconciler
//!
//! Brings the ThousandEyes inventory in line with the tests declared in ConfigMaps.
//!
//! Each pass:
//! 1. Loads the desired tests and the dry-run flag from the [`ConfigSource`]
//! 2. Lists the existing remote tests
//! 3. Matches every desired test to the first existing test with the same `url`
//! 4. Updates matched tests and creates the others
//!
//! Reconciliation is additive: remote tests that are no longer declared are left alone.
//! No state survives between passes, the remote inventory is the only record of what exists.
//!
//! `sync()` is not reentrant. It runs once at startup and then only from the single
//! watch loop, one change event at a time.

use crate::model::{DesiredTest, ExistingTest};
use crate::provider::{CallOutcome, RemoteInventory, TestsApi};
use crate::source::{ConfigSource, DocumentSource};
use async_trait::async_trait;
use std::time::Instant;
use tracing::{info, info_span, Instrument};

/// What a pass decided to do with one desired test
#[derive(Debug, Clone, PartialEq)]
pub enum SyncAction {
    Create(DesiredTest),
    Update { test_id: String, test: DesiredTest },
}

impl SyncAction {
    pub fn test(&self) -> &DesiredTest {
        match self {
            Self::Create(test) | Self::Update { test, .. } => test,
        }
    }

    pub fn is_update(&self) -> bool {
        matches!(self, Self::Update { .. })
    }
}

/// Actions of one pass, with the outcome of each call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncPlan {
    pub dry_run: bool,
    pub actions: Vec<SyncAction>,
    pub outcomes: Vec<CallOutcome>,
}

impl SyncPlan {
    pub fn creates(&self) -> usize {
        self.actions.iter().filter(|a| !a.is_update()).count()
    }

    pub fn updates(&self) -> usize {
        self.actions.iter().filter(|a| a.is_update()).count()
    }
}

/// Decide create or update for every desired test
///
/// The first existing test with an equal `url` wins; duplicates further down the
/// remote listing are ignored.
pub fn plan(desired: Vec<DesiredTest>, existing: &[ExistingTest]) -> Vec<SyncAction> {
    desired
        .into_iter()
        .map(
            |test| match existing.iter().find(|e| e.matches_url(&test.url)) {
                Some(found) => SyncAction::Update {
                    test_id: found.test_id.clone(),
                    test,
                },
                None => SyncAction::Create(test),
            },
        )
        .collect()
}

/// Something the watch loop can trigger on every change
#[async_trait]
pub trait Reconcile: Send + Sync {
    async fn reconcile(&self);
}

/// Reconciler context
#[derive(Debug)]
pub struct Reconciler<D, A> {
    source: ConfigSource<D>,
    inventory: RemoteInventory<A>,
}

impl<D: DocumentSource, A: TestsApi> Reconciler<D, A> {
    pub fn new(source: ConfigSource<D>, inventory: RemoteInventory<A>) -> Self {
        Self { source, inventory }
    }

    pub fn inventory(&self) -> &RemoteInventory<A> {
        &self.inventory
    }

    /// Run one reconciliation pass and return what it did
    pub async fn sync(&self) -> SyncPlan {
        let start = Instant::now();
        let desired = self.source.load_desired().await;
        info!("Starting sync process (Dry Run: {})", desired.dry_run);

        let existing = self.inventory.list().await;
        let actions = plan(desired.tests, &existing);

        let mut outcomes = Vec::with_capacity(actions.len());
        for action in &actions {
            let outcome = match action {
                SyncAction::Update { test_id, test } => {
                    info!("Test '{}' exists, updating it.", test.name);
                    self.inventory.update(test_id, test, desired.dry_run).await
                }
                SyncAction::Create(test) => {
                    info!("Test '{}' does not exist, creating it.", test.name);
                    self.inventory.create(test, desired.dry_run).await
                }
            };
            outcomes.push(outcome);
        }

        let sync_plan = SyncPlan {
            dry_run: desired.dry_run,
            actions,
            outcomes,
        };
        info!(
            creates = sync_plan.creates(),
            updates = sync_plan.updates(),
            existing = existing.len(),
            duration_secs = start.elapsed().as_secs_f64(),
            "Sync process finished"
        );
        sync_plan
    }
}

#[async_trait]
impl<D: DocumentSource, A: TestsApi> Reconcile for Reconciler<D, A> {
    async fn reconcile(&self) {
        self.sync().instrument(info_span!("controller.sync")).await;
    }
}
