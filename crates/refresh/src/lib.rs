//! # Refresh Controller
//!
//! Orchestrates recomputation of one page's pipeline: it debounces rapid
//! filter changes, issues one simulated fetch per settled filter state,
//! discards out-of-order responses, and publishes `PipelineResult`s on a
//! watch channel the view subscribes to.
//!
//! ## State machine
//!
//! `Idle → Debouncing → Fetching → (Applied | StaleDiscarded | Failed) → Idle`
//!
//! Staleness is decided by monotonic sequence numbers compared at resolution
//! time, never by timestamps (clock skew) or by clearing timer handles
//! (fragile under nested async callbacks). A filter change while a fetch is
//! in flight pre-emptively bumps the sequence counter, so the late response
//! is discarded on arrival and can never overwrite a fresher result.
//!
//! Aggregator and currency errors are caught here and converted into the
//! `error` field of the published result; they never escape to the
//! subscriber. On a failed fetch the last successfully applied rows stay
//! visible (stale-but-available beats blank).

use aggregators::{AggregationEngine, AggregationPlan, AggregatorError};
use chrono::{DateTime, Utc};
use core_types::{Dataset, ErrorKind, FilterState, PipelineResult, RawRecord};
use currency::{CurrencyConverter, CurrencyError};
use datasource::DataSource;
use filter_store::{FilterStore, Subscription};
use projector::{OutputProjector, SortSpec};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// One debounced unit of work: the snapshot a fetch was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub sequence_number: u64,
    pub filter_snapshot: FilterState,
    pub issued_at: DateTime<Utc>,
}

/// Where the controller currently is in its state machine. The terminal
/// outcomes (`Applied`, `StaleDiscarded`, `Failed`) are ready-for-input
/// states; they are kept distinct for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Debouncing,
    Fetching,
    Applied,
    StaleDiscarded,
    Failed,
}

struct MutableState {
    phase: Phase,
    /// Highest sequence number whose result has been applied (success or
    /// failure). Monotonically non-decreasing.
    applied_seq: u64,
    debounce_task: Option<JoinHandle<()>>,
}

struct ControllerInner {
    dataset: Dataset,
    source: Arc<dyn DataSource>,
    store: FilterStore,
    converter: CurrencyConverter,
    engine: AggregationEngine,
    projector: OutputProjector,
    plan: AggregationPlan,
    sort: SortSpec,
    debounce_window: Duration,
    /// Monotonic counter; bumped on every filter change and every issued
    /// fetch. A response is fresh only if its number is still the highest.
    seq: AtomicU64,
    state: Mutex<MutableState>,
    tx: watch::Sender<PipelineResult>,
}

/// The per-page orchestrator. Construct one per dataset, keep it alive for
/// the lifetime of the page, and read results from `subscribe()`.
///
/// Controller methods must run inside a tokio runtime: the debounce timer and
/// the fetch are spawned tasks.
pub struct RefreshController {
    inner: Arc<ControllerInner>,
    _store_subscription: Subscription,
}

impl RefreshController {
    pub fn new(
        dataset: Dataset,
        source: Arc<dyn DataSource>,
        store: FilterStore,
        converter: CurrencyConverter,
        plan: AggregationPlan,
        sort: SortSpec,
        debounce_window: Duration,
    ) -> Self {
        let (tx, _) = watch::channel(PipelineResult::empty());
        let inner = Arc::new(ControllerInner {
            dataset,
            source,
            store: store.clone(),
            converter,
            engine: AggregationEngine::new(),
            projector: OutputProjector::new(),
            plan,
            sort,
            debounce_window,
            seq: AtomicU64::new(0),
            state: Mutex::new(MutableState {
                phase: Phase::Idle,
                applied_seq: 0,
                debounce_task: None,
            }),
            tx,
        });

        let listener_inner = Arc::clone(&inner);
        let subscription = store.subscribe(move |_| {
            ControllerInner::on_filter_change(&listener_inner);
        });

        Self {
            inner,
            _store_subscription: subscription,
        }
    }

    /// A receiver over published results; `borrow()` always holds the latest
    /// fully-formed result, never a partially-updated one.
    pub fn subscribe(&self) -> watch::Receiver<PipelineResult> {
        self.inner.tx.subscribe()
    }

    /// The most recently published result.
    pub fn latest(&self) -> PipelineResult {
        self.inner.tx.borrow().clone()
    }

    /// Manual refresh: bypasses the debounce window but still goes through
    /// sequencing and the staleness check.
    pub fn force_refresh(&self) {
        let inner = &self.inner;
        {
            let mut state = inner.lock_state();
            if let Some(task) = state.debounce_task.take() {
                task.abort();
            }
        }
        ControllerInner::issue(inner, inner.store.state());
    }

    pub fn phase(&self) -> Phase {
        self.inner.lock_state().phase
    }

    pub fn dataset(&self) -> &Dataset {
        &self.inner.dataset
    }
}

impl ControllerInner {
    fn lock_state(&self) -> std::sync::MutexGuard<'_, MutableState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_phase(&self, next: Phase) {
        let mut state = self.lock_state();
        tracing::debug!(from = ?state.phase, to = ?next, "refresh transition");
        state.phase = next;
    }

    /// Filter changed: invalidate any in-flight fetch and (re)start the
    /// debounce timer. Only the last settled state within the window is
    /// fetched.
    fn on_filter_change(self: &Arc<Self>) {
        // Pre-emptive bump: an in-flight response is stale from this moment.
        self.seq.fetch_add(1, Ordering::SeqCst);

        let mut state = self.lock_state();
        if let Some(task) = state.debounce_task.take() {
            task.abort();
        }
        tracing::debug!(from = ?state.phase, to = ?Phase::Debouncing, "refresh transition");
        state.phase = Phase::Debouncing;

        let timer_inner = Arc::clone(self);
        state.debounce_task = Some(tokio::spawn(async move {
            tokio::time::sleep(timer_inner.debounce_window).await;
            // Snapshot at elapse time: the state of the last change in the burst.
            let snapshot = timer_inner.store.state();
            ControllerInner::issue(&timer_inner, snapshot);
        }));
    }

    /// Allocates the next sequence number, publishes the loading flag, and
    /// spawns the fetch.
    fn issue(self: &Arc<Self>, snapshot: FilterState) {
        let sequence_number = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let request = RefreshRequest {
            sequence_number,
            filter_snapshot: snapshot,
            issued_at: Utc::now(),
        };
        self.set_phase(Phase::Fetching);
        tracing::debug!(seq = sequence_number, "issuing fetch");

        // Prior rows stay visible while loading.
        self.tx.send_modify(|result| {
            result.loading = true;
            result.error = None;
        });

        let fetch_inner = Arc::clone(self);
        tokio::spawn(async move {
            let fetched = fetch_inner
                .source
                .fetch(&fetch_inner.dataset.id, &request.filter_snapshot)
                .await;
            fetch_inner.resolve(request, fetched);
        });
    }

    /// Applies a resolved fetch, unless a later request has superseded it.
    fn resolve(
        &self,
        request: RefreshRequest,
        fetched: Result<Vec<RawRecord>, datasource::SourceError>,
    ) {
        // Fresh only if still the highest number handed out. The comparison
        // is the entire race-handling story; no timer bookkeeping involved.
        if request.sequence_number != self.seq.load(Ordering::SeqCst) {
            tracing::debug!(seq = request.sequence_number, "discarding stale response");
            self.set_phase(Phase::StaleDiscarded);
            return;
        }

        let mut state = self.lock_state();
        if request.sequence_number <= state.applied_seq {
            state.phase = Phase::StaleDiscarded;
            return;
        }
        state.applied_seq = request.sequence_number;

        match fetched {
            Ok(records) => match self.compute(&records, &request.filter_snapshot) {
                Ok(result) => {
                    tracing::debug!(seq = request.sequence_number, rows = result.rows.len(), "applied");
                    state.phase = Phase::Applied;
                    self.tx.send_replace(result);
                }
                Err(err) => {
                    tracing::warn!(seq = request.sequence_number, error = %err, "aggregation failed");
                    state.phase = Phase::Failed;
                    let kind = error_kind(&err);
                    self.tx.send_modify(|result| {
                        result.loading = false;
                        result.error = Some(kind.clone());
                    });
                }
            },
            Err(err) => {
                tracing::warn!(seq = request.sequence_number, error = %err, "fetch failed");
                state.phase = Phase::Failed;
                // Keep the last good rows visible; the view renders a retry
                // affordance off the error flag.
                self.tx.send_modify(|result| {
                    result.loading = false;
                    result.error = Some(ErrorKind::FetchFailure);
                });
            }
        }
    }

    /// The synchronous tail of the pipeline: aggregate, project, round.
    fn compute(
        &self,
        records: &[RawRecord],
        snapshot: &FilterState,
    ) -> Result<PipelineResult, AggregatorError> {
        let output = self
            .engine
            .run(&self.plan, &self.dataset, records, snapshot, &self.converter)?;
        let rows = self.projector.project(output.rows, &self.sort);
        let summary = self.projector.finalize_summary(output.summary);
        Ok(PipelineResult {
            rows,
            summary,
            loading: false,
            error: None,
            last_refreshed_at: Some(Utc::now()),
        })
    }
}

fn error_kind(err: &AggregatorError) -> ErrorKind {
    match err {
        AggregatorError::Currency(CurrencyError::UnknownCurrency(_)) => ErrorKind::UnknownCurrency,
    }
}
