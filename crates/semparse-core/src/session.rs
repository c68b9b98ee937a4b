//! Session controller owning the clustering workflow state.
//!
//! A session moves `Empty -> Collected -> Clustered` and back to `Empty` on
//! reset. Every boundary call (reading input, clustering, exporting) first
//! marks the session busy; while busy, every other transition is refused.
//! Each reset bumps a generation counter so that a call resolving after its
//! session was reset or abandoned cannot write into the new session.

use crate::{
    split_clipboard_text, ClipboardSource, ClusterRequestBuilder, ClusteringEngine, CsvSource,
    ExportCoordinator, Exporter, Result, SemparseError,
};
use chrono::Utc;
use semparse_types::{
    BusyInfo, BusyOperation, ClusterParams, ClusterParamsInput, DisplayClusterResult,
    FailureNotice, SessionSnapshot, SessionStage, WorkingSet, RECOMMENDED_MIN_LINES,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Configuration for a session controller.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Parameters shown before the first submit and restored on reset.
    pub default_params: ClusterParams,
    /// Longest a boundary call may run before it is reported as hung.
    /// `None` waits indefinitely.
    pub boundary_timeout: Option<Duration>,
    /// Line count below which a warning is raised. Not enforced.
    pub recommended_min_lines: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_params: ClusterParams::default(),
            boundary_timeout: Some(Duration::from_secs(300)),
            recommended_min_lines: RECOMMENDED_MIN_LINES,
        }
    }
}

#[derive(Debug)]
struct SessionState {
    generation: u64,
    working_set: Option<WorkingSet>,
    params: ClusterParams,
    clusters: Option<DisplayClusterResult>,
    busy: Option<BusyInfo>,
    last_failure: Option<FailureNotice>,
}

/// Proof that a caller put the session into busy state.
#[derive(Debug, Clone, Copy)]
struct BusyTicket {
    generation: u64,
    operation: BusyOperation,
}

impl SessionState {
    fn new(params: ClusterParams) -> Self {
        Self {
            generation: 0,
            working_set: None,
            params,
            clusters: None,
            busy: None,
            last_failure: None,
        }
    }

    fn stage(&self) -> SessionStage {
        match (&self.working_set, &self.clusters) {
            (Some(_), Some(_)) => SessionStage::Clustered,
            (Some(_), None) => SessionStage::Collected,
            _ => SessionStage::Empty,
        }
    }

    fn ensure_idle(&self) -> Result<()> {
        match &self.busy {
            Some(busy) => Err(SemparseError::Busy(busy.operation)),
            None => Ok(()),
        }
    }

    fn ensure_stage(&self, expected: SessionStage) -> Result<()> {
        let actual = self.stage();
        if actual != expected {
            return Err(SemparseError::InvalidStage { expected, actual });
        }
        Ok(())
    }

    fn enter_busy(&mut self, operation: BusyOperation) -> BusyTicket {
        self.busy = Some(BusyInfo {
            operation,
            since: Utc::now(),
        });
        BusyTicket {
            generation: self.generation,
            operation,
        }
    }

    /// Release the busy flag if `ticket` still owns it.
    fn settle(&mut self, ticket: BusyTicket) -> Result<()> {
        let owned = self.generation == ticket.generation
            && self
                .busy
                .as_ref()
                .is_some_and(|b| b.operation == ticket.operation);
        if !owned {
            debug!(
                target: "semparse::session",
                "Discarding {} result from a previous session generation",
                ticket.operation
            );
            return Err(SemparseError::Superseded(ticket.operation));
        }
        self.busy = None;
        Ok(())
    }

    fn record_failure(&mut self, err: &SemparseError) {
        self.last_failure = Some(FailureNotice {
            kind: err.kind(),
            message: err.to_string(),
            at: Utc::now(),
        });
    }

    fn clear(&mut self, params: ClusterParams) {
        self.generation += 1;
        self.working_set = None;
        self.clusters = None;
        self.busy = None;
        self.last_failure = None;
        self.params = params;
    }
}

/// State and collaborators shared with detached boundary tasks.
struct Shared {
    id: Uuid,
    config: SessionConfig,
    builder: ClusterRequestBuilder,
    exporter: Arc<dyn Exporter>,
    state: RwLock<SessionState>,
}

impl Shared {
    fn snapshot_of(&self, state: &SessionState) -> SessionSnapshot {
        let lines = state
            .working_set
            .as_ref()
            .map(|ws| ws.lines().to_vec())
            .unwrap_or_default();
        SessionSnapshot {
            session_id: self.id,
            stage: state.stage(),
            busy: state.busy.clone(),
            line_count: lines.len(),
            meets_recommended_size: lines.len() >= self.config.recommended_min_lines,
            lines,
            params: state.params,
            clusters: state.clusters.clone(),
            last_failure: state.last_failure.clone(),
        }
    }

    fn apply_lines(&self, state: &mut SessionState, lines: Vec<String>) -> SessionSnapshot {
        if lines.is_empty() {
            warn!(target: "semparse::acquire", "No lines acquired, session stays empty");
            return self.snapshot_of(state);
        }

        let working_set = WorkingSet::new(lines);
        if !working_set.meets_recommended_size(self.config.recommended_min_lines) {
            warn!(
                target: "semparse::acquire",
                "Only {} lines acquired, at least {} are recommended for clustering",
                working_set.len(),
                self.config.recommended_min_lines
            );
        }
        info!(target: "semparse::session", "Collected {} lines", working_set.len());

        state.working_set = Some(working_set);
        state.last_failure = None;
        self.snapshot_of(state)
    }

    async fn bounded<T, F>(&self, operation: BusyOperation, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let Some(limit) = self.config.boundary_timeout else {
            return call.await;
        };
        match tokio::time::timeout(limit, call).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(
                    target: "semparse::session",
                    "{} did not finish within {:?}",
                    operation,
                    limit
                );
                Err(SemparseError::HungOperation {
                    operation,
                    waited: limit,
                })
            }
        }
    }
}

/// Owns one clustering session for the life of the process.
///
/// Boundary calls run on their own tokio task. Dropping the future returned
/// by `submit`, `export` or an acquisition does not cancel the call: it runs
/// to completion and its result is applied, or discarded if the session was
/// abandoned in the meantime.
pub struct SessionController {
    shared: Arc<Shared>,
}

impl SessionController {
    pub fn new(
        config: SessionConfig,
        engine: Arc<dyn ClusteringEngine>,
        exporter: Arc<dyn Exporter>,
    ) -> Self {
        let id = Uuid::new_v4();
        info!(target: "semparse::session", "Session {} created", id);
        Self {
            shared: Arc::new(Shared {
                id,
                state: RwLock::new(SessionState::new(config.default_params)),
                config,
                builder: ClusterRequestBuilder::new(engine),
                exporter,
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    pub async fn stage(&self) -> SessionStage {
        self.shared.state.read().await.stage()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.shared.state.read().await;
        self.shared.snapshot_of(&state)
    }

    /// How long the current boundary call has been running.
    pub async fn busy_for(&self) -> Option<Duration> {
        let state = self.shared.state.read().await;
        state
            .busy
            .as_ref()
            .map(|b| (Utc::now() - b.since).to_std().unwrap_or_default())
    }

    /// Whether a boundary call has been in flight for at least `threshold`.
    pub async fn is_hung(&self, threshold: Duration) -> bool {
        self.busy_for().await.is_some_and(|elapsed| elapsed >= threshold)
    }

    /// Load lines directly. An empty list leaves the session empty.
    pub async fn acquire(&self, lines: Vec<String>) -> Result<SessionSnapshot> {
        let mut state = self.shared.state.write().await;
        state.ensure_idle()?;
        state.ensure_stage(SessionStage::Empty)?;
        Ok(self.shared.apply_lines(&mut state, lines))
    }

    /// Load lines from the clipboard, one per line break.
    pub async fn acquire_from_clipboard(
        &self,
        source: Arc<dyn ClipboardSource>,
    ) -> Result<SessionSnapshot> {
        self.acquire_via(async move {
            let text = source.read_clipboard_text().await?;
            Ok(split_clipboard_text(&text))
        })
        .await
    }

    /// Load lines from a CSV file.
    pub async fn acquire_from_csv(&self, source: Arc<dyn CsvSource>) -> Result<SessionSnapshot> {
        self.acquire_via(async move { source.ingest_csv().await }).await
    }

    async fn acquire_via<F>(&self, read: F) -> Result<SessionSnapshot>
    where
        F: Future<Output = Result<Vec<String>>> + Send + 'static,
    {
        let ticket = {
            let mut state = self.shared.state.write().await;
            state.ensure_idle()?;
            state.ensure_stage(SessionStage::Empty)?;
            state.enter_busy(BusyOperation::Acquiring)
        };

        self.run_detached(ticket, read, |shared, state, outcome| match outcome {
            Ok(lines) => Ok(shared.apply_lines(state, lines)),
            Err(e) => {
                warn!(target: "semparse::acquire", "Acquisition failed: {}", e);
                state.record_failure(&e);
                Err(e)
            }
        })
        .await
    }

    /// Validate parameters and cluster the collected lines.
    ///
    /// Parameters are stored only once clustering succeeds.
    pub async fn submit(&self, input: ClusterParamsInput) -> Result<SessionSnapshot> {
        let (ticket, working_set, params) = {
            let mut state = self.shared.state.write().await;
            state.ensure_idle()?;
            state.ensure_stage(SessionStage::Collected)?;

            let params = match input.validate() {
                Ok(params) => params,
                Err(e) => {
                    let err = SemparseError::from(e);
                    debug!(target: "semparse::session", "Rejected submit: {}", err);
                    state.record_failure(&err);
                    return Err(err);
                }
            };

            let Some(working_set) = state.working_set.clone() else {
                return Err(SemparseError::InvalidStage {
                    expected: SessionStage::Collected,
                    actual: state.stage(),
                });
            };
            (state.enter_busy(BusyOperation::Clustering), working_set, params)
        };

        let submitted = working_set.len();
        let builder = self.shared.builder.clone();
        let call = async move { builder.request(&working_set, params).await };

        self.run_detached(ticket, call, move |shared, state, outcome| match outcome {
            Ok(raw) => {
                let clusters = raw.relabel();
                info!(
                    target: "semparse::session",
                    "Clustered {} of {} lines into {} clusters",
                    clusters.line_count(),
                    submitted,
                    clusters.len()
                );
                state.params = params;
                state.clusters = Some(clusters);
                state.last_failure = None;
                Ok(shared.snapshot_of(state))
            }
            Err(e) => {
                warn!(target: "semparse::session", "Clustering failed: {}", e);
                state.record_failure(&e);
                Err(e)
            }
        })
        .await
    }

    /// Export the clustered result with the configured exporter.
    pub async fn export(&self) -> Result<()> {
        self.export_with(self.shared.exporter.clone()).await
    }

    /// Export the clustered result with a specific exporter.
    pub async fn export_with(&self, exporter: Arc<dyn Exporter>) -> Result<()> {
        let (ticket, clusters) = {
            let mut state = self.shared.state.write().await;
            state.ensure_idle()?;
            let Some(clusters) = state.clusters.clone() else {
                let actual = state.stage();
                error!(
                    target: "semparse::session",
                    "Export requested in {} stage; the front end must only offer export once clustered",
                    actual
                );
                return Err(SemparseError::InvalidStage {
                    expected: SessionStage::Clustered,
                    actual,
                });
            };
            (state.enter_busy(BusyOperation::Exporting), clusters)
        };

        let coordinator = ExportCoordinator::new(exporter);
        let call = async move { coordinator.export(&clusters).await };

        self.run_detached(ticket, call, |_, state, outcome| match outcome {
            Ok(()) => {
                state.last_failure = None;
                Ok(())
            }
            Err(e) => {
                state.record_failure(&e);
                Err(e)
            }
        })
        .await
    }

    /// Discard lines and results and return to `Empty`.
    pub async fn reset(&self) -> Result<SessionSnapshot> {
        let mut state = self.shared.state.write().await;
        state.ensure_idle()?;
        let previous = state.stage();
        state.clear(self.shared.config.default_params);
        info!(target: "semparse::session", "Session reset from {}", previous);
        Ok(self.shared.snapshot_of(&state))
    }

    /// Reset even while a boundary call is in flight.
    ///
    /// For clearing a hung operation. The abandoned call still runs to
    /// completion but its result is dropped.
    pub async fn abandon(&self) -> SessionSnapshot {
        let mut state = self.shared.state.write().await;
        if let Some(busy) = &state.busy {
            warn!(
                target: "semparse::session",
                "Abandoning {} started at {}",
                busy.operation,
                busy.since
            );
        }
        state.clear(self.shared.config.default_params);
        self.shared.snapshot_of(&state)
    }

    /// Run `call` on its own task, then settle `ticket` and hand the outcome
    /// to `apply` under the write lock.
    async fn run_detached<U, T, F, A>(&self, ticket: BusyTicket, call: F, apply: A) -> Result<T>
    where
        U: Send + 'static,
        T: Send + 'static,
        F: Future<Output = Result<U>> + Send + 'static,
        A: FnOnce(&Shared, &mut SessionState, Result<U>) -> Result<T> + Send + 'static,
    {
        let shared = self.shared.clone();
        let task = tokio::spawn(async move {
            let outcome = shared.bounded(ticket.operation, call).await;
            let mut state = shared.state.write().await;
            state.settle(ticket)?;
            apply(shared.as_ref(), &mut *state, outcome)
        });

        match task.await {
            Ok(result) => result,
            Err(e) => {
                error!(
                    target: "semparse::session",
                    "{} task failed: {}",
                    ticket.operation,
                    e
                );
                let err = SemparseError::Internal(format!("{} task failed: {}", ticket.operation, e));
                let mut state = self.shared.state.write().await;
                if state.settle(ticket).is_ok() {
                    state.record_failure(&err);
                }
                Err(err)
            }
        }
    }
}
