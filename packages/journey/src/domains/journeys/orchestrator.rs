//! Journey submission pipeline.
//!
//! ```text
//! submit_url(url)
//!     │  guard: rejected while busy
//!     ▼
//! Extract ──ok──► Create ──ok──► Initialize ──ok──► success + reset
//!    │               │  └─► mark_stale(cache_key)   (detached)
//!    ▼ err           ▼ err                │ err
//! error toast     error toast             ▼
//!                                     error toast (state kept)
//! ```
//!
//! Each stage runs in its own task. On success a stage raises the next stage's
//! in-flight flag in the same state update that clears its own, then launches
//! the next stage as a detached continuation. The busy signal therefore stays
//! up for the whole run and drops only when the run finishes.

use std::sync::Arc;

use tokio::sync::{oneshot, watch};
use tracing::{debug, info, warn};

use super::errors::{PipelineError, StageError};
use super::models::{CreateJourneyRequest, ExternalRecord, JourneyEntity, OwnerIdentity};
use super::state::{PipelineState, Stage, StageFlags};
use super::template::JourneyTemplate;
use crate::kernel::PipelineDeps;

/// Final result of one pipeline run.
#[derive(Debug)]
pub enum RunOutcome {
    /// All three stages succeeded.
    Completed { journey: JourneyEntity },
    /// A stage failed and the run halted there.
    Failed(StageError),
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }

    /// Stage that halted the run, if it failed.
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            RunOutcome::Completed { .. } => None,
            RunOutcome::Failed(err) => Some(err.stage()),
        }
    }
}

/// Receipt for an accepted submission.
///
/// Dropping it does not stop the run.
#[derive(Debug)]
pub struct RunHandle {
    outcome: oneshot::Receiver<RunOutcome>,
}

impl RunHandle {
    /// Wait for the run to finish.
    pub async fn outcome(self) -> Result<RunOutcome, PipelineError> {
        self.outcome.await.map_err(|_| PipelineError::RunAborted)
    }
}

struct PipelineInner {
    deps: PipelineDeps,
    template: JourneyTemplate,
    state: watch::Sender<PipelineState>,
}

/// Orchestrates extract → create → initialize for one dialog.
#[derive(Clone)]
pub struct JourneyPipeline {
    inner: Arc<PipelineInner>,
}

impl JourneyPipeline {
    pub fn new(deps: PipelineDeps) -> Self {
        Self::with_template(deps, JourneyTemplate::default())
    }

    pub fn with_template(deps: PipelineDeps, template: JourneyTemplate) -> Self {
        let (state, _) = watch::channel(PipelineState::default());
        Self {
            inner: Arc::new(PipelineInner {
                deps,
                template,
                state,
            }),
        }
    }

    pub fn template(&self) -> &JourneyTemplate {
        &self.inner.template
    }

    /// Open the dialog with an empty URL field.
    ///
    /// While a run is in flight only the visibility changes.
    pub fn open(&self) {
        self.inner.state.send_modify(|state| {
            if state.is_pending() {
                state.is_open = true;
            } else {
                *state = PipelineState::opened();
            }
        });
    }

    /// Update the URL field.
    ///
    /// Returns `false` and changes nothing while a run is in flight, so a
    /// failed run leaves the submitted URL in place.
    pub fn set_url(&self, url: impl Into<String>) -> bool {
        let url = url.into();
        let updated = self.inner.state.send_if_modified(|state| {
            if state.is_pending() {
                return false;
            }
            state.url = url;
            true
        });

        if !updated {
            debug!("URL edit ignored while pipeline is busy");
        }
        updated
    }

    /// Submit whatever is currently in the URL field.
    pub fn submit(&self) -> Result<RunHandle, PipelineError> {
        let url = self.inner.state.borrow().url.clone();
        self.submit_url(url)
    }

    /// Start a run for `url`.
    ///
    /// The URL is not validated here. Returns [`PipelineError::Busy`] without
    /// touching any state while another run is in flight. Must be called from
    /// within a tokio runtime.
    pub fn submit_url(&self, url: impl Into<String>) -> Result<RunHandle, PipelineError> {
        let url = url.into();

        let accepted = self.inner.state.send_if_modified(|state| {
            if state.is_pending() {
                return false;
            }
            state.url = url.clone();
            state.in_flight.set(Stage::Extract, true);
            true
        });

        if !accepted {
            warn!(url = %url, "Submission ignored, pipeline is busy");
            return Err(PipelineError::Busy);
        }

        let owner = self.inner.deps.identity.current_owner();
        let (report, outcome) = oneshot::channel();

        let run = Run {
            guard: InflightGuard {
                inner: self.inner.clone(),
                settled: false,
            },
            inner: self.inner.clone(),
            owner,
            report,
        };
        tokio::spawn(run.extract(url));

        Ok(RunHandle { outcome })
    }

    /// Clear the URL and close the dialog.
    ///
    /// Returns `false` and changes nothing while a run is in flight.
    pub fn cancel(&self) -> bool {
        let closed = self.inner.state.send_if_modified(|state| {
            if state.is_pending() {
                return false;
            }
            state.reset();
            true
        });

        if closed {
            self.inner.deps.surface.on_close();
        } else {
            debug!("Cancel ignored while pipeline is busy");
        }
        closed
    }

    /// True while any stage call is in flight.
    pub fn is_pending(&self) -> bool {
        self.inner.state.borrow().is_pending()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> PipelineState {
        self.inner.state.borrow().clone()
    }

    /// Observe every state transition.
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.inner.state.subscribe()
    }

    /// Resolve once no stage is in flight.
    pub async fn wait_idle(&self) {
        let mut rx = self.inner.state.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|state| !state.is_pending()).await;
    }
}

/// Guard that clears the in-flight flags of a run that never settled.
///
/// A run settles when it reports an outcome. If a collaborator panics, the
/// stage task unwinds and drops the guard unsettled, which releases the busy
/// signal so the dialog can be submitted or cancelled again.
struct InflightGuard {
    inner: Arc<PipelineInner>,
    settled: bool,
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        warn!("Journey pipeline run ended without an outcome, clearing busy state");
        self.inner
            .state
            .send_modify(|state| state.in_flight = StageFlags::default());
    }
}

/// State carried by one accepted submission across its stage tasks.
///
/// `guard` is declared first so it drops before `report`: a caller that sees
/// [`PipelineError::RunAborted`] also sees the busy signal already cleared.
struct Run {
    guard: InflightGuard,
    inner: Arc<PipelineInner>,
    /// Captured at submission time.
    owner: Option<OwnerIdentity>,
    report: oneshot::Sender<RunOutcome>,
}

impl Run {
    async fn extract(self, url: String) {
        info!(url = %url, "Extracting journey source");

        let result = self.inner.deps.extractor.extract(&url).await;
        match result {
            Ok(record) => {
                info!(url = %url, title = %record.title, "Extraction succeeded");
                self.hand_off(Stage::Extract);
                tokio::spawn(self.create(record));
            }
            Err(e) => self.fail(StageError::Extraction(e)),
        }
    }

    async fn create(self, record: ExternalRecord) {
        let Some(owner) = self.owner.clone() else {
            return self.fail(StageError::OwnerUnavailable);
        };

        let request =
            CreateJourneyRequest::from_record(&record, &self.inner.template.description, &owner);
        info!(name = %request.name, owner = %owner, "Creating journey");

        let result = self.inner.deps.creator.create(request).await;
        match result {
            Ok(journey) => {
                info!(journey_id = %journey.id, "Journey created");
                self.hand_off(Stage::Create);
                self.invalidate_journeys();
                tokio::spawn(self.initialize(journey, record));
            }
            Err(e) => self.fail(StageError::Creation(e)),
        }
    }

    async fn initialize(mut self, journey: JourneyEntity, record: ExternalRecord) {
        info!(journey_id = %journey.id, "Initializing journey");

        let result = self
            .inner
            .deps
            .initializer
            .initialize(&journey.id, &record)
            .await;
        if let Err(e) = result {
            // The journey already exists; no compensating delete is issued.
            return self.fail(StageError::Initialization(e));
        }

        info!(journey_id = %journey.id, "Journey initialized");
        self.inner
            .deps
            .notifier
            .success(&self.inner.template.success_message);

        self.inner.state.send_modify(|state| {
            state.in_flight.set(Stage::Initialize, false);
            state.reset();
        });
        self.guard.settled = true;
        self.inner.deps.surface.on_close();

        let _ = self.report.send(RunOutcome::Completed { journey });
    }

    /// Move the in-flight flag from `from` to the following stage.
    fn hand_off(&self, from: Stage) {
        if let Some(next) = from.next() {
            self.inner.state.send_modify(|state| {
                state.in_flight.set(from, false);
                state.in_flight.set(next, true);
            });
        }
    }

    /// Mark "my journeys" stale in a detached task. The result is not observed.
    fn invalidate_journeys(&self) {
        let cache = self.inner.deps.cache.clone();
        let key = self.inner.template.cache_key.clone();
        tokio::spawn(async move {
            if let Err(e) = cache.mark_stale(&key).await {
                debug!(key = %key, error = %e, "Cache invalidation failed");
            }
        });
    }

    fn fail(mut self, error: StageError) {
        let stage = error.stage();
        warn!(stage = %stage, error = %error, "Journey pipeline stage failed");

        self.inner
            .deps
            .notifier
            .error(error.user_message(&self.inner.template));
        self.inner
            .state
            .send_modify(|state| state.in_flight.set(stage, false));
        self.guard.settled = true;

        let _ = self.report.send(RunOutcome::Failed(error));
    }
}
