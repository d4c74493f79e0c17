//! Pipeline controller — the cancellable solve/debug workflow.
//!
//! One controller drives both pipelines over the queue the current mode
//! selects: intake mode runs extract → generate, review mode runs a
//! single debug pass over the follow-up shots. At most one run is
//! active per queue kind; starting another supersedes the old one
//! (cancel-and-replace, never queue-behind).
//!
//! Cancellation is cooperative: every run owns a token that is checked
//! before each provider call and again after each await, so a cancelled
//! run never starts a new remote call and never emits success or error
//! events past the cancellation point.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use crate::error::{PipelineError, StoreError};
use crate::events::{Notifier, PipelineEvent};
use crate::llm::types::{ProblemInfo, ProviderError, ShotPayload};
use crate::llm::SolverProvider;
use crate::queue::{Mode, QueueKind, QueueManager};

/// How a pipeline run ended.
///
/// An empty queue and a cancellation are ordinary outcomes, not errors.
#[derive(Debug)]
pub enum RunOutcome {
    Completed,
    EmptyQueue,
    Cancelled,
    Failed(PipelineError),
}

/// The active run for one queue kind. The generation counter keeps a
/// superseded run from clearing its successor's slot at terminal state.
struct RunSlot {
    seq: u64,
    token: CancellationToken,
}

pub struct PipelineController {
    queues: Arc<QueueManager>,
    provider: Arc<dyn SolverProvider>,
    notifier: Arc<dyn Notifier>,
    mode: Mutex<Mode>,
    language: Mutex<String>,
    problem: Mutex<Option<ProblemInfo>>,
    has_debugged: AtomicBool,
    run_seq: AtomicU64,
    solve_slot: Mutex<Option<RunSlot>>,
    debug_slot: Mutex<Option<RunSlot>>,
}

impl PipelineController {
    pub fn new(
        queues: Arc<QueueManager>,
        provider: Arc<dyn SolverProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            queues,
            provider,
            notifier,
            mode: Mutex::new(Mode::Intake),
            language: Mutex::new("python".to_string()),
            problem: Mutex::new(None),
            has_debugged: AtomicBool::new(false),
            run_seq: AtomicU64::new(1),
            solve_slot: Mutex::new(None),
            debug_slot: Mutex::new(None),
        }
    }

    pub fn mode(&self) -> Mode {
        *self.mode.lock().unwrap()
    }

    pub fn set_mode(&self, mode: Mode) {
        let mut current = self.mode.lock().unwrap();
        if *current != mode {
            log::info!("[PIPELINE] Mode {:?} -> {:?}", *current, mode);
            *current = mode;
        }
    }

    pub fn set_language(&self, language: impl Into<String>) {
        *self.language.lock().unwrap() = language.into();
    }

    /// The problem extracted by the last successful stage-1 call, if any.
    /// Retained even when the generation stage afterwards fails, so a
    /// retry can skip straight to generation input.
    pub fn problem(&self) -> Option<ProblemInfo> {
        self.problem.lock().unwrap().clone()
    }

    pub fn has_debugged(&self) -> bool {
        self.has_debugged.load(Ordering::Relaxed)
    }

    fn slot(&self, kind: QueueKind) -> &Mutex<Option<RunSlot>> {
        match kind {
            QueueKind::Intake => &self.solve_slot,
            QueueKind::Followup => &self.debug_slot,
        }
    }

    /// Install a fresh token for this queue kind, cancelling any run
    /// already in flight there. Supersede, don't queue.
    fn begin_run(&self, kind: QueueKind) -> (u64, CancellationToken) {
        let seq = self.run_seq.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let mut slot = self.slot(kind).lock().unwrap();
        if let Some(old) = slot.replace(RunSlot {
            seq,
            token: token.clone(),
        }) {
            log::info!("[PIPELINE] Run #{} supersedes #{} on {:?}", seq, old.seq, kind);
            old.token.cancel();
        }
        (seq, token)
    }

    /// Release the slot at terminal state, but only if this run still
    /// owns it (a superseding run may have replaced it already).
    fn finish_run(&self, kind: QueueKind, seq: u64) {
        let mut slot = self.slot(kind).lock().unwrap();
        if slot.as_ref().map(|s| s.seq) == Some(seq) {
            *slot = None;
        }
    }

    /// Process the queue the current mode selects.
    pub async fn run(&self) -> RunOutcome {
        let mode = self.mode();
        let kind = mode.target_queue();

        let shots = self.queues.list(kind);
        if shots.is_empty() {
            log::info!("[PIPELINE] {:?} queue empty — nothing to process", kind);
            self.notifier.notify(PipelineEvent::QueueEmpty);
            return RunOutcome::EmptyQueue;
        }

        if !self.provider.is_configured() {
            log::warn!("[PIPELINE] No provider configured — skipping run");
            self.notifier.notify(PipelineEvent::ProviderMissing);
            return RunOutcome::Failed(PipelineError::ProviderNotConfigured);
        }

        self.notifier.notify(match mode {
            Mode::Intake => PipelineEvent::SolveStart,
            Mode::Review => PipelineEvent::DebugStart,
        });

        let (seq, token) = self.begin_run(kind);
        log::info!(
            "[PIPELINE] Run #{} starting on {:?} ({} screenshot(s))",
            seq,
            kind,
            shots.len()
        );

        let outcome = match mode {
            Mode::Intake => self.run_solve(&shots, &token).await,
            Mode::Review => self.run_debug(&shots, &token).await,
        };

        self.finish_run(kind, seq);
        match &outcome {
            RunOutcome::Completed => log::info!("[PIPELINE] Run #{} completed", seq),
            RunOutcome::Cancelled => log::info!("[PIPELINE] Run #{} cancelled", seq),
            RunOutcome::Failed(e) => log::error!("[PIPELINE] Run #{} failed: {}", seq, e),
            RunOutcome::EmptyQueue => {}
        }
        outcome
    }

    /// Intake pipeline: extract the problem, then generate a solution.
    async fn run_solve(&self, shots: &[PathBuf], token: &CancellationToken) -> RunOutcome {
        let payloads = match self.load_payloads(shots) {
            Ok(p) => p,
            Err(e) => {
                self.notifier.notify(PipelineEvent::SolveFailed(e.to_string()));
                return RunOutcome::Failed(PipelineError::Read(e));
            }
        };

        if token.is_cancelled() {
            return RunOutcome::Cancelled;
        }
        let language = self.language.lock().unwrap().clone();
        let extracted = self.provider.extract_problem(&payloads, &language).await;
        if token.is_cancelled() {
            return RunOutcome::Cancelled;
        }

        let problem = match extracted {
            Ok(p) => p,
            Err(e) => {
                return self.fail_solve(e, |message| PipelineError::Extraction { message })
            }
        };
        *self.problem.lock().unwrap() = Some(problem.clone());
        self.notifier
            .notify(PipelineEvent::ProblemExtracted(problem.clone()));

        if token.is_cancelled() {
            return RunOutcome::Cancelled;
        }
        let solved = self.provider.generate_solutions(&problem).await;
        if token.is_cancelled() {
            return RunOutcome::Cancelled;
        }

        match solved {
            Ok(solution) => {
                // A fresh review session must not carry over stale
                // follow-up screenshots.
                self.queues.clear(QueueKind::Followup);
                self.notifier.notify(PipelineEvent::SolutionReady(solution));
                self.set_mode(Mode::Review);
                RunOutcome::Completed
            }
            // The extracted problem stays behind on purpose: a retry
            // can re-run generation without re-extracting.
            Err(e) => self.fail_solve(e, |message| PipelineError::Generation { message }),
        }
    }

    /// A solve-stage failure sends the user back to the intake view so
    /// they re-enter from a known state.
    fn fail_solve(
        &self,
        err: ProviderError,
        wrap: fn(String) -> PipelineError,
    ) -> RunOutcome {
        let error = match err {
            ProviderError::OutOfCredits { message } => {
                self.notifier
                    .notify(PipelineEvent::OutOfCredits(message.clone()));
                PipelineError::OutOfCredits { message }
            }
            ProviderError::Remote { message } => {
                self.notifier
                    .notify(PipelineEvent::SolveFailed(message.clone()));
                wrap(message)
            }
        };
        self.set_mode(Mode::Intake);
        RunOutcome::Failed(error)
    }

    /// Review pipeline: one debug pass over the follow-up shots.
    /// Failure here leaves the mode alone: the user stays on the
    /// review screen with their current solution.
    async fn run_debug(&self, shots: &[PathBuf], token: &CancellationToken) -> RunOutcome {
        let Some(problem) = self.problem() else {
            let error = PipelineError::MissingProblem;
            self.notifier
                .notify(PipelineEvent::DebugFailed(error.to_string()));
            return RunOutcome::Failed(error);
        };

        let payloads = match self.load_payloads(shots) {
            Ok(p) => p,
            Err(e) => {
                self.notifier.notify(PipelineEvent::DebugFailed(e.to_string()));
                return RunOutcome::Failed(PipelineError::Read(e));
            }
        };

        if token.is_cancelled() {
            return RunOutcome::Cancelled;
        }
        let result = self.provider.debug(&problem, &payloads).await;
        if token.is_cancelled() {
            return RunOutcome::Cancelled;
        }

        match result {
            Ok(report) => {
                self.has_debugged.store(true, Ordering::Relaxed);
                self.notifier.notify(PipelineEvent::DebugReady(report));
                RunOutcome::Completed
            }
            Err(ProviderError::OutOfCredits { message }) => {
                self.notifier
                    .notify(PipelineEvent::OutOfCredits(message.clone()));
                RunOutcome::Failed(PipelineError::OutOfCredits { message })
            }
            Err(ProviderError::Remote { message }) => {
                self.notifier
                    .notify(PipelineEvent::DebugFailed(message.clone()));
                RunOutcome::Failed(PipelineError::Debug { message })
            }
        }
    }

    /// Materialize every queued shot for the provider. One unreadable
    /// entry fails the whole run; partial batches are never sent.
    fn load_payloads(&self, shots: &[PathBuf]) -> Result<Vec<ShotPayload>, StoreError> {
        shots
            .iter()
            .map(|path| {
                let data = self.queues.read(path)?;
                Ok(ShotPayload {
                    path: path.clone(),
                    data,
                })
            })
            .collect()
    }

    /// Abort whatever is in flight on either queue kind. Idempotent;
    /// emits one reconciliation event only when a run was actually
    /// aborted so an idle cancel stays silent.
    pub fn cancel(&self) {
        let mut aborted = false;
        for kind in [QueueKind::Intake, QueueKind::Followup] {
            if let Some(run) = self.slot(kind).lock().unwrap().take() {
                log::info!("[PIPELINE] Aborting run #{} on {:?}", run.seq, kind);
                run.token.cancel();
                aborted = true;
            }
        }

        *self.problem.lock().unwrap() = None;
        self.has_debugged.store(false, Ordering::Relaxed);

        if aborted {
            self.notifier.notify(PipelineEvent::QueueEmpty);
        }
    }

    /// Full reset: abort runs, drop all screenshots, back to intake.
    pub fn reset(&self) {
        self.cancel();
        self.queues.clear_all();
        self.set_mode(Mode::Intake);
    }
}
