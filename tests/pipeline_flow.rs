//! End-to-end pipeline scenarios over stub collaborators.
//!
//! A stub capture provider produces unique fake PNGs, a stub solver
//! answers with canned results (optionally slowly or with errors), and
//! a recording notifier captures every lifecycle event so tests can
//! assert exactly what the UI would have seen.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use snapsolve::capture::{CaptureProvider, CaptureRegion};
use snapsolve::llm::types::{DebugReport, ProblemInfo, ProviderError, ShotPayload, Solution};
use snapsolve::llm::SolverProvider;
use snapsolve::{
    CaptureError, Mode, Notifier, PipelineController, PipelineError, PipelineEvent, QueueKind,
    QueueManager, RunOutcome, ShotStore,
};

// ── Stub collaborators ─────────────────────────────────────────────

#[derive(Default)]
struct StubCapture {
    next: AtomicUsize,
}

impl CaptureProvider for StubCapture {
    fn grab(&self, _region: Option<CaptureRegion>) -> Result<Vec<u8>, CaptureError> {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        Ok(vec![0x89, b'P', b'N', b'G', n as u8])
    }
}

#[derive(Default)]
struct StubSolver {
    configured: bool,
    extract_delay: Duration,
    extract_error: Option<ProviderError>,
    generate_error: Option<ProviderError>,
    debug_error: Option<ProviderError>,
    extract_calls: AtomicUsize,
    generate_calls: AtomicUsize,
    debug_calls: AtomicUsize,
}

impl StubSolver {
    fn ok() -> Self {
        Self {
            configured: true,
            ..Self::default()
        }
    }
}

fn stub_problem() -> ProblemInfo {
    ProblemInfo {
        problem_statement: "Sum the array".to_string(),
        constraints: vec!["n <= 10^5".to_string()],
        example_input: Some("3\n1 2 3".to_string()),
        example_output: Some("6".to_string()),
        language: Some("python".to_string()),
    }
}

fn stub_solution() -> Solution {
    Solution {
        code: "print(sum(map(int, input().split())))".to_string(),
        thoughts: vec!["single pass".to_string()],
        time_complexity: Some("O(n)".to_string()),
        space_complexity: Some("O(1)".to_string()),
    }
}

fn stub_report() -> DebugReport {
    DebugReport {
        new_code: "print(sum(map(int, input().split()[1:])))".to_string(),
        thoughts: vec!["first token is the count, skip it".to_string()],
        time_complexity: None,
        space_complexity: None,
    }
}

#[async_trait]
impl SolverProvider for StubSolver {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn extract_problem(
        &self,
        _shots: &[ShotPayload],
        _language: &str,
    ) -> Result<ProblemInfo, ProviderError> {
        self.extract_calls.fetch_add(1, Ordering::Relaxed);
        if !self.extract_delay.is_zero() {
            tokio::time::sleep(self.extract_delay).await;
        }
        match &self.extract_error {
            Some(e) => Err(e.clone()),
            None => Ok(stub_problem()),
        }
    }

    async fn generate_solutions(
        &self,
        _problem: &ProblemInfo,
    ) -> Result<Solution, ProviderError> {
        self.generate_calls.fetch_add(1, Ordering::Relaxed);
        match &self.generate_error {
            Some(e) => Err(e.clone()),
            None => Ok(stub_solution()),
        }
    }

    async fn debug(
        &self,
        _problem: &ProblemInfo,
        _shots: &[ShotPayload],
    ) -> Result<DebugReport, ProviderError> {
        self.debug_calls.fetch_add(1, Ordering::Relaxed);
        match &self.debug_error {
            Some(e) => Err(e.clone()),
            None => Ok(stub_report()),
        }
    }
}

#[derive(Default)]
struct RecordingNotifier {
    events: Mutex<Vec<PipelineEvent>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: PipelineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl RecordingNotifier {
    fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().unwrap().clone()
    }

    fn count(&self, pred: impl Fn(&PipelineEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }
}

// ── Harness ────────────────────────────────────────────────────────

struct Rig {
    queues: Arc<QueueManager>,
    controller: Arc<PipelineController>,
    notifier: Arc<RecordingNotifier>,
    solver: Arc<StubSolver>,
}

fn rig(tag: &str, solver: StubSolver) -> Rig {
    let dir = std::env::temp_dir().join(format!("snapsolve-flow-{}", tag));
    let _ = std::fs::remove_dir_all(&dir);
    let store = ShotStore::new(dir).unwrap();
    let queues = Arc::new(QueueManager::with_capacity(
        Arc::new(StubCapture::default()),
        store,
        2,
    ));
    let notifier = Arc::new(RecordingNotifier::default());
    let solver = Arc::new(solver);
    let controller = Arc::new(PipelineController::new(
        Arc::clone(&queues),
        Arc::clone(&solver) as Arc<dyn SolverProvider>,
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    ));
    Rig {
        queues,
        controller,
        notifier,
        solver,
    }
}

impl Rig {
    async fn snap(&self, mode: Mode) -> PathBuf {
        self.queues.capture(mode).await.unwrap()
    }
}

// ── Scenarios ──────────────────────────────────────────────────────

#[tokio::test]
async fn solve_happy_path_switches_mode_and_clears_followups() {
    let rig = rig("solve-ok", StubSolver::ok());

    // Three intake captures into a capacity-2 queue: only the last two stay.
    rig.snap(Mode::Intake).await;
    let b = rig.snap(Mode::Intake).await;
    let c = rig.snap(Mode::Intake).await;
    assert_eq!(rig.queues.list(QueueKind::Intake), vec![b, c]);

    // A stale follow-up shot from an earlier session.
    rig.snap(Mode::Review).await;
    assert_eq!(rig.queues.list(QueueKind::Followup).len(), 1);

    let outcome = rig.controller.run().await;
    assert!(matches!(outcome, RunOutcome::Completed));

    assert_eq!(rig.controller.mode(), Mode::Review);
    assert!(rig.queues.list(QueueKind::Followup).is_empty());
    assert_eq!(
        rig.notifier
            .count(|e| matches!(e, PipelineEvent::SolutionReady(_))),
        1
    );
    assert_eq!(
        rig.notifier.events()[..2],
        [
            PipelineEvent::SolveStart,
            PipelineEvent::ProblemExtracted(stub_problem())
        ]
    );
}

#[tokio::test]
async fn generation_failure_keeps_problem_and_resets_mode() {
    let mut solver = StubSolver::ok();
    solver.generate_error = Some(ProviderError::remote("rate limited"));
    let rig = rig("gen-fail", solver);

    rig.snap(Mode::Intake).await;
    let outcome = rig.controller.run().await;

    assert!(matches!(
        outcome,
        RunOutcome::Failed(PipelineError::Generation { .. })
    ));
    // Extraction survived the failed run: a retry skips re-extracting.
    assert_eq!(rig.controller.problem(), Some(stub_problem()));
    assert_eq!(rig.controller.mode(), Mode::Intake);
    assert_eq!(
        rig.notifier
            .count(|e| *e == PipelineEvent::SolveFailed("rate limited".to_string())),
        1
    );
    assert_eq!(
        rig.notifier
            .count(|e| matches!(e, PipelineEvent::SolutionReady(_))),
        0
    );
}

#[tokio::test]
async fn extraction_failure_resets_mode_without_problem() {
    let mut solver = StubSolver::ok();
    solver.extract_error = Some(ProviderError::remote("blurry screenshot"));
    let rig = rig("extract-fail", solver);

    rig.snap(Mode::Intake).await;
    let outcome = rig.controller.run().await;

    assert!(matches!(
        outcome,
        RunOutcome::Failed(PipelineError::Extraction { .. })
    ));
    assert!(rig.controller.problem().is_none());
    assert_eq!(rig.solver.generate_calls.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn empty_queue_run_emits_one_event_and_no_remote_calls() {
    let rig = rig("empty", StubSolver::ok());

    let outcome = rig.controller.run().await;

    assert!(matches!(outcome, RunOutcome::EmptyQueue));
    assert_eq!(rig.notifier.events(), vec![PipelineEvent::QueueEmpty]);
    assert_eq!(rig.solver.extract_calls.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn unconfigured_provider_short_circuits_before_any_call() {
    let rig = rig("unconfigured", StubSolver::default());

    rig.snap(Mode::Intake).await;
    let outcome = rig.controller.run().await;

    assert!(matches!(
        outcome,
        RunOutcome::Failed(PipelineError::ProviderNotConfigured)
    ));
    assert_eq!(rig.notifier.events(), vec![PipelineEvent::ProviderMissing]);
    assert_eq!(rig.solver.extract_calls.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn debug_without_extraction_fails_with_no_remote_calls() {
    let rig = rig("debug-nocontext", StubSolver::ok());

    rig.controller.set_mode(Mode::Review);
    rig.snap(Mode::Review).await;
    let outcome = rig.controller.run().await;

    assert!(matches!(
        outcome,
        RunOutcome::Failed(PipelineError::MissingProblem)
    ));
    assert_eq!(rig.solver.debug_calls.load(Ordering::Relaxed), 0);
    assert_eq!(
        rig.notifier
            .count(|e| matches!(e, PipelineEvent::DebugFailed(_))),
        1
    );
}

#[tokio::test]
async fn debug_happy_path_sets_flag_and_keeps_mode() {
    let rig = rig("debug-ok", StubSolver::ok());

    // Solve first so a problem is on file, then debug a follow-up shot.
    rig.snap(Mode::Intake).await;
    assert!(matches!(rig.controller.run().await, RunOutcome::Completed));
    assert_eq!(rig.controller.mode(), Mode::Review);

    rig.snap(Mode::Review).await;
    let outcome = rig.controller.run().await;

    assert!(matches!(outcome, RunOutcome::Completed));
    assert!(rig.controller.has_debugged());
    assert_eq!(rig.controller.mode(), Mode::Review);
    assert_eq!(
        rig.notifier
            .count(|e| matches!(e, PipelineEvent::DebugReady(_))),
        1
    );
}

#[tokio::test]
async fn debug_failure_leaves_mode_untouched() {
    let mut solver = StubSolver::ok();
    solver.debug_error = Some(ProviderError::remote("no defect visible"));
    let rig = rig("debug-fail", solver);

    rig.snap(Mode::Intake).await;
    assert!(matches!(rig.controller.run().await, RunOutcome::Completed));

    rig.snap(Mode::Review).await;
    let outcome = rig.controller.run().await;

    assert!(matches!(
        outcome,
        RunOutcome::Failed(PipelineError::Debug { .. })
    ));
    // Unlike the solve pipeline, a debug failure does not kick the user
    // back to intake.
    assert_eq!(rig.controller.mode(), Mode::Review);
}

#[tokio::test]
async fn cancel_mid_extraction_suppresses_all_run_events() {
    let mut solver = StubSolver::ok();
    solver.extract_delay = Duration::from_millis(300);
    let rig = rig("cancel-midflight", solver);

    rig.snap(Mode::Intake).await;
    let controller = Arc::clone(&rig.controller);
    let handle = tokio::spawn(async move { controller.run().await });

    // Let the run reach the provider call, then pull the plug.
    tokio::time::sleep(Duration::from_millis(50)).await;
    rig.controller.cancel();

    let outcome = handle.await.unwrap();
    assert!(matches!(outcome, RunOutcome::Cancelled));

    // The provider call did resolve afterwards, but nothing leaked out:
    // just the start event and the single reconciliation signal.
    assert_eq!(rig.solver.extract_calls.load(Ordering::Relaxed), 1);
    assert_eq!(
        rig.notifier.events(),
        vec![PipelineEvent::SolveStart, PipelineEvent::QueueEmpty]
    );
    assert!(rig.controller.problem().is_none());
}

#[tokio::test]
async fn cancel_when_idle_is_silent_and_idempotent() {
    let rig = rig("cancel-idle", StubSolver::ok());

    rig.controller.cancel();
    rig.controller.cancel();

    assert!(rig.notifier.events().is_empty());
}

#[tokio::test]
async fn new_run_supersedes_inflight_run_silently() {
    let mut solver = StubSolver::ok();
    solver.extract_delay = Duration::from_millis(300);
    let rig = rig("supersede", solver);

    rig.snap(Mode::Intake).await;

    let first = {
        let controller = Arc::clone(&rig.controller);
        tokio::spawn(async move { controller.run().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    let second = {
        let controller = Arc::clone(&rig.controller);
        tokio::spawn(async move { controller.run().await })
    };

    let first_outcome = first.await.unwrap();
    let second_outcome = second.await.unwrap();

    assert!(matches!(first_outcome, RunOutcome::Cancelled));
    assert!(matches!(second_outcome, RunOutcome::Completed));

    // Only the second run's results reached the notifier.
    assert_eq!(
        rig.notifier
            .count(|e| matches!(e, PipelineEvent::ProblemExtracted(_))),
        1
    );
    assert_eq!(
        rig.notifier
            .count(|e| matches!(e, PipelineEvent::SolutionReady(_))),
        1
    );
    assert_eq!(
        rig.notifier.count(|e| matches!(e, PipelineEvent::SolveStart)),
        2
    );
}

#[tokio::test]
async fn unreadable_shot_fails_the_whole_run() {
    let rig = rig("unreadable", StubSolver::ok());

    let shot = rig.snap(Mode::Intake).await;
    // Pull the file out from under the queue.
    std::fs::remove_file(&shot).unwrap();

    let outcome = rig.controller.run().await;

    assert!(matches!(outcome, RunOutcome::Failed(PipelineError::Read(_))));
    assert_eq!(rig.solver.extract_calls.load(Ordering::Relaxed), 0);
    assert_eq!(
        rig.notifier
            .count(|e| matches!(e, PipelineEvent::SolveFailed(_))),
        1
    );
}

#[tokio::test]
async fn out_of_credits_is_forwarded_untouched() {
    let mut solver = StubSolver::ok();
    solver.extract_error = Some(ProviderError::OutOfCredits {
        message: "Your credit balance is too low".to_string(),
    });
    let rig = rig("credits", solver);

    rig.snap(Mode::Intake).await;
    let outcome = rig.controller.run().await;

    assert!(matches!(
        outcome,
        RunOutcome::Failed(PipelineError::OutOfCredits { .. })
    ));
    assert_eq!(
        rig.notifier
            .count(|e| *e
                == PipelineEvent::OutOfCredits("Your credit balance is too low".to_string())),
        1
    );
    assert_eq!(
        rig.notifier
            .count(|e| matches!(e, PipelineEvent::SolveFailed(_))),
        0
    );
}

#[tokio::test]
async fn reset_returns_everything_to_a_blank_intake_state() {
    let rig = rig("reset", StubSolver::ok());

    rig.snap(Mode::Intake).await;
    assert!(matches!(rig.controller.run().await, RunOutcome::Completed));
    rig.snap(Mode::Review).await;

    rig.controller.reset();

    assert_eq!(rig.controller.mode(), Mode::Intake);
    assert!(rig.controller.problem().is_none());
    assert!(!rig.controller.has_debugged());
    assert!(rig.queues.list(QueueKind::Intake).is_empty());
    assert!(rig.queues.list(QueueKind::Followup).is_empty());
}
