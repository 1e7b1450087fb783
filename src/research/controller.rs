//! Run controller owning the single current research state.
//!
//! Only one run is live at a time. Starting a run cancels the previous run's
//! token and installs a fresh state tagged with the new run id. Snapshots are
//! accepted only while their run id matches the current state, so a stale
//! timer can never overwrite a newer run.
//!
//! Each run executes on its own task under a supervisor task. If the run
//! task panics, the supervisor publishes the `Failed` snapshot for it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::script::PhaseScript;
use super::sequencer::{ResearchRun, RunOutcome};
use super::synthesizer::{ResearchSynthesizer, TemplateSynthesizer};
use super::types::ResearchState;
use crate::config::Config;
use crate::error::{ResearchError, ResearchResult};

type EventSink = Arc<Mutex<Option<mpsc::UnboundedSender<ResearchState>>>>;

/// Writes snapshots into the shared state, guarded by run id.
#[derive(Clone)]
struct StatePublisher {
    state_tx: Arc<watch::Sender<Option<ResearchState>>>,
    events: EventSink,
}

impl StatePublisher {
    /// Accept `snapshot` only if its run still owns the current state.
    fn publish(&self, snapshot: &ResearchState) -> bool {
        self.state_tx.send_if_modified(|current| match current {
            Some(state) if state.run_id == snapshot.run_id => {
                forward_event(&self.events, snapshot);
                *state = snapshot.clone();
                true
            }
            _ => false,
        })
    }

    /// Move the current state of `run_id` to `Failed`.
    ///
    /// Returns the failed snapshot, or `None` if the run no longer owns the
    /// state or has already finished.
    fn publish_failure(&self, run_id: u64, message: &str) -> Option<ResearchState> {
        let mut failed = None;
        self.state_tx.send_if_modified(|current| match current {
            Some(state) if state.run_id == run_id && !state.is_finished() => {
                state.mark_failed(message);
                forward_event(&self.events, state);
                failed = Some(state.clone());
                true
            }
            _ => false,
        });
        failed
    }
}

/// Handle to a spawned run.
#[derive(Debug)]
pub struct RunHandle {
    run_id: u64,
    join: JoinHandle<RunOutcome>,
}

impl RunHandle {
    /// Identity of the run
    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    /// Wait for the run to finish.
    pub async fn wait(self) -> ResearchResult<RunOutcome> {
        let run_id = self.run_id;
        self.join.await.map_err(|e| {
            warn!(run_id, error = %e, "Research task aborted");
            ResearchError::RunAborted { run_id }
        })
    }
}

struct ActiveRun {
    run_id: u64,
    cancel: CancellationToken,
}

/// Starts, supersedes and resets research runs.
///
/// Must be used from within a tokio runtime; runs are spawned as tasks.
pub struct ResearchController {
    seed: Option<u64>,
    script: Arc<PhaseScript>,
    synthesizer: Arc<dyn ResearchSynthesizer>,
    state_tx: Arc<watch::Sender<Option<ResearchState>>>,
    events: EventSink,
    active: Mutex<Option<ActiveRun>>,
    next_run_id: AtomicU64,
}

impl ResearchController {
    /// Create a controller with the standard script and template synthesizer
    pub fn new(config: &Config) -> Self {
        let (state_tx, _) = watch::channel(None);
        Self {
            seed: config.research.seed,
            script: Arc::new(PhaseScript::standard()),
            synthesizer: Arc::new(TemplateSynthesizer::new()),
            state_tx: Arc::new(state_tx),
            events: Arc::new(Mutex::new(None)),
            active: Mutex::new(None),
            next_run_id: AtomicU64::new(1),
        }
    }

    /// Replace the step script
    pub fn with_script(mut self, script: PhaseScript) -> Self {
        self.script = Arc::new(script);
        self
    }

    /// Replace the content synthesizer
    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn ResearchSynthesizer>) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    /// Start a run for `topic`, superseding any run in flight.
    ///
    /// The topic is trimmed; an empty topic is rejected and the current state
    /// is left untouched.
    pub fn start_research(&self, topic: &str) -> ResearchResult<RunHandle> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(ResearchError::EmptyTopic);
        }

        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = active.take() {
            info!(run_id = previous.run_id, "Superseding in-flight research run");
            previous.cancel.cancel();
        }

        let run_id = self.next_run_id.fetch_add(1, Ordering::SeqCst);
        let cancel = CancellationToken::new();

        let mut initial = ResearchState::new(run_id, topic);
        initial.status = format!("Starting research on \"{}\"...", topic);
        self.state_tx.send_modify(|current| {
            forward_event(&self.events, &initial);
            *current = Some(initial);
        });

        *active = Some(ActiveRun {
            run_id,
            cancel: cancel.clone(),
        });
        drop(active);

        let run = ResearchRun::new(
            run_id,
            topic,
            Arc::clone(&self.script),
            Arc::clone(&self.synthesizer),
            self.rng_for(run_id),
            cancel,
        );

        let publisher = StatePublisher {
            state_tx: Arc::clone(&self.state_tx),
            events: Arc::clone(&self.events),
        };
        let run_publisher = publisher.clone();
        let worker = tokio::spawn(
            run.execute(move |snapshot: &ResearchState| run_publisher.publish(snapshot)),
        );
        let join = tokio::spawn(supervise(run_id, worker, publisher));

        info!(run_id, topic = %topic, "Research run scheduled");
        Ok(RunHandle { run_id, join })
    }

    /// Abandon the current run and return to idle.
    pub fn reset(&self) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = active.take() {
            previous.cancel.cancel();
            info!(run_id = previous.run_id, "Research reset");
        }
        self.state_tx.send_replace(None);
    }

    /// Current state; `None` while idle.
    pub fn current(&self) -> Option<ResearchState> {
        self.state_tx.borrow().clone()
    }

    /// Id of the run that owns the current state, if any.
    pub fn active_run_id(&self) -> Option<u64> {
        self.state_tx.borrow().as_ref().map(|state| state.run_id)
    }

    /// Latest-value view of the state for any number of readers.
    pub fn subscribe(&self) -> watch::Receiver<Option<ResearchState>> {
        self.state_tx.subscribe()
    }

    /// Stream of every accepted snapshot, in publish order.
    ///
    /// There is a single event subscriber; calling this again replaces it.
    pub fn take_events(&self) -> mpsc::UnboundedReceiver<ResearchState> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.events.lock().unwrap_or_else(PoisonError::into_inner) = Some(tx);
        rx
    }

    /// RNG for a run. With a base seed, run `n` uses `seed + n - 1`.
    fn rng_for(&self, run_id: u64) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(run_id - 1)),
            None => StdRng::from_entropy(),
        }
    }
}

impl Drop for ResearchController {
    fn drop(&mut self) {
        let active = self.active.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(run) = active.take() {
            run.cancel.cancel();
        }
    }
}

/// Await the run task and turn a panic or abort into a `Failed` state.
async fn supervise(
    run_id: u64,
    worker: JoinHandle<RunOutcome>,
    publisher: StatePublisher,
) -> RunOutcome {
    let join_error = match worker.await {
        Ok(outcome) => return outcome,
        Err(e) => e,
    };

    let message = task_failure_message(join_error);
    error!(run_id, error = %message, "Research run task died");
    match publisher.publish_failure(run_id, &message) {
        Some(state) => RunOutcome::Failed(state),
        None => RunOutcome::Cancelled,
    }
}

fn task_failure_message(join_error: JoinError) -> String {
    if !join_error.is_panic() {
        return "research task was aborted".to_string();
    }
    let payload = join_error.into_panic();
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("research task panicked: {}", detail)
}

fn forward_event(events: &EventSink, snapshot: &ResearchState) {
    let mut sink = events.lock().unwrap_or_else(PoisonError::into_inner);
    let receiver_gone = match sink.as_ref() {
        Some(tx) => tx.send(snapshot.clone()).is_err(),
        None => false,
    };
    if receiver_gone {
        *sink = None;
    }
}
