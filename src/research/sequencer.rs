//! Phase sequencer.
//!
//! Executes a [`PhaseScript`] for one run, publishing a snapshot after every
//! step. Every pause races the run's [`CancellationToken`], and every publish
//! goes through a callback that may refuse it once the run is superseded.
//! Either signal stops the run without further publishes.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::script::{render_status, reveal_progress, PhaseScript, ScriptStep};
use super::synthesizer::ResearchSynthesizer;
use super::types::{ResearchPhase, ResearchState};
use crate::error::SynthesisError;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Reached `Complete`; the state carries the report.
    Completed(ResearchState),
    /// Synthesis failed or the run task panicked; the state is in the
    /// `Failed` phase.
    Failed(ResearchState),
    /// Superseded or reset before finishing.
    Cancelled,
}

impl RunOutcome {
    /// Final state, unless the run was cancelled
    pub fn state(&self) -> Option<&ResearchState> {
        match self {
            RunOutcome::Completed(state) | RunOutcome::Failed(state) => Some(state),
            RunOutcome::Cancelled => None,
        }
    }

    /// Whether the run reached `Complete`
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed(_))
    }
}

/// A single research run, ready to execute.
pub struct ResearchRun {
    state: ResearchState,
    script: Arc<PhaseScript>,
    synthesizer: Arc<dyn ResearchSynthesizer>,
    rng: StdRng,
    cancel: CancellationToken,
}

impl ResearchRun {
    /// Create a run. The topic is used as given; validation is the caller's job.
    pub fn new(
        run_id: u64,
        topic: impl Into<String>,
        script: Arc<PhaseScript>,
        synthesizer: Arc<dyn ResearchSynthesizer>,
        rng: StdRng,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            state: ResearchState::new(run_id, topic),
            script,
            synthesizer,
            rng,
            cancel,
        }
    }

    /// Run identity
    pub fn run_id(&self) -> u64 {
        self.state.run_id
    }

    /// Execute the script to completion, failure or cancellation.
    ///
    /// `publish` receives every snapshot and returns `false` when the run no
    /// longer owns the shared state.
    pub async fn execute<P>(mut self, mut publish: P) -> RunOutcome
    where
        P: FnMut(&ResearchState) -> bool + Send,
    {
        let script = Arc::clone(&self.script);
        info!(run_id = self.state.run_id, topic = %self.state.topic, "Research run started");

        for step in script.steps() {
            match step {
                ScriptStep::Announce {
                    phase,
                    progress,
                    status,
                    pause,
                } => {
                    let status =
                        render_status(status, &self.state.topic, self.state.sources.len());
                    self.advance(*phase, *progress, status);
                    if !self.emit(&mut publish) || !self.pause(*pause).await {
                        return self.cancelled();
                    }
                }
                ScriptStep::DiscoverSources {
                    progress_from,
                    progress_to,
                    pause_per_source,
                } => {
                    let batch = match self
                        .synthesizer
                        .discover_sources(&self.state.topic, &mut self.rng)
                    {
                        Ok(batch) => batch,
                        Err(e) => return self.fail(e, &mut publish),
                    };

                    let total = batch.len();
                    debug!(run_id = self.state.run_id, total, "Revealing sources");

                    for (index, source) in batch.into_iter().enumerate() {
                        let status =
                            format!("Found source {}/{}: {}", index + 1, total, source.title);
                        self.state.sources.push(source);
                        self.advance(
                            ResearchPhase::Searching,
                            reveal_progress(*progress_from, *progress_to, index, total),
                            status,
                        );
                        if !self.emit(&mut publish) || !self.pause(*pause_per_source).await {
                            return self.cancelled();
                        }
                    }
                }
                ScriptStep::Complete { status } => {
                    let report = match self
                        .synthesizer
                        .compile_report(&self.state.topic, &self.state.sources)
                    {
                        Ok(report) => report,
                        Err(e) => return self.fail(e, &mut publish),
                    };

                    let status =
                        render_status(status, &self.state.topic, self.state.sources.len());
                    self.advance(ResearchPhase::Complete, 100, status);
                    self.state.report = Some(report);
                    if !self.emit(&mut publish) {
                        return self.cancelled();
                    }

                    info!(
                        run_id = self.state.run_id,
                        sources = self.state.sources.len(),
                        "Research run complete"
                    );
                    return RunOutcome::Completed(self.state);
                }
            }
        }

        self.fail(
            SynthesisError::Report {
                message: "script ended before the report was compiled".to_string(),
            },
            &mut publish,
        )
    }

    fn advance(&mut self, phase: ResearchPhase, progress: u8, status: String) {
        debug_assert!(
            phase.ordinal() >= self.state.phase.ordinal(),
            "phase moved backwards: {} -> {}",
            self.state.phase,
            phase
        );
        self.state.phase = phase;
        self.state.progress = self.state.progress.max(progress.min(100));
        self.state.status = status;
    }

    fn emit<P>(&self, publish: &mut P) -> bool
    where
        P: FnMut(&ResearchState) -> bool,
    {
        if self.cancel.is_cancelled() {
            return false;
        }
        debug!(
            run_id = self.state.run_id,
            phase = %self.state.phase,
            progress = self.state.progress,
            status = %self.state.status,
            "Publishing research state"
        );
        publish(&self.state)
    }

    /// Sleep unless cancelled first. Returns `false` on cancellation.
    async fn pause(&self, duration: Duration) -> bool {
        if duration.is_zero() {
            return !self.cancel.is_cancelled();
        }
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }

    fn fail<P>(mut self, error: SynthesisError, publish: &mut P) -> RunOutcome
    where
        P: FnMut(&ResearchState) -> bool,
    {
        let message = error.to_string();
        warn!(run_id = self.state.run_id, error = %message, "Research run failed");

        self.state.mark_failed(message);

        if self.emit(publish) {
            RunOutcome::Failed(self.state)
        } else {
            self.cancelled()
        }
    }

    fn cancelled(self) -> RunOutcome {
        debug!(run_id = self.state.run_id, phase = %self.state.phase, "Research run superseded");
        RunOutcome::Cancelled
    }
}
