//! Fixed step script for a research run.
//!
//! A run is an explicit list of steps executed in order by the sequencer.
//! Status templates may contain `{topic}` and `{count}` placeholders, which are
//! filled at publish time.

use std::time::Duration;

use super::types::ResearchPhase;

/// One step of the script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    /// Publish `(phase, progress, status)` then pause.
    Announce {
        phase: ResearchPhase,
        progress: u8,
        status: &'static str,
        pause: Duration,
    },
    /// Generate the source batch, then reveal it one source per pause with
    /// progress interpolated from `progress_from` to `progress_to`.
    DiscoverSources {
        progress_from: u8,
        progress_to: u8,
        pause_per_source: Duration,
    },
    /// Compile the report and publish the terminal snapshot.
    Complete { status: &'static str },
}

/// Ordered list of steps making up a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseScript {
    steps: Vec<ScriptStep>,
}

impl PhaseScript {
    /// Script from explicit steps
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self { steps }
    }

    /// The standard research script.
    pub fn standard() -> Self {
        use ResearchPhase::*;

        Self::new(vec![
            ScriptStep::Announce {
                phase: Initializing,
                progress: 5,
                status: "Initializing AI research agent...",
                pause: Duration::from_millis(1500),
            },
            ScriptStep::Announce {
                phase: Searching,
                progress: 15,
                status: "Searching academic databases and technical resources...",
                pause: Duration::from_millis(2000),
            },
            ScriptStep::DiscoverSources {
                progress_from: 20,
                progress_to: 50,
                pause_per_source: Duration::from_millis(800),
            },
            ScriptStep::Announce {
                phase: Analyzing,
                progress: 55,
                status: "Analyzing source credibility and relevance...",
                pause: Duration::from_millis(2000),
            },
            ScriptStep::Announce {
                phase: Analyzing,
                progress: 65,
                status: "Extracting key insights and patterns...",
                pause: Duration::from_millis(1500),
            },
            ScriptStep::Announce {
                phase: Synthesizing,
                progress: 75,
                status: "Synthesizing information across sources...",
                pause: Duration::from_millis(2000),
            },
            ScriptStep::Announce {
                phase: Synthesizing,
                progress: 85,
                status: "Generating executive summary...",
                pause: Duration::from_millis(1500),
            },
            ScriptStep::Announce {
                phase: Generating,
                progress: 90,
                status: "Formatting final report...",
                pause: Duration::from_millis(1500),
            },
            ScriptStep::Complete {
                status: "Research complete!",
            },
        ])
    }

    /// Steps in execution order
    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }

    /// Total pause time of a run that reveals `source_count` sources.
    ///
    /// Saturates at `Duration::MAX`.
    pub fn total_pause(&self, source_count: usize) -> Duration {
        self.steps
            .iter()
            .map(|step| match step {
                ScriptStep::Announce { pause, .. } => *pause,
                ScriptStep::DiscoverSources {
                    pause_per_source, ..
                } => pause_per_source
                    .saturating_mul(u32::try_from(source_count).unwrap_or(u32::MAX)),
                ScriptStep::Complete { .. } => Duration::ZERO,
            })
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

impl Default for PhaseScript {
    fn default() -> Self {
        Self::standard()
    }
}

/// Fill `{topic}` and `{count}` in a status template.
pub fn render_status(template: &str, topic: &str, source_count: usize) -> String {
    template
        .replace("{count}", &source_count.to_string())
        .replace("{topic}", topic)
}

/// Progress for the reveal of source `index` out of `total`.
///
/// Linear from `from` (first reveal) to `to` (last reveal), rounded. A single
/// source lands on `to`.
pub fn reveal_progress(from: u8, to: u8, index: usize, total: usize) -> u8 {
    if total <= 1 {
        return to;
    }
    let span = f64::from(to) - f64::from(from);
    let fraction = index.min(total - 1) as f64 / (total - 1) as f64;
    (f64::from(from) + span * fraction).round() as u8
}
