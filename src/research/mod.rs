//! Simulated research pipeline.
//!
//! - [`ResearchController`]: starts, supersedes and resets runs
//! - [`ResearchRun`]: executes a [`PhaseScript`] and publishes snapshots
//! - [`SourceSynthesizer`]: fabricates ranked source batches
//! - [`ReportSynthesizer`]: assembles the templated report
//!
//! Content generation sits behind the [`ResearchSynthesizer`] trait, with
//! [`TemplateSynthesizer`] as the default.

mod controller;
mod report;
mod script;
mod sequencer;
mod sources;
mod synthesizer;
mod types;

pub use controller::*;
pub use report::*;
pub use script::*;
pub use sequencer::*;
pub use sources::*;
pub use synthesizer::*;
pub use types::*;
