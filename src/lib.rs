//! # Research Simulator
//!
//! A scripted "autonomous research agent". Given a topic, a run plays through
//! timed research phases, reveals a batch of fabricated sources, and finishes
//! with a templated technical report. Nothing is searched or analyzed; every
//! source and paragraph comes from fixed templates.
//!
//! ## Features
//!
//! - **Phase Sequencer**: fixed step script with timed pauses and cancellation
//! - **Run Controller**: one live run at a time; new topics supersede old runs
//! - **Source Synthesizer**: seedable template-based source batches
//! - **Report Synthesizer**: deterministic fixed-shape reports
//! - **Export**: plain-text and JSON renderings with derived metadata
//!
//! ## Architecture
//!
//! ```text
//! topic → ResearchController → ResearchRun (script) → watch / event stream
//!                                   ↓
//!                          ResearchSynthesizer (sources, report)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use research_simulator::{Config, ResearchController};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let controller = ResearchController::new(&config);
//!     let outcome = controller.start_research("Graph Databases")?.wait().await?;
//!     println!("{:?}", outcome.state().map(|s| s.phase));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Command-line interface.
pub mod cli;
/// Configuration management.
pub mod config;
/// Error types and result aliases for the application.
pub mod error;
/// Plain-text and JSON report export.
pub mod export;
/// Research runs, sequencing, and content synthesis.
pub mod research;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use research::{ResearchController, ResearchState, RunOutcome};
