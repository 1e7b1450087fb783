//! Command-line interface.
//!
//! Progress lines go to stderr; reports go to stdout or into a file.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, ResearchError};
use crate::export::{export_text, render, write_export, ExportDocument, ExportFormat};
use crate::research::{
    ResearchController, ResearchPhase, ResearchState, ResearchSynthesizer, RunOutcome,
    TemplateSynthesizer,
};

/// Scripted research-agent simulator.
#[derive(Parser, Debug)]
#[command(name = "research-simulator", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Play a full timed research run for a topic
    Run {
        /// Topic to research
        topic: String,

        /// Seed for reproducible sources (overrides RESEARCH_SEED)
        #[arg(long)]
        seed: Option<u64>,

        /// Export format: text or json (overrides EXPORT_FORMAT)
        #[arg(long)]
        format: Option<ExportFormat>,

        /// Write the export into this directory instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write the export into EXPORT_DIR
        #[arg(long, conflicts_with = "output")]
        save: bool,

        /// Suppress progress lines
        #[arg(long)]
        quiet: bool,
    },

    /// Read topics from stdin; each new topic supersedes the run in flight
    Interactive {
        /// Base seed for reproducible sources
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Synthesize sources and report immediately, without the timed script
    Export {
        /// Topic to research
        topic: String,

        /// Seed for the source batch
        #[arg(long)]
        seed: u64,

        /// Export format: text or json
        #[arg(long, default_value = "text")]
        format: ExportFormat,

        /// Fixed generation timestamp (RFC 3339) for byte-identical output
        #[arg(long)]
        generated_at: Option<DateTime<Utc>>,
    },
}

/// Result of CLI command execution.
pub struct CliResult {
    /// Exit code (0 = success)
    pub exit_code: i32,
    /// Output written to stdout
    pub message: String,
}

impl CliResult {
    /// Create a success result with the given message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            message: message.into(),
        }
    }

    /// Create an error result with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            exit_code: 1,
            message: message.into(),
        }
    }
}

impl From<AppResult<String>> for CliResult {
    fn from(result: AppResult<String>) -> Self {
        match result {
            Ok(message) => CliResult::success(message),
            Err(e) => CliResult::error(e.to_string()),
        }
    }
}

/// One progress line for a snapshot.
pub fn format_progress(state: &ResearchState) -> String {
    format!(
        "[{:>3}%] {:<12} {}",
        state.progress,
        state.phase.as_str(),
        state.status
    )
}

/// Execute a CLI command.
pub async fn execute_command(command: Commands, config: Config) -> CliResult {
    match command {
        Commands::Run {
            topic,
            seed,
            format,
            output,
            save,
            quiet,
        } => {
            let format = format.unwrap_or(config.export.format);
            let output = output.or_else(|| save.then(|| config.export.dir.clone()));
            let config = match seed {
                Some(seed) => config.with_seed(seed),
                None => config,
            };
            execute_run(&config, &topic, format, output, quiet).await.into()
        }
        Commands::Interactive { seed } => {
            let config = match seed {
                Some(seed) => config.with_seed(seed),
                None => config,
            };
            execute_interactive(&config).await.into()
        }
        Commands::Export {
            topic,
            seed,
            format,
            generated_at,
        } => execute_export(&topic, seed, format, generated_at.unwrap_or_else(Utc::now)).into(),
    }
}

async fn execute_run(
    config: &Config,
    topic: &str,
    format: ExportFormat,
    output: Option<PathBuf>,
    quiet: bool,
) -> AppResult<String> {
    let controller = ResearchController::new(config);
    let mut events = controller.take_events();
    let handle = controller.start_research(topic)?;

    let printer = tokio::spawn(async move {
        while let Some(state) = events.recv().await {
            if !quiet {
                eprintln!("{}", format_progress(&state));
            }
            if state.is_finished() {
                break;
            }
        }
    });

    let outcome = handle.wait().await?;
    if let Err(e) = printer.await {
        warn!(error = %e, "Progress printer stopped unexpectedly");
    }

    match outcome {
        RunOutcome::Completed(state) => {
            let doc = ExportDocument::from_state(&state, Utc::now()).ok_or_else(|| {
                AppError::Internal {
                    message: "completed run has no report".to_string(),
                }
            })?;
            match output {
                Some(dir) => {
                    let path = write_export(&dir, &doc, format).await?;
                    Ok(format!("Report written to {}", path.display()))
                }
                None => Ok(render(&doc, format)?),
            }
        }
        RunOutcome::Failed(state) => Err(AppError::Internal {
            message: state.status,
        }),
        RunOutcome::Cancelled => Err(AppError::Internal {
            message: "research run was cancelled".to_string(),
        }),
    }
}

async fn execute_interactive(config: &Config) -> AppResult<String> {
    let controller = ResearchController::new(config);
    let mut events = controller.take_events();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    eprintln!("Enter a research topic, 'reset' to clear, or 'quit' to exit.");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = line.map_err(|e| AppError::Internal {
                    message: format!("failed to read stdin: {}", e),
                })?;
                let Some(line) = line else { break };
                match line.trim() {
                    "quit" | "exit" => break,
                    "reset" => {
                        controller.reset();
                        eprintln!("Reset. Enter a new topic.");
                    }
                    topic => match controller.start_research(topic) {
                        Ok(handle) => debug!(run_id = handle.run_id(), "Interactive run started"),
                        Err(ResearchError::EmptyTopic) => eprintln!("Please enter a topic."),
                        Err(e) => eprintln!("{}", e),
                    },
                }
            }
            Some(state) = events.recv() => {
                eprintln!("{}", format_progress(&state));
                if state.phase == ResearchPhase::Complete {
                    if let Some(doc) = ExportDocument::from_state(&state, Utc::now()) {
                        println!("{}", export_text(&doc));
                    }
                }
            }
        }
    }

    controller.reset();
    Ok(String::new())
}

fn execute_export(
    topic: &str,
    seed: u64,
    format: ExportFormat,
    generated_at: DateTime<Utc>,
) -> AppResult<String> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(ResearchError::EmptyTopic.into());
    }

    let synthesizer = TemplateSynthesizer::new();
    let mut rng = StdRng::seed_from_u64(seed);
    let sources = synthesizer
        .discover_sources(topic, &mut rng)
        .map_err(ResearchError::from)?;
    let report = synthesizer
        .compile_report(topic, &sources)
        .map_err(ResearchError::from)?;

    let doc = ExportDocument::new(topic, generated_at, report, sources);
    Ok(render(&doc, format)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_time() -> DateTime<Utc> {
        "2026-01-15T09:30:00Z".parse().unwrap()
    }

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::try_parse_from([
            "research-simulator",
            "run",
            "Graph Databases",
            "--seed",
            "7",
            "--format",
            "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                topic, seed, format, ..
            } => {
                assert_eq!(topic, "Graph Databases");
                assert_eq!(seed, Some(7));
                assert_eq!(format, Some(ExportFormat::Json));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_rejects_output_with_save() {
        let result = Cli::try_parse_from([
            "research-simulator",
            "run",
            "Rust",
            "--output",
            "/tmp/x",
            "--save",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_export_requires_seed() {
        assert!(Cli::try_parse_from(["research-simulator", "export", "Rust"]).is_err());
    }

    #[test]
    fn test_format_progress() {
        let mut state = ResearchState::new(1, "Rust");
        state.phase = ResearchPhase::Searching;
        state.progress = 15;
        state.status = "Searching...".to_string();
        assert_eq!(format_progress(&state), "[ 15%] searching    Searching...");
    }

    #[test]
    fn test_execute_export_is_reproducible() {
        let a = execute_export("Graph Databases", 3, ExportFormat::Json, fixed_time()).unwrap();
        let b = execute_export("Graph Databases", 3, ExportFormat::Json, fixed_time()).unwrap();
        assert_eq!(a, b);
        let doc = ExportDocument::from_json(&a).unwrap();
        assert_eq!(doc.report.title, "Technical Analysis: Graph Databases");
    }

    #[test]
    fn test_execute_export_rejects_empty_topic() {
        let err = execute_export("  ", 1, ExportFormat::Text, fixed_time()).unwrap_err();
        assert!(matches!(err, AppError::Research(ResearchError::EmptyTopic)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_run_writes_export() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default().with_seed(5);
        let message = execute_run(
            &config,
            "Graph Databases",
            ExportFormat::Text,
            Some(dir.path().to_path_buf()),
            true,
        )
        .await
        .unwrap();
        assert!(message.contains("research-graph-databases.txt"));
        assert!(dir.path().join("research-graph-databases.txt").exists());
    }
}
