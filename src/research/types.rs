//! Research run data model.
//!
//! Every type here is a plain value: snapshots are cloned out to observers,
//! and the export layer serializes them as-is.

use serde::{Deserialize, Serialize};

/// Named stage of a research run.
///
/// Runs move strictly forward through the non-terminal phases and end in
/// either [`ResearchPhase::Complete`] or [`ResearchPhase::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchPhase {
    /// Agent start-up.
    Initializing,
    /// Source discovery; sources are revealed during this phase.
    Searching,
    /// Relevance and credibility analysis.
    Analyzing,
    /// Cross-source synthesis.
    Synthesizing,
    /// Report generation.
    Generating,
    /// Run finished; the report is available.
    Complete,
    /// Run stopped because synthesis failed.
    Failed,
}

impl ResearchPhase {
    /// Phases of a successful run, in visiting order.
    pub const SEQUENCE: [ResearchPhase; 6] = [
        ResearchPhase::Initializing,
        ResearchPhase::Searching,
        ResearchPhase::Analyzing,
        ResearchPhase::Synthesizing,
        ResearchPhase::Generating,
        ResearchPhase::Complete,
    ];

    /// Get the phase name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ResearchPhase::Initializing => "initializing",
            ResearchPhase::Searching => "searching",
            ResearchPhase::Analyzing => "analyzing",
            ResearchPhase::Synthesizing => "synthesizing",
            ResearchPhase::Generating => "generating",
            ResearchPhase::Complete => "complete",
            ResearchPhase::Failed => "failed",
        }
    }

    /// Position in the forward sequence. `Failed` has no position.
    pub fn ordinal(&self) -> Option<usize> {
        Self::SEQUENCE.iter().position(|p| p == self)
    }

    /// Whether no further snapshots follow this phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ResearchPhase::Complete | ResearchPhase::Failed)
    }
}

impl std::fmt::Display for ResearchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ResearchPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "initializing" => Ok(ResearchPhase::Initializing),
            "searching" => Ok(ResearchPhase::Searching),
            "analyzing" => Ok(ResearchPhase::Analyzing),
            "synthesizing" => Ok(ResearchPhase::Synthesizing),
            "generating" => Ok(ResearchPhase::Generating),
            "complete" => Ok(ResearchPhase::Complete),
            "failed" => Ok(ResearchPhase::Failed),
            _ => Err(format!("Unknown research phase: {}", s)),
        }
    }
}

/// Kind of publication a fabricated source imitates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceCategory {
    /// Papers and journal articles.
    Academic,
    /// Engineering blogs and whitepapers.
    Industry,
    /// Official docs and specifications.
    Documentation,
}

impl SourceCategory {
    /// Round-robin order used when generating a batch.
    pub const ALL: [SourceCategory; 3] = [
        SourceCategory::Academic,
        SourceCategory::Industry,
        SourceCategory::Documentation,
    ];

    /// Get the category name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceCategory::Academic => "academic",
            SourceCategory::Industry => "industry",
            SourceCategory::Documentation => "documentation",
        }
    }
}

impl std::fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Year-month publication date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PublishedDate {
    pub year: u16,
    /// 1-12
    pub month: u8,
}

impl PublishedDate {
    /// Create a date, clamping the month into 1-12.
    pub fn new(year: u16, month: u8) -> Self {
        Self {
            year,
            month: month.clamp(1, 12),
        }
    }
}

impl std::fmt::Display for PublishedDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// A fabricated citation-like record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchSource {
    /// Unique within a run.
    pub id: String,
    pub title: String,
    pub author: String,
    pub published: PublishedDate,
    pub category: SourceCategory,
    pub url: String,
    pub description: String,
    /// Credibility score, 7-10 with the default limits.
    pub credibility: u8,
}

/// One titled body section of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSection {
    pub title: String,
    pub content: String,
}

impl ReportSection {
    /// Create a new section
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Fixed-shape report produced when a run completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchReport {
    pub title: String,
    pub executive_summary: String,
    pub key_findings: Vec<String>,
    pub sections: Vec<ReportSection>,
    pub recommendations: Vec<String>,
    pub conclusion: String,
}

/// Snapshot of a research run, published after every step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchState {
    /// Identity of the run that owns this snapshot.
    pub run_id: u64,
    pub topic: String,
    pub phase: ResearchPhase,
    /// 0-100, non-decreasing within a run.
    pub progress: u8,
    /// Discovered sources in reveal order.
    pub sources: Vec<ResearchSource>,
    /// Present only once `phase` is `Complete`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ResearchReport>,
    /// Human-readable status line.
    pub status: String,
    /// Present only once `phase` is `Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResearchState {
    /// Fresh state for a run that has not executed any step yet.
    pub fn new(run_id: u64, topic: impl Into<String>) -> Self {
        Self {
            run_id,
            topic: topic.into(),
            phase: ResearchPhase::Initializing,
            progress: 0,
            sources: Vec::new(),
            report: None,
            status: String::new(),
            error: None,
        }
    }

    /// Whether the run has finished, successfully or not.
    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Move to `Failed`, keeping progress and sources and dropping any report.
    pub fn mark_failed(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.phase = ResearchPhase::Failed;
        self.report = None;
        self.status = format!("Research failed: {}", message);
        self.error = Some(message);
    }
}
