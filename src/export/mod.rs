//! Report export.
//!
//! A completed run is captured as an [`ExportDocument`] and rendered either as
//! a plain-text layout ([`export_text`]) or as pretty JSON ([`export_json`]).
//! Both renderings are byte-identical for identical inputs, timestamp
//! included.

mod text;

pub use text::*;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ExportResult;
use crate::research::{topic_slug, ResearchReport, ResearchSource, ResearchState, SourceCategory};

/// Output format for exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Text,
    Json,
}

impl ExportFormat {
    /// File extension, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Json => "json",
        }
    }

    /// Get the format name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Text => "text",
            ExportFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" => Ok(ExportFormat::Text),
            "json" => Ok(ExportFormat::Json),
            _ => Err(format!("Unknown export format: {}", s)),
        }
    }
}

/// Per-category source counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub academic: usize,
    pub industry: usize,
    pub documentation: usize,
}

/// Figures derived from the source list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub source_count: usize,
    /// Mean credibility rounded to one decimal place; 0.0 with no sources.
    pub average_credibility: f64,
    pub categories: CategoryCounts,
}

impl ExportMetadata {
    /// Derive metadata from a source list
    pub fn from_sources(sources: &[ResearchSource]) -> Self {
        let mut categories = CategoryCounts::default();
        for source in sources {
            match source.category {
                SourceCategory::Academic => categories.academic += 1,
                SourceCategory::Industry => categories.industry += 1,
                SourceCategory::Documentation => categories.documentation += 1,
            }
        }

        let average_credibility = if sources.is_empty() {
            0.0
        } else {
            let total: u32 = sources.iter().map(|s| u32::from(s.credibility)).sum();
            round_one_decimal(f64::from(total) / sources.len() as f64)
        };

        Self {
            source_count: sources.len(),
            average_credibility,
            categories,
        }
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Everything exported for a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub topic: String,
    pub generated_at: DateTime<Utc>,
    pub report: ResearchReport,
    pub sources: Vec<ResearchSource>,
    pub metadata: ExportMetadata,
}

impl ExportDocument {
    /// Build a document; metadata is derived from `sources`.
    pub fn new(
        topic: impl Into<String>,
        generated_at: DateTime<Utc>,
        report: ResearchReport,
        sources: Vec<ResearchSource>,
    ) -> Self {
        let metadata = ExportMetadata::from_sources(&sources);
        Self {
            topic: topic.into(),
            generated_at,
            report,
            sources,
            metadata,
        }
    }

    /// Document for a completed run; `None` until the state carries a report.
    pub fn from_state(state: &ResearchState, generated_at: DateTime<Utc>) -> Option<Self> {
        let report = state.report.clone()?;
        Some(Self::new(
            state.topic.clone(),
            generated_at,
            report,
            state.sources.clone(),
        ))
    }

    /// Parse a document previously produced by [`export_json`].
    pub fn from_json(json: &str) -> ExportResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Pretty-printed JSON rendering.
pub fn export_json(doc: &ExportDocument) -> ExportResult<String> {
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Render a document in the given format.
pub fn render(doc: &ExportDocument, format: ExportFormat) -> ExportResult<String> {
    match format {
        ExportFormat::Text => Ok(export_text(doc)),
        ExportFormat::Json => export_json(doc),
    }
}

/// File name for an export of `topic`.
pub fn suggested_file_name(topic: &str, format: ExportFormat) -> String {
    format!("research-{}.{}", topic_slug(topic), format.extension())
}

/// Write an export into `dir`, creating it if needed.
pub async fn write_export(
    dir: &Path,
    doc: &ExportDocument,
    format: ExportFormat,
) -> ExportResult<PathBuf> {
    let body = render(doc, format)?;
    tokio::fs::create_dir_all(dir).await?;

    let path = dir.join(suggested_file_name(&doc.topic, format));
    tokio::fs::write(&path, body.as_bytes()).await?;

    info!(path = %path.display(), format = %format, "Report exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::PublishedDate;

    fn source(id: usize, category: SourceCategory, credibility: u8) -> ResearchSource {
        ResearchSource {
            id: format!("source-{}", id),
            title: format!("Title {}", id),
            author: "Author".to_string(),
            published: PublishedDate::new(2022, 6),
            category,
            url: format!("https://example.org/{}", id),
            description: "Description".to_string(),
            credibility,
        }
    }

    #[test]
    fn test_export_format_from_str() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("TEXT".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert_eq!(
            "pdf".parse::<ExportFormat>().unwrap_err(),
            "Unknown export format: pdf"
        );
    }

    #[test]
    fn test_export_format_extension() {
        assert_eq!(ExportFormat::Text.extension(), "txt");
        assert_eq!(ExportFormat::Json.extension(), "json");
    }

    #[test]
    fn test_metadata_counts_and_average() {
        let sources = vec![
            source(1, SourceCategory::Academic, 10),
            source(2, SourceCategory::Industry, 9),
            source(3, SourceCategory::Documentation, 7),
            source(4, SourceCategory::Academic, 7),
        ];
        let meta = ExportMetadata::from_sources(&sources);
        assert_eq!(meta.source_count, 4);
        // 33 / 4 = 8.25 -> 8.3
        assert_eq!(meta.average_credibility, 8.3);
        assert_eq!(
            meta.categories,
            CategoryCounts {
                academic: 2,
                industry: 1,
                documentation: 1,
            }
        );
    }

    #[test]
    fn test_metadata_repeating_average() {
        let sources = vec![
            source(1, SourceCategory::Academic, 10),
            source(2, SourceCategory::Academic, 8),
            source(3, SourceCategory::Academic, 8),
        ];
        // 26 / 3 = 8.666.. -> 8.7
        assert_eq!(ExportMetadata::from_sources(&sources).average_credibility, 8.7);
    }

    #[test]
    fn test_metadata_empty() {
        let meta = ExportMetadata::from_sources(&[]);
        assert_eq!(meta.source_count, 0);
        assert_eq!(meta.average_credibility, 0.0);
    }

    #[test]
    fn test_suggested_file_name() {
        assert_eq!(
            suggested_file_name("Graph Databases", ExportFormat::Json),
            "research-graph-databases.json"
        );
        assert_eq!(
            suggested_file_name("C++ / Rust", ExportFormat::Text),
            "research-c-rust.txt"
        );
    }
}
