use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Research error: {0}")]
    Research(#[from] ResearchError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Errors raised when starting or driving a research run
#[derive(Debug, Error)]
pub enum ResearchError {
    #[error("Research topic cannot be empty")]
    EmptyTopic,

    #[error("Synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("Research run {run_id} aborted before producing an outcome")]
    RunAborted { run_id: u64 },
}

/// Source and report synthesis errors
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Source discovery failed: {message}")]
    Sources { message: String },

    #[error("Report compilation failed: {message}")]
    Report { message: String },

    #[error("Invalid synthesis limits: {message}")]
    InvalidLimits { message: String },
}

/// Report export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for research operations
pub type ResearchResult<T> = Result<T, ResearchError>;

/// Result type alias for synthesis operations
pub type SynthesisResult<T> = Result<T, SynthesisError>;

/// Result type alias for export operations
pub type ExportResult<T> = Result<T, ExportError>;
