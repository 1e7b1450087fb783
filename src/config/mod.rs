use std::env;
use std::path::PathBuf;

use crate::error::AppError;
use crate::export::ExportFormat;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub research: ResearchConfig,
    pub export: ExportConfig,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Research run configuration
#[derive(Debug, Clone, Default)]
pub struct ResearchConfig {
    /// Base seed for source synthesis. Runs are non-reproducible when unset.
    pub seed: Option<u64>,
}

/// Export configuration
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub dir: PathBuf,
    pub format: ExportFormat,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let seed = match env::var("RESEARCH_SEED") {
            Ok(raw) if !raw.trim().is_empty() => {
                Some(raw.trim().parse::<u64>().map_err(|_| AppError::Config {
                    message: format!("RESEARCH_SEED must be an unsigned integer, got '{}'", raw),
                })?)
            }
            _ => None,
        };

        let export = ExportConfig {
            dir: PathBuf::from(env::var("EXPORT_DIR").unwrap_or_else(|_| "./exports".to_string())),
            format: env::var("EXPORT_FORMAT")
                .unwrap_or_else(|_| "text".to_string())
                .parse()
                .map_err(|message| AppError::Config { message })?,
        };

        Ok(Config {
            logging,
            research: ResearchConfig { seed },
            export,
        })
    }

    /// Set the base seed for reproducible runs
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.research.seed = Some(seed);
        self
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./exports"),
            format: ExportFormat::Text,
        }
    }
}
