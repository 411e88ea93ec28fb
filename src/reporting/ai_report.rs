//! AI report generation
//!
//! Sends enumeration output to the local model and stores the reply as a
//! Markdown file under the reports directory. Failures are returned as
//! [`ReportError`] values with a hint for the operator; nothing is written
//! unless the model produced a report.

use crate::core::config::Settings;
use crate::reporting::inference::OllamaClient;
use crate::reporting::prompt::build_prompt;
use crate::security::credentials::is_safe_name;
use chrono::Local;
use std::path::PathBuf;
use thiserror::Error;

/// Report pipeline errors
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("No data provided; skipping report generation")]
    EmptyInput,

    #[error("Could not connect to Ollama at {url}")]
    Unreachable { url: String },

    #[error("Request to Ollama timed out after {secs} seconds")]
    Timeout { secs: u64 },

    #[error("Ollama API returned status code {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response from Ollama: {0}")]
    MalformedResponse(String),

    #[error("Ollama returned an empty report")]
    EmptyResponse,

    #[error("Invalid session name '{name}' for a report file")]
    InvalidName { name: String },

    #[error("Error calling Ollama: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to save report: {0}")]
    Io(#[from] std::io::Error),
}

impl ReportError {
    /// One actionable line for the operator
    pub fn hint(&self) -> &'static str {
        match self {
            Self::EmptyInput => "Run the enumeration first, or query a service that has data",
            Self::Unreachable { .. } => "Make sure Ollama is running. Start it with: ollama serve",
            Self::Timeout { .. } => {
                "The model might be too large or the prompt too complex; try a smaller model"
            }
            Self::Status { .. } => "Check that the model is pulled: ollama pull <model>",
            Self::MalformedResponse(_) | Self::EmptyResponse => {
                "Check that the configured URL points at Ollama's /api/chat endpoint"
            }
            Self::Request(_) => "Check the Ollama URL in the configuration",
            Self::InvalidName { .. } => {
                "Use a session name without path separators or '..'"
            }
            Self::Io(_) => "Check that the reports directory is writable",
        }
    }
}

/// Turns raw Pacu data into a saved Markdown report
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    client: OllamaClient,
    reports_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(client: OllamaClient, reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            reports_dir: reports_dir.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ReportError> {
        let client = OllamaClient::new(settings.ollama_url.clone(), settings.request_timeout)?;
        Ok(Self::new(client, settings.reports_dir.clone()))
    }

    /// Generate and save a report, returning the path of the new file
    pub async fn generate(
        &self,
        raw_data: &str,
        session_name: &str,
        model: &str,
        custom_prompt: Option<&str>,
    ) -> Result<PathBuf, ReportError> {
        if !is_safe_name(session_name) {
            return Err(ReportError::InvalidName {
                name: session_name.to_string(),
            });
        }

        if raw_data.trim().is_empty() {
            tracing::warn!(session = session_name, "no data provided, skipping report generation");
            return Err(ReportError::EmptyInput);
        }

        let prompt = build_prompt(raw_data, custom_prompt);
        tracing::info!(session = session_name, model, url = self.client.url(), "generating report");

        let report = match self.client.chat(model, &prompt).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(session = session_name, model, error = %e, hint = e.hint(), "report generation failed");
                return Err(e);
            }
        };

        let path = self.save(&report, session_name).await?;
        tracing::info!(session = session_name, path = %path.display(), "report saved");

        Ok(path)
    }

    /// Write `<reports_dir>/<session>_<YYYYmmdd_HHMMSS>.md`
    pub async fn save(&self, content: &str, session_name: &str) -> Result<PathBuf, ReportError> {
        if !is_safe_name(session_name) {
            return Err(ReportError::InvalidName {
                name: session_name.to_string(),
            });
        }

        tokio::fs::create_dir_all(&self.reports_dir).await?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = self
            .reports_dir
            .join(format!("{}_{}.md", session_name, timestamp));
        tokio::fs::write(&path, content).await?;

        Ok(path)
    }
}
