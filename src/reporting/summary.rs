//! JSON summary of an enumeration run

use crate::core::error::ConsoleError;
use crate::orchestration::executor::ModuleResult;
use crate::security::credentials::is_safe_name;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Machine-readable record of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub timestamp_utc: String,
    pub region: String,
    pub profile_name: String,
    pub session_name: String,
    pub account_id: Option<String>,
    pub modules_run: Vec<String>,
    pub module_results: Vec<ModuleResult>,
}

impl SummaryReport {
    /// Stamp the current UTC time and derive `modules_run` from the results
    pub fn build(
        region: &str,
        profile_name: &str,
        session_name: &str,
        module_results: Vec<ModuleResult>,
        account_id: Option<String>,
    ) -> Self {
        Self::build_at(
            Utc::now(),
            region,
            profile_name,
            session_name,
            module_results,
            account_id,
        )
    }

    pub fn build_at(
        at: DateTime<Utc>,
        region: &str,
        profile_name: &str,
        session_name: &str,
        module_results: Vec<ModuleResult>,
        account_id: Option<String>,
    ) -> Self {
        Self {
            timestamp_utc: at.format(TIMESTAMP_FORMAT).to_string(),
            region: region.to_string(),
            profile_name: profile_name.to_string(),
            session_name: session_name.to_string(),
            account_id,
            modules_run: module_results
                .iter()
                .map(|r| r.module_name.clone())
                .collect(),
            module_results,
        }
    }

    /// `pacu-enum-<profile>-<region>-<timestamp without ':' and '-'>.json`
    pub fn file_name(&self) -> String {
        let compact: String = self
            .timestamp_utc
            .chars()
            .filter(|c| *c != ':' && *c != '-')
            .collect();
        format!("pacu-enum-{}-{}-{}.json", self.profile_name, self.region, compact)
    }
}

/// Write the report as pretty JSON under `dir`, creating it if needed
pub async fn save(report: &SummaryReport, dir: &Path) -> Result<PathBuf, ConsoleError> {
    for (field, value) in [
        ("profile name", &report.profile_name),
        ("region", &report.region),
        ("session name", &report.session_name),
    ] {
        if !is_safe_name(value) {
            return Err(ConsoleError::InvalidName {
                field,
                value: value.clone(),
            });
        }
    }

    tokio::fs::create_dir_all(dir).await?;

    let path = dir.join(report.file_name());
    let json = serde_json::to_string_pretty(report)?;
    tokio::fs::write(&path, json).await?;

    tracing::info!(path = %path.display(), modules = report.modules_run.len(), "summary saved");
    Ok(path)
}

pub async fn load(path: &Path) -> Result<SummaryReport, ConsoleError> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}
