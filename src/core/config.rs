//! Configuration structures and types for pacu-console
//!
//! `ConsoleConfig` is the on-disk/partial form: every field is optional so
//! layers can be merged. `Settings` is the resolved form the rest of the crate
//! consumes.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PACU_BINARY: &str = "pacu";
pub const DEFAULT_REPORTS_DIR: &str = "reports";
pub const DEFAULT_MODULE_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/api/chat";
pub const DEFAULT_MODEL: &str = "llama3.1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_SESSION_PREFIX: &str = "pacu-enum";

/// What to do when `--create-new` fails to create the session
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionFailurePolicy {
    /// Log the failure and run the modules anyway; failures surface per module
    #[default]
    Continue,
    /// Stop before running any module
    Abort,
}

/// Root configuration object
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleConfig {
    /// Pacu executable name or path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pacu_binary: Option<String>,

    /// Directory for JSON summaries and AI reports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reports_dir: Option<PathBuf>,

    /// Per-module timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_timeout_secs: Option<u64>,

    /// Ollama chat endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ollama_url: Option<String>,

    /// Model used for report generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,

    /// Inference request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Prefix for generated session names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_name_prefix: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_failure_policy: Option<SessionFailurePolicy>,
}

impl ConsoleConfig {
    /// Overlay every field set in `source` onto `self`
    pub fn merge(&mut self, source: ConsoleConfig) {
        if source.pacu_binary.is_some() {
            self.pacu_binary = source.pacu_binary;
        }
        if source.reports_dir.is_some() {
            self.reports_dir = source.reports_dir;
        }
        if source.module_timeout_secs.is_some() {
            self.module_timeout_secs = source.module_timeout_secs;
        }
        if source.ollama_url.is_some() {
            self.ollama_url = source.ollama_url;
        }
        if source.default_model.is_some() {
            self.default_model = source.default_model;
        }
        if source.request_timeout_secs.is_some() {
            self.request_timeout_secs = source.request_timeout_secs;
        }
        if source.session_name_prefix.is_some() {
            self.session_name_prefix = source.session_name_prefix;
        }
        if source.session_failure_policy.is_some() {
            self.session_failure_policy = source.session_failure_policy;
        }
    }

    /// Fill unset fields with defaults
    pub fn resolve(self) -> Settings {
        Settings {
            pacu_binary: self
                .pacu_binary
                .unwrap_or_else(|| DEFAULT_PACU_BINARY.to_string()),
            reports_dir: self
                .reports_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORTS_DIR)),
            module_timeout: Duration::from_secs(
                self.module_timeout_secs.unwrap_or(DEFAULT_MODULE_TIMEOUT_SECS),
            ),
            ollama_url: self
                .ollama_url
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            default_model: self
                .default_model
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            request_timeout: Duration::from_secs(
                self.request_timeout_secs
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            session_name_prefix: self
                .session_name_prefix
                .unwrap_or_else(|| DEFAULT_SESSION_PREFIX.to_string()),
            session_failure_policy: self.session_failure_policy.unwrap_or_default(),
        }
    }
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub pacu_binary: String,
    pub reports_dir: PathBuf,
    pub module_timeout: Duration,
    pub ollama_url: String,
    pub default_model: String,
    pub request_timeout: Duration,
    pub session_name_prefix: String,
    pub session_failure_policy: SessionFailurePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        ConsoleConfig::default().resolve()
    }
}
