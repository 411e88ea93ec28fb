//! Error handling for the enumeration console
//!
//! Pre-flight failures (bad credentials, unknown modules, broken config) are
//! reported through [`ConsoleError`] and abort a run before any subprocess is
//! spawned. Per-module execution failures are never raised; they are carried
//! inside `ModuleResult` instead.

use thiserror::Error;

/// Main error type for console operations
#[derive(Error, Debug)]
pub enum ConsoleError {
    // Validation errors
    #[error("Invalid AWS credentials: {message}")]
    InvalidCredentials { message: String },

    #[error("Invalid modules: {}", modules.join(", "))]
    UnknownModules { modules: Vec<String> },

    #[error("Unknown scan profile: {name}")]
    UnknownProfile { name: String },

    #[error("--access-key and --secret-key are required when creating a new session")]
    MissingSessionKeys,

    #[error("Invalid {field} '{value}': must not be empty or contain path separators or '..'")]
    InvalidName { field: &'static str, value: String },

    #[error("Failed to read prompt file {path}: {message}")]
    PromptFile { path: String, message: String },

    // Session errors
    #[error("[{session}] Session creation failed (exit code {return_code}): {message}")]
    SessionCreationFailed {
        session: String,
        return_code: i32,
        message: String,
    },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Storage errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ConsoleError {
    /// Get suggested actions for this error
    pub fn suggested_actions(&self) -> Vec<&'static str> {
        match self {
            Self::InvalidCredentials { .. } => vec![
                "Check the access key ID and secret access key",
                "Pass a region such as us-east-1 with --region",
            ],
            Self::UnknownModules { .. } => vec![
                "Run `pacu-console modules` to list the available modules",
                "Module names may vary by Pacu version",
            ],
            Self::UnknownProfile { .. } => {
                vec!["Run `pacu-console modules` to list the available profiles"]
            }
            Self::MissingSessionKeys => vec![
                "Pass --access-key and --secret-key together with --create-new",
                "Drop --create-new to reuse an existing session",
            ],
            Self::InvalidName { .. } => {
                vec!["Use a plain name such as pacu-enum-1a2b3c4d or us-east-1"]
            }
            Self::PromptFile { .. } => vec![
                "Check the path passed to --prompt-file",
                "Pass the prompt inline with --prompt instead",
            ],
            Self::SessionCreationFailed { .. } => vec![
                "Check that Pacu is installed and on PATH",
                "Check whether a session with this name already exists",
            ],
            Self::Config(_) => vec!["Check .pacu-console.yaml and PACU_CONSOLE_* variables"],
            Self::Io(_) => vec!["Check that the reports directory is writable"],
            Self::Serialization(_) => vec!["The report file may be corrupted; re-run the scan"],
        }
    }

    /// Get error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials { .. } => "INVALID_CREDENTIALS",
            Self::UnknownModules { .. } => "UNKNOWN_MODULES",
            Self::UnknownProfile { .. } => "UNKNOWN_PROFILE",
            Self::MissingSessionKeys => "MISSING_SESSION_KEYS",
            Self::InvalidName { .. } => "INVALID_NAME",
            Self::PromptFile { .. } => "PROMPT_FILE_ERROR",
            Self::SessionCreationFailed { .. } => "SESSION_CREATION_FAILED",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_modules_lists_every_name() {
        let error = ConsoleError::UnknownModules {
            modules: vec!["foo__enum".to_string(), "bar__enum".to_string()],
        };

        assert_eq!(error.to_string(), "Invalid modules: foo__enum, bar__enum");
        assert_eq!(error.code(), "UNKNOWN_MODULES");
    }

    #[test]
    fn test_invalid_credentials_error() {
        let error = ConsoleError::InvalidCredentials {
            message: "AWS access key looks too short.".to_string(),
        };

        assert!(error.to_string().contains("too short"));
        assert_eq!(error.code(), "INVALID_CREDENTIALS");
        assert!(!error.suggested_actions().is_empty());
    }

    #[test]
    fn test_session_creation_failed_error() {
        let error = ConsoleError::SessionCreationFailed {
            session: "pacu-enum-1234abcd".to_string(),
            return_code: 1,
            message: "boom".to_string(),
        };

        assert_eq!(error.code(), "SESSION_CREATION_FAILED");
        assert!(error.to_string().contains("pacu-enum-1234abcd"));
    }

    #[test]
    fn test_invalid_name_error() {
        let error = ConsoleError::InvalidName {
            field: "session name",
            value: "../x".to_string(),
        };

        assert!(error.to_string().starts_with("Invalid session name '../x'"));
        assert_eq!(error.code(), "INVALID_NAME");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error: ConsoleError = io.into();

        assert_eq!(error.code(), "IO_ERROR");
        assert!(error.to_string().contains("denied"));
    }
}
