//! State machine for a single tool invocation
//!
//! Every module run starts `Pending`, moves to `Running`, and ends in exactly
//! one terminal state. The call is blocking, so nothing is left `Running` once
//! the executor returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Module invocation state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModuleState {
    Pending,
    Running,
    Succeeded,
    Failed,
    TimedOut,
    NotFound,
    Errored,
}

impl ModuleState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Running)
    }

    fn can_transition_to(&self, to: ModuleState) -> bool {
        match self {
            Self::Pending => to == Self::Running,
            Self::Running => to.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::TimedOut => "TIMED_OUT",
            Self::NotFound => "NOT_FOUND",
            Self::Errored => "ERRORED",
        };
        f.write_str(label)
    }
}

/// State transition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StateTransition {
    pub from: ModuleState,
    pub to: ModuleState,
    pub timestamp: DateTime<Utc>,
}

/// Illegal transition requested
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("illegal module state transition {from:?} → {to:?}")]
pub struct TransitionError {
    pub from: ModuleState,
    pub to: ModuleState,
}

/// Tracks the lifecycle of one module invocation
#[derive(Debug, Clone)]
pub struct ModuleRun {
    module_name: String,
    current_state: ModuleState,
    transitions: Vec<StateTransition>,
}

impl ModuleRun {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            current_state: ModuleState::Pending,
            transitions: Vec::new(),
        }
    }

    /// Transition to a new state
    pub fn transition(&mut self, to: ModuleState) -> Result<(), TransitionError> {
        if !self.current_state.can_transition_to(to) {
            return Err(TransitionError {
                from: self.current_state,
                to,
            });
        }

        self.transitions.push(StateTransition {
            from: self.current_state,
            to,
            timestamp: Utc::now(),
        });
        self.current_state = to;

        Ok(())
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn state(&self) -> ModuleState {
        self.current_state
    }

    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    /// Milliseconds between the first and last transition
    pub fn elapsed_ms(&self) -> i64 {
        match (self.transitions.first(), self.transitions.last()) {
            (Some(first), Some(last)) => (last.timestamp - first.timestamp).num_milliseconds(),
            _ => 0,
        }
    }

    /// Get transition history as human-readable string
    pub fn history(&self) -> String {
        self.transitions
            .iter()
            .map(|t| format!("{}: {} → {}", t.timestamp.to_rfc3339(), t.from, t.to))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
