//! Session/Module executor
//!
//! Builds the Pacu command lines and turns every [`InvocationOutcome`] into a
//! value the orchestrator can record. `run_module` never fails: a missing
//! binary, a timeout or a crash all become a [`ModuleResult`].

use crate::core::catalog::ModuleCatalog;
use crate::core::state_machine::{ModuleRun, ModuleState};
use crate::orchestration::data_query::{DataQueryResult, QueryService};
use crate::security::command_executor::{InvocationOutcome, ToolInvocation, ToolRunner};
use crate::security::credentials::ToolEnvironment;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const ERROR_NON_ZERO_EXIT: &str = "non-zero exit code";
pub const ERROR_NOT_FOUND: &str = "executable not found";
pub const ERROR_UNEXPECTED: &str = "unexpected error running module";
const TIMEOUT_PREFIX: &str = "timeout after";

/// Outcome of one module invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleResult {
    pub module_name: String,
    pub return_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub error: Option<String>,
}

impl ModuleResult {
    /// Classify a raw invocation outcome
    pub fn from_outcome(
        module_name: impl Into<String>,
        outcome: InvocationOutcome,
        timeout: Duration,
    ) -> Self {
        let module_name = module_name.into();

        match outcome {
            InvocationOutcome::Completed {
                code: Some(0),
                stdout,
                stderr,
            } => Self {
                module_name,
                return_code: 0,
                stdout,
                stderr,
                error: None,
            },
            InvocationOutcome::Completed {
                code,
                stdout,
                stderr,
            } => Self {
                module_name,
                return_code: code.unwrap_or(-1),
                stdout,
                stderr,
                error: Some(ERROR_NON_ZERO_EXIT.to_string()),
            },
            InvocationOutcome::TimedOut { stdout, stderr } => Self {
                module_name,
                return_code: -1,
                stdout,
                stderr,
                error: Some(format!(
                    "{} {} seconds",
                    TIMEOUT_PREFIX,
                    format_seconds(timeout)
                )),
            },
            InvocationOutcome::NotFound => Self {
                module_name,
                return_code: -1,
                stdout: String::new(),
                stderr: String::new(),
                error: Some(ERROR_NOT_FOUND.to_string()),
            },
            InvocationOutcome::Failed { detail } => Self {
                module_name,
                return_code: -1,
                stdout: String::new(),
                stderr: detail,
                error: Some(ERROR_UNEXPECTED.to_string()),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.return_code == 0
    }

    /// Terminal state this result represents
    pub fn state(&self) -> ModuleState {
        match self.error.as_deref() {
            None if self.return_code == 0 => ModuleState::Succeeded,
            None => ModuleState::Failed,
            Some(ERROR_NON_ZERO_EXIT) => ModuleState::Failed,
            Some(ERROR_NOT_FOUND) => ModuleState::NotFound,
            Some(error) if error.starts_with(TIMEOUT_PREFIX) => ModuleState::TimedOut,
            Some(_) => ModuleState::Errored,
        }
    }
}

fn format_seconds(duration: Duration) -> String {
    if duration.subsec_nanos() == 0 {
        duration.as_secs().to_string()
    } else {
        format!("{:.1}", duration.as_secs_f64())
    }
}

/// `pacu --new-session <name> --set-keys None,<access>,<secret>[,<token>]`
pub fn create_session_args(
    session_name: &str,
    access_key: &str,
    secret_key: &str,
    session_token: Option<&str>,
) -> Vec<String> {
    let mut keys = format!("None,{},{}", access_key, secret_key);
    if let Some(token) = session_token.filter(|t| !t.is_empty()) {
        keys.push(',');
        keys.push_str(token);
    }

    vec![
        "--new-session".to_string(),
        session_name.to_string(),
        "--set-keys".to_string(),
        keys,
    ]
}

/// `pacu --session <name> --module-name <module> --exec [--module-args "--regions <r>"]`
pub fn run_module_args(session_name: &str, module_name: &str, region: Option<&str>) -> Vec<String> {
    let mut args = vec![
        "--session".to_string(),
        session_name.to_string(),
        "--module-name".to_string(),
        module_name.to_string(),
        "--exec".to_string(),
    ];

    if let Some(region) = region {
        args.push("--module-args".to_string());
        args.push(format!("--regions {}", region));
    }

    args
}

/// `pacu --session <name> --data <service>`
pub fn data_query_args(session_name: &str, service: QueryService) -> Vec<String> {
    vec![
        "--session".to_string(),
        session_name.to_string(),
        "--data".to_string(),
        service.as_str().to_string(),
    ]
}

/// Single point of Pacu invocation
pub struct SessionExecutor<'a, R: ToolRunner> {
    runner: R,
    catalog: &'a ModuleCatalog,
}

impl<'a, R: ToolRunner> SessionExecutor<'a, R> {
    pub fn new(runner: R, catalog: &'a ModuleCatalog) -> Self {
        Self { runner, catalog }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn catalog(&self) -> &ModuleCatalog {
        self.catalog
    }

    /// Create a new Pacu session with the given keys.
    ///
    /// Returns the raw outcome; checking it is the caller's job. No timeout,
    /// no retries.
    pub async fn create_session(
        &self,
        session_name: &str,
        access_key: &str,
        secret_key: &str,
        session_token: Option<&str>,
    ) -> InvocationOutcome {
        tracing::info!(session = session_name, "creating Pacu session");
        let invocation = ToolInvocation::new(create_session_args(
            session_name,
            access_key,
            secret_key,
            session_token,
        ));

        self.runner.invoke(&invocation).await
    }

    /// Run a single module and classify the result.
    ///
    /// The region argument is only passed to modules the catalog marks as
    /// region-aware.
    pub async fn run_module(
        &self,
        session_name: &str,
        module_name: &str,
        env: Option<&ToolEnvironment>,
        region: Option<&str>,
        timeout: Duration,
    ) -> ModuleResult {
        let mut run = ModuleRun::new(module_name);
        advance(&mut run, ModuleState::Running);

        let region = region.filter(|_| self.catalog.requires_region(module_name));
        let invocation = ToolInvocation::new(run_module_args(session_name, module_name, region))
            .with_env(env)
            .with_timeout(timeout);

        tracing::debug!(
            session = session_name,
            module = module_name,
            region = region.unwrap_or("-"),
            timeout_secs = timeout.as_secs(),
            "running module"
        );

        let outcome = self.runner.invoke(&invocation).await;
        let result = ModuleResult::from_outcome(module_name, outcome, timeout);

        advance(&mut run, result.state());
        tracing::debug!(
            module = module_name,
            state = %run.state(),
            elapsed_ms = run.elapsed_ms(),
            return_code = result.return_code,
            "module finished"
        );
        tracing::trace!(module = module_name, transitions = %run.history(), "module state history");

        result
    }

    /// Query previously enumerated data for one service category
    pub async fn run_data_query(
        &self,
        session_name: &str,
        service: QueryService,
    ) -> DataQueryResult {
        let invocation = ToolInvocation::new(data_query_args(session_name, service));
        let outcome = self.runner.invoke(&invocation).await;

        let stderr = match &outcome {
            InvocationOutcome::NotFound => ERROR_NOT_FOUND.to_string(),
            other => other.stderr().to_string(),
        };

        DataQueryResult {
            return_code: outcome.return_code(),
            stdout: outcome.stdout().to_string(),
            stderr,
        }
    }
}

fn advance(run: &mut ModuleRun, to: ModuleState) {
    if let Err(e) = run.transition(to) {
        tracing::warn!(module = run.module_name(), error = %e, "unexpected state transition");
    }
}
