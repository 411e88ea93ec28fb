//! Test doubles for the tool runner

use crate::security::command_executor::{InvocationOutcome, ToolInvocation, ToolRunner};
use crate::security::credentials::ToolEnvironment;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

type Responder = Box<dyn Fn(&[String]) -> InvocationOutcome + Send + Sync>;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub args: Vec<String>,
    pub env: Option<ToolEnvironment>,
    pub timeout: Option<Duration>,
}

/// Records every invocation and answers from a script
pub struct FakeRunner {
    responder: Responder,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeRunner {
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&[String]) -> InvocationOutcome + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call exits 0 and echoes its arguments
    pub fn succeeding() -> Self {
        Self::with_responder(|args| InvocationOutcome::Completed {
            code: Some(0),
            stdout: format!("ran {}", args.join(" ")),
            stderr: String::new(),
        })
    }

    /// Answer with `outcomes` in order, then succeed
    pub fn with_outcomes(outcomes: Vec<InvocationOutcome>) -> Self {
        let queue = Mutex::new(VecDeque::from(outcomes));
        Self::with_responder(move |_| {
            queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(InvocationOutcome::Completed {
                    code: Some(0),
                    stdout: String::new(),
                    stderr: String::new(),
                })
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ToolRunner for FakeRunner {
    async fn invoke(&self, invocation: &ToolInvocation<'_>) -> InvocationOutcome {
        self.calls.lock().unwrap().push(RecordedCall {
            args: invocation.args.clone(),
            env: invocation.env.cloned(),
            timeout: invocation.timeout,
        });
        (self.responder)(&invocation.args)
    }
}
