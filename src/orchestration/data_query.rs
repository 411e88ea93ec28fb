//! Data query client: reads back what earlier module runs stored in a session

use crate::orchestration::executor::SessionExecutor;
use crate::security::command_executor::ToolRunner;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Service categories Pacu can dump with `--data`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QueryService {
    Ec2,
    Lambda,
    Iam,
    Route53,
    All,
}

impl QueryService {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ec2 => "ec2",
            Self::Lambda => "lambda",
            Self::Iam => "iam",
            Self::Route53 => "route53",
            Self::All => "all",
        }
    }
}

impl fmt::Display for QueryService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw result of a data query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQueryResult {
    pub return_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl DataQueryResult {
    pub fn is_success(&self) -> bool {
        self.return_code == 0
    }
}

/// Queries previously enumerated data for a session
pub struct DataQueryClient<'e, 'c, R: ToolRunner> {
    executor: &'e SessionExecutor<'c, R>,
}

impl<'e, 'c, R: ToolRunner> DataQueryClient<'e, 'c, R> {
    pub fn new(executor: &'e SessionExecutor<'c, R>) -> Self {
        Self { executor }
    }

    pub async fn query(&self, session_name: &str, service: QueryService) -> DataQueryResult {
        tracing::info!(session = session_name, service = %service, "querying Pacu data");

        let result = self.executor.run_data_query(session_name, service).await;

        if result.is_success() {
            tracing::info!(
                session = session_name,
                service = %service,
                bytes = result.stdout.len(),
                "data query completed"
            );
        } else {
            tracing::warn!(
                session = session_name,
                service = %service,
                return_code = result.return_code,
                "data query failed"
            );
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::ModuleCatalog;
    use crate::orchestration::testing::FakeRunner;
    use crate::security::command_executor::InvocationOutcome;

    #[tokio::test]
    async fn test_query_returns_tool_output() {
        let catalog = ModuleCatalog::builtin();
        let runner = FakeRunner::with_outcomes(vec![InvocationOutcome::Completed {
            code: Some(0),
            stdout: "{\"Lambda\": []}".to_string(),
            stderr: String::new(),
        }]);
        let executor = SessionExecutor::new(runner, &catalog);
        let client = DataQueryClient::new(&executor);

        let result = client.query("demo", QueryService::Lambda).await;

        assert!(result.is_success());
        assert_eq!(result.stdout, "{\"Lambda\": []}");
        assert_eq!(
            executor.runner().calls()[0].args,
            vec!["--session", "demo", "--data", "lambda"]
        );
        // data queries carry no timeout
        assert_eq!(executor.runner().calls()[0].timeout, None);
    }

    #[tokio::test]
    async fn test_query_failure_is_reported_not_raised() {
        let catalog = ModuleCatalog::builtin();
        let runner = FakeRunner::with_outcomes(vec![InvocationOutcome::Completed {
            code: Some(1),
            stdout: String::new(),
            stderr: "No session named demo".to_string(),
        }]);
        let executor = SessionExecutor::new(runner, &catalog);

        let result = DataQueryClient::new(&executor)
            .query("demo", QueryService::All)
            .await;

        assert_eq!(result.return_code, 1);
        assert_eq!(result.stderr, "No session named demo");
    }

    #[test]
    fn test_service_names() {
        assert_eq!(QueryService::Ec2.to_string(), "ec2");
        assert_eq!(QueryService::All.as_str(), "all");
        assert_eq!(
            serde_json::to_string(&QueryService::Route53).unwrap(),
            r#""route53""#
        );
    }
}
