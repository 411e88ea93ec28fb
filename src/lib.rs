pub mod core;
pub mod orchestration;
pub mod reporting;
pub mod security;

pub use crate::core::*;
pub use orchestration::{
    DataQueryClient, EnumerationOrchestrator, EnumerationOutcome, EnumerationRequest,
    ModuleResult, QueryService, SessionExecutor,
};
pub use reporting::{ReportError, ReportGenerator, SummaryReport};
pub use security::{Credentials, ProcessRunner, ToolEnvironment, ToolRunner};
