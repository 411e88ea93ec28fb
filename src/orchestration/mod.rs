//! Orchestration layer for Pacu enumeration runs
//!
//! This module provides the high-level components that sequence Pacu
//! invocations: session creation, module runs and data queries.

pub mod data_query;
pub mod enumeration;
pub mod executor;

#[cfg(test)]
pub mod testing;

// Re-export main types for convenience
pub use data_query::{DataQueryClient, DataQueryResult, QueryService};
pub use enumeration::{
    EnumerationOrchestrator, EnumerationOutcome, EnumerationRequest, ProgressEvent,
    ProgressObserver, TracingObserver,
};
pub use executor::{ModuleResult, SessionExecutor};
