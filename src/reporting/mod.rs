//! Reporting: AI-written Markdown reports and JSON run summaries

pub mod ai_report;
pub mod inference;
pub mod prompt;
pub mod summary;

pub use ai_report::{ReportError, ReportGenerator};
pub use inference::OllamaClient;
pub use prompt::{PLACEHOLDER, build_prompt, load_custom_prompt, prompt_has_placeholder};
pub use summary::SummaryReport;
