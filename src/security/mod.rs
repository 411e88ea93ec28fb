pub mod command_executor;
pub mod credentials;

pub use command_executor::{InvocationOutcome, ProcessRunner, ToolInvocation, ToolRunner};
pub use credentials::{
    Credentials, ToolEnvironment, generate_session_name, is_safe_name, mask_secret,
    prepare_environment, redact_secrets, validate_keys,
};
