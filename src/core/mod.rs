pub mod catalog;
pub mod config;
pub mod config_loader;
pub mod error;
pub mod state_machine;

pub use catalog::*;
pub use config::*;
pub use config_loader::{ConfigLoadOptions, ConfigLoader};
pub use error::*;
pub use state_machine::*;
