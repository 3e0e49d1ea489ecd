//! Shared types for the wpdeploy workspace
//!
//! This crate contains the environment tag, error types and path helpers used
//! by the configuration loader and the command line tool.

pub mod environment;
pub mod error;
pub mod utils;

// Re-export commonly used types
pub use environment::Environment;
pub use error::{ConfigError, DeployError, Result};
pub use utils::PathKind;
