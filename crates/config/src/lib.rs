//! Deployment configuration for WordPress site synchronization
//!
//! This crate handles parsing, validation and environment resolution of the
//! deployment declaration, from YAML files and environment variables.

pub mod loader;
pub mod resolve;
pub mod schema;
pub mod validation;

pub use loader::ConfigLoader;
pub use resolve::*;
pub use schema::*;
pub use validation::*;
