//! # cloudmoor-core
//!
//! Shared functionality used across the CloudMoor crates:
//!
//! - **Configuration**: loading, validation, and persistence of the JSON5 config file
//! - **Paths**: resolution of the `~/.cloudmoor` directory layout
//! - **Environment**: typed access to `CLOUDMOOR_*` variables

pub mod config;
pub mod env;
pub mod error;
pub mod paths;

pub use config::Config;
pub use error::ConfigError;
