//! Pluggable storage-provider connectors for CloudMoor.
//!
//! Each remote backend (S3, WebDAV, Dropbox, ...) implements [`Connector`].
//! Connectors are collected in a [`ConnectorRegistry`] built once at startup
//! and passed by reference to whatever needs provider discovery.

mod connector;
mod error;
mod registry;

pub use connector::{Connection, Connector, ConnectorConfig, ProviderMetadata};
pub use error::{ConnectorError, Result};
pub use registry::ConnectorRegistry;

/// Semantic version type used in provider metadata.
pub use semver::Version;
