//! Connector registry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::connector::{Connector, ProviderMetadata};
use crate::error::{ConnectorError, Result};

/// Directory of available connectors, keyed by provider id.
///
/// Built once at startup and handed to consumers by reference. Registration
/// order is preserved for listing.
#[derive(Default)]
pub struct ConnectorRegistry {
    connectors: HashMap<String, Arc<dyn Connector>>,
    order: Vec<String>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connector under its metadata id.
    ///
    /// Fails on an empty id or an id that is already taken; the registry is
    /// left unchanged in both cases.
    pub fn register(&mut self, connector: Arc<dyn Connector>) -> Result<()> {
        let id = connector.metadata().id;
        if id.is_empty() {
            return Err(ConnectorError::EmptyId);
        }
        if self.connectors.contains_key(&id) {
            return Err(ConnectorError::AlreadyRegistered(id));
        }

        tracing::debug!(provider = %id, "registered connector");
        self.order.push(id.clone());
        self.connectors.insert(id, connector);
        Ok(())
    }

    /// Look up a connector by provider id.
    pub fn get(&self, id: &str) -> Option<Arc<dyn Connector>> {
        self.connectors.get(id).cloned()
    }

    /// Metadata of every registered provider, in registration order.
    pub fn list(&self) -> Vec<ProviderMetadata> {
        self.order
            .iter()
            .filter_map(|id| self.connectors.get(id))
            .map(|c| c.metadata())
            .collect()
    }

    /// Registered provider ids, sorted.
    pub fn provider_ids(&self) -> Vec<String> {
        let mut ids = self.order.clone();
        ids.sort();
        ids
    }

    /// Pretty-printed JSON manifest of all providers, for the web UI.
    pub fn export_manifest(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.list())?)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
