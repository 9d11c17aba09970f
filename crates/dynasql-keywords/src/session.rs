//! Session management keywords.

use crate::error::LibraryError;
use dynasql_config::LibraryConfig;
use dynasql_session::{Connector, QueryHandle, SessionConfig, SessionRegistry};

/// Creates and removes labelled engine sessions.
pub struct SessionKeywords<C: Connector> {
    connector: C,
    registry: SessionRegistry<C::Handle>,
    default_region: Option<String>,
}

impl<C: Connector> SessionKeywords<C> {
    pub fn new(connector: C, config: &LibraryConfig) -> Self {
        Self {
            connector,
            registry: SessionRegistry::with_policy(config.duplicate_labels),
            default_region: config.default_region.clone(),
        }
    }

    /// Connect a new session and register it.
    ///
    /// The label defaults to the requested region, then to the region the
    /// engine resolved. Returns the label.
    pub fn create_session(
        &mut self,
        mut config: SessionConfig,
        session: Option<C::Session>,
        label: Option<&str>,
    ) -> Result<String, LibraryError> {
        if config.region.is_none() {
            config.region = self.default_region.clone();
        }
        let handle = self.connector.connect(&config, session)?;
        let label = label
            .map(str::to_string)
            .or(config.region)
            .unwrap_or_else(|| handle.region().to_string());
        tracing::debug!("Creating DynamoDB session: {}", label);
        self.registry
            .create(Some(&label), handle)
            .map_err(LibraryError::from)
    }

    /// Remove one session. With `info_on_fail`, a missing label is logged
    /// instead of returned as an error.
    pub fn delete_session(&mut self, label: &str, info_on_fail: bool) -> Result<(), LibraryError> {
        self.registry.delete(label, info_on_fail)?;
        Ok(())
    }

    pub fn delete_all_sessions(&mut self) {
        self.registry.delete_all();
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn registry(&self) -> &SessionRegistry<C::Handle> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SessionRegistry<C::Handle> {
        &mut self.registry
    }
}
