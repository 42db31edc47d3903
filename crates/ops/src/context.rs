//! Operations context for dependency injection

use provmirror_config::Config;
use provmirror_errors::{ConfigError, Error, ErrorContext};
use provmirror_events::{EventEmitter, EventSender};
use provmirror_registry::{ProviderRegistry, SourceRegistry};
use provmirror_store::ArtifactStore;
use provmirror_types::RegistryTarget;
use std::sync::Arc;

/// Everything a sync or retention run talks to
pub struct OpsCtx {
    /// Public registry artifacts are fetched from
    pub source: Arc<dyn SourceRegistry>,
    /// Private registry artifacts are published to and pruned from
    pub registry: Arc<dyn ProviderRegistry>,
    /// Store used by the split fetch/publish flow
    pub store: Arc<dyn ArtifactStore>,
    /// Event sender for progress reporting
    pub tx: EventSender,
    pub config: Config,
    /// Organization owning the private registry
    pub organization: String,
}

impl OpsCtx {
    /// Publish target for a provider: the private registry with the
    /// organization as namespace
    #[must_use]
    pub fn publish_target(&self, provider: &str) -> RegistryTarget {
        RegistryTarget::private(&self.organization, provider)
    }

    /// Base error context for a provider version of this organization
    #[must_use]
    pub fn error_context(&self, provider: &str, version: &str) -> ErrorContext {
        ErrorContext::new()
            .with_organization(&self.organization)
            .with_provider(provider)
            .with_version(version)
    }
}

impl EventEmitter for OpsCtx {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.tx)
    }
}

/// Builder for the operations context
#[derive(Default)]
pub struct OpsContextBuilder {
    source: Option<Arc<dyn SourceRegistry>>,
    registry: Option<Arc<dyn ProviderRegistry>>,
    store: Option<Arc<dyn ArtifactStore>>,
    tx: Option<EventSender>,
    config: Option<Config>,
    organization: Option<String>,
}

impl OpsContextBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn SourceRegistry>) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn with_registry(mut self, registry: Arc<dyn ProviderRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn ArtifactStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Organization override; defaults to `registry.organization`
    #[must_use]
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Build the context
    ///
    /// # Errors
    ///
    /// Returns an error if a component is missing or no organization is
    /// configured.
    pub fn build(self) -> Result<OpsCtx, Error> {
        let config = self.config.unwrap_or_default();
        let organization = match self.organization {
            Some(organization) => organization,
            None => config.organization()?.to_string(),
        };
        if organization.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "registry.organization".to_string(),
            }
            .into());
        }

        Ok(OpsCtx {
            source: self
                .source
                .ok_or_else(|| Error::internal("source registry is required"))?,
            registry: self
                .registry
                .ok_or_else(|| Error::internal("private registry is required"))?,
            store: self
                .store
                .ok_or_else(|| Error::internal("artifact store is required"))?,
            tx: self
                .tx
                .ok_or_else(|| Error::internal("event sender is required"))?,
            config,
            organization,
        })
    }
}
