//! Client and context construction

use crate::error::CliError;
use provmirror_config::Config;
use provmirror_events::EventSender;
use provmirror_net::{NetClient, NetConfig};
use provmirror_ops::{OpsContextBuilder, OpsCtx};
use provmirror_registry::{GpgKeyClient, PrivateRegistryClient, SourceClient};
use provmirror_store::{ArtifactStore, LocalStore};
use std::sync::Arc;
use tracing::debug;

/// Builds the remote clients a command needs from the loaded config
pub struct SystemSetup {
    config: Config,
}

impl SystemSetup {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Client for the public registry; needs no credentials
    pub fn source_client(&self) -> Result<SourceClient, CliError> {
        // The extra roots are only trusted for the private registry
        let net = NetClient::new(NetConfig::from_config(&self.config.network).without_ca_bundle())?;
        Ok(SourceClient::new(net, &self.config.source.address))
    }

    fn private_net(&self) -> Result<NetClient, CliError> {
        Ok(NetClient::new(NetConfig::from_config(&self.config.network))?)
    }

    /// Client for the organization's GPG keys
    pub async fn key_client(&self) -> Result<GpgKeyClient, CliError> {
        let organization = self.config.organization()?;
        let token = self.config.registry_token().await?;
        Ok(GpgKeyClient::new(
            self.private_net()?,
            &self.config.registry.address,
            organization,
            token,
        ))
    }

    /// Artifact store for the split fetch/publish flow
    fn store(&self) -> Result<Arc<dyn ArtifactStore>, CliError> {
        let path = match &self.config.sync.store_path {
            Some(path) => path.clone(),
            None => Config::default_store_path()?,
        };
        debug!(path = %path.display(), "using artifact store");
        Ok(Arc::new(LocalStore::new(path)))
    }

    /// Operations context with every client wired up
    ///
    /// The token and organization are checked here, before any remote call.
    pub async fn ops_context(&self, event_sender: EventSender) -> Result<OpsCtx, CliError> {
        let organization = self.config.organization()?.to_string();
        let token = self.config.registry_token().await?;
        let registry =
            PrivateRegistryClient::new(self.private_net()?, &self.config.registry.address, token);

        let ctx = OpsContextBuilder::new()
            .with_source(Arc::new(self.source_client()?))
            .with_registry(Arc::new(registry))
            .with_store(self.store()?)
            .with_event_sender(event_sender)
            .with_config(self.config.clone())
            .with_organization(organization)
            .build()?;
        Ok(ctx)
    }
}
