//! oVirt / RHV cluster provider.

use crate::compute_resource::domain::Capability;
use crate::compute_resource::ports::{
    Provider, ProviderConfig, ProviderError, ProviderResult, RemoteClient,
};
use std::sync::Arc;

/// Provider for oVirt (RHV) datacenters.
///
/// Engine listings are pageable, and VM definitions can be edited in
/// place.
#[derive(Clone)]
pub struct Ovirt {
    config: ProviderConfig,
    client: Option<Arc<dyn RemoteClient>>,
}

impl Ovirt {
    /// Canonical registry name.
    pub const NAME: &'static str = "Ovirt";

    /// Creates the provider around a resource's connection configuration.
    #[must_use]
    pub const fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            client: None,
        }
    }

    /// Injects the authenticated backend client.
    #[must_use]
    pub fn with_client(mut self, client: Arc<dyn RemoteClient>) -> Self {
        self.client = Some(client);
        self
    }
}

impl Provider for Ovirt {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn friendly_name(&self) -> &'static str {
        "oVirt"
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn capabilities(&self) -> &[Capability] {
        &[Capability::Build, Capability::Image, Capability::NewVolume]
    }

    fn client(&self) -> ProviderResult<Arc<dyn RemoteClient>> {
        self.client
            .clone()
            .ok_or_else(|| ProviderError::not_implemented(Self::NAME, "client"))
    }

    fn supports_update(&self) -> bool {
        true
    }

    fn supports_vms_pagination(&self) -> bool {
        true
    }
}
