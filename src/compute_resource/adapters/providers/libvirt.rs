//! Libvirt hypervisor provider.

use crate::compute_resource::domain::Capability;
use crate::compute_resource::ports::{
    Provider, ProviderConfig, ProviderError, ProviderResult, RemoteClient,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Provider for libvirt-managed hypervisors.
///
/// Libvirt supports both network-boot builds and image cloning, can attach
/// volumes at creation, and lets the display password be set on the
/// graphics device.
#[derive(Clone)]
pub struct Libvirt {
    config: ProviderConfig,
    client: Option<Arc<dyn RemoteClient>>,
}

impl Libvirt {
    /// Canonical registry name.
    pub const NAME: &'static str = "Libvirt";

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

impl Provider for Libvirt {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn capabilities(&self) -> &[Capability] {
        &[
            Capability::Build,
            Capability::Image,
            Capability::NewVolume,
            Capability::NewInterface,
        ]
    }

    fn provided_attributes(&self) -> BTreeMap<&'static str, &'static str> {
        BTreeMap::from([("uuid", "identity"), ("mac", "mac")])
    }

    fn client(&self) -> ProviderResult<Arc<dyn RemoteClient>> {
        self.client
            .clone()
            .ok_or_else(|| ProviderError::not_implemented(Self::NAME, "client"))
    }

    fn supports_update(&self) -> bool {
        true
    }

    fn set_console_password(&self) -> bool {
        true
    }
}
