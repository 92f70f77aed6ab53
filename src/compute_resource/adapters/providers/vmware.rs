//! VMware vSphere provider.

use crate::compute_resource::domain::Capability;
use crate::compute_resource::ports::{
    Provider, ProviderConfig, ProviderError, ProviderResult, RemoteClient,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Provider for VMware vSphere / vCenter installations.
///
/// Supports builds and template cloning, volume attachment, pageable
/// inventories, in-place reconfiguration, and console passwords.
#[derive(Clone)]
pub struct Vmware {
    config: ProviderConfig,
    client: Option<Arc<dyn RemoteClient>>,
}

impl Vmware {
    /// Canonical registry name.
    pub const NAME: &'static str = "Vmware";

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

impl Provider for Vmware {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn friendly_name(&self) -> &'static str {
        "VMware"
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn capabilities(&self) -> &[Capability] {
        &[Capability::Build, Capability::Image, Capability::NewVolume]
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

    fn supports_vms_pagination(&self) -> bool {
        true
    }

    fn set_console_password(&self) -> bool {
        true
    }
}
