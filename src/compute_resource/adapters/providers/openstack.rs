//! OpenStack provider.

use crate::compute_resource::domain::Capability;
use crate::compute_resource::ports::{
    Provider, ProviderConfig, ProviderError, ProviderResult, RemoteClient,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Provider for OpenStack clouds.
///
/// Instances boot from Glance images; cloud-init user data and key pairs
/// are honoured, and the floating IP is reported back to hosts.
#[derive(Clone)]
pub struct Openstack {
    config: ProviderConfig,
    client: Option<Arc<dyn RemoteClient>>,
}

impl Openstack {
    /// Canonical registry name.
    pub const NAME: &'static str = "Openstack";

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

impl Provider for Openstack {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn friendly_name(&self) -> &'static str {
        "OpenStack"
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn capabilities(&self) -> &[Capability] {
        &[Capability::Image, Capability::KeyPair]
    }

    fn provided_attributes(&self) -> BTreeMap<&'static str, &'static str> {
        BTreeMap::from([("uuid", "identity"), ("ip", "floating_ip_address")])
    }

    fn client(&self) -> ProviderResult<Arc<dyn RemoteClient>> {
        self.client
            .clone()
            .ok_or_else(|| ProviderError::not_implemented(Self::NAME, "client"))
    }

    fn user_data_supported(&self) -> bool {
        true
    }
}
