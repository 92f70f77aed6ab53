//! Amazon EC2 provider.

use crate::compute_resource::domain::Capability;
use crate::compute_resource::ports::{
    Provider, ProviderConfig, ProviderError, ProviderResult, RemoteClient,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Provider for Amazon EC2 accounts.
///
/// Instances are always image-based; cloud-init user data and managed key
/// pairs are part of the launch contract. The public IP is reported back
/// to hosts once an instance is up.
#[derive(Clone)]
pub struct Ec2 {
    config: ProviderConfig,
    client: Option<Arc<dyn RemoteClient>>,
}

impl Ec2 {
    /// Canonical registry name.
    pub const NAME: &'static str = "EC2";

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

impl Provider for Ec2 {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn capabilities(&self) -> &[Capability] {
        &[Capability::Image, Capability::KeyPair]
    }

    fn provided_attributes(&self) -> BTreeMap<&'static str, &'static str> {
        BTreeMap::from([("uuid", "identity"), ("ip", "public_ip_address")])
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
