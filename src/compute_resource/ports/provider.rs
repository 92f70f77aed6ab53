//! Provider port: the uniform capability surface every backend implements.
//!
//! The trait ships default behaviour for the whole VM lifecycle contract,
//! so a concrete provider only overrides what its backend actually
//! supports: the happy path delegates through [`Provider::client`], probes
//! report pessimistic defaults, and enumerators fail with `NotSupported`
//! until a backend opts in.

use crate::compute_resource::domain::{
    AttrMap, Capability, ComputeResource, ConsoleConnection, EndpointUrl, InfrastructureObject,
    Password, RemoteServer,
};
use crate::compute_resource::ports::client::{RemoteClient, RemoteClientError};
use async_trait::async_trait;
use mockable::Clock;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Prefix of backend names generated for VMs created without one.
const VM_NAME_PREFIX: &str = "foundry";

/// Generates a unique default VM name from the current clock time.
#[must_use]
pub fn generated_vm_name(clock: &(dyn Clock + Sync)) -> String {
    format!("{VM_NAME_PREFIX}_{}", clock.utc().timestamp())
}

/// Connection configuration a concrete provider is constructed around.
///
/// A snapshot of the bound resource's URL, credential, and opaque
/// attributes; providers keep their own copy so operations never reach
/// back into the aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    url: EndpointUrl,
    password: Option<Password>,
    attrs: AttrMap,
}

impl ProviderConfig {
    /// Creates a configuration from its parts.
    #[must_use]
    pub const fn new(url: EndpointUrl, password: Option<Password>, attrs: AttrMap) -> Self {
        Self {
            url,
            password,
            attrs,
        }
    }

    /// Snapshots the connection configuration of a resource.
    #[must_use]
    pub fn from_resource(resource: &ComputeResource) -> Self {
        Self {
            url: resource.url().clone(),
            password: resource.password().cloned(),
            attrs: resource.attrs().clone(),
        }
    }

    /// Returns the backend endpoint URL.
    #[must_use]
    pub const fn url(&self) -> &EndpointUrl {
        &self.url
    }

    /// Returns the backend credential, if configured.
    #[must_use]
    pub const fn password(&self) -> Option<&Password> {
        self.password.as_ref()
    }

    /// Returns the opaque provider-specific attributes.
    #[must_use]
    pub const fn attrs(&self) -> &AttrMap {
        &self.attrs
    }

    /// Returns the network names configured on the resource (the `networks`
    /// attribute), empty when none are configured.
    #[must_use]
    pub fn networks(&self) -> Vec<String> {
        self.attrs
            .get("networks")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Uniform lifecycle contract a backend provider implements.
///
/// Everything here may be overridden; the defaults encode the contract's
/// baseline: lifecycle operations delegate through [`Provider::client`],
/// feature probes answer pessimistically, and infrastructure enumerators
/// report `NotSupported` (except [`Provider::available_images`], which
/// reports an empty catalogue).
#[async_trait]
pub trait Provider: Send + Sync {
    /// Canonical provider name as registered in the registry.
    fn name(&self) -> &'static str;

    /// Human-facing provider name used in labels.
    ///
    /// Defaults to the canonical name.
    fn friendly_name(&self) -> &'static str {
        self.name()
    }

    /// Connection configuration the provider was constructed around.
    fn config(&self) -> &ProviderConfig;

    /// Optional feature flags this provider advertises.
    fn capabilities(&self) -> &[Capability] {
        &[]
    }

    /// Host attributes this provider can supply back, as a mapping from
    /// host attribute name to the VM attribute it is read from.
    fn provided_attributes(&self) -> BTreeMap<&'static str, &'static str> {
        BTreeMap::from([("uuid", "identity")])
    }

    /// Authenticated handle to the backend.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotImplemented`] unless the concrete
    /// provider supplies a client.
    fn client(&self) -> ProviderResult<Arc<dyn RemoteClient>> {
        Err(ProviderError::not_implemented(self.name(), "client"))
    }

    /// Backend-side connectivity probe, invoked after record validation.
    ///
    /// The default trusts the configuration; providers with cheap
    /// liveness endpoints override this. Must be free of side effects.
    ///
    /// # Errors
    ///
    /// Returns a provider error when the backend is unreachable.
    async fn test_connection(&self) -> ProviderResult<()> {
        Ok(())
    }

    /// Lists all VMs on the backend.
    ///
    /// The result is finite and restartable; whether paging parameters are
    /// honoured is advertised by [`Provider::supports_vms_pagination`].
    ///
    /// # Errors
    ///
    /// Propagates client failures unchanged.
    async fn list_vms(&self) -> ProviderResult<Vec<RemoteServer>> {
        Ok(self.client()?.list_servers().await?)
    }

    /// Fetches one VM by its backend identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::VmNotFound`] when no VM matches.
    async fn find_vm(&self, uuid: &str) -> ProviderResult<RemoteServer> {
        Ok(self.client()?.get_server(uuid).await?)
    }

    /// Default parameters merged under caller-supplied creation arguments.
    ///
    /// Always includes a generated unique `name` so a VM can be created
    /// from an empty argument map.
    fn vm_defaults(&self, clock: &(dyn Clock + Sync)) -> AttrMap {
        let mut defaults = AttrMap::new();
        defaults.insert(
            "name".to_owned(),
            Value::String(generated_vm_name(clock)),
        );
        defaults
    }

    /// Creates a VM, merging `args` over [`Provider::vm_defaults`].
    ///
    /// Caller-supplied keys win over defaults.
    ///
    /// # Errors
    ///
    /// Propagates client failures unchanged.
    async fn create_vm(
        &self,
        args: AttrMap,
        clock: &(dyn Clock + Sync),
    ) -> ProviderResult<RemoteServer> {
        let mut params = self.vm_defaults(clock);
        for (key, value) in args {
            params.insert(key, value);
        }
        Ok(self.client()?.create_server(params).await?)
    }

    /// Powers on a VM, locating it first.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::VmNotFound`] when no VM matches.
    async fn start_vm(&self, uuid: &str) -> ProviderResult<()> {
        let vm = self.find_vm(uuid).await?;
        Ok(self.client()?.start_server(vm.identity()).await?)
    }

    /// Shuts down a VM, locating it first.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::VmNotFound`] when no VM matches.
    async fn stop_vm(&self, uuid: &str) -> ProviderResult<()> {
        let vm = self.find_vm(uuid).await?;
        Ok(self.client()?.stop_server(vm.identity()).await?)
    }

    /// Destroys a VM, locating it first.
    ///
    /// A VM that is already absent counts as success, including when it
    /// disappears between the lookup and the destroy call; every other
    /// failure propagates.
    ///
    /// # Errors
    ///
    /// Propagates client failures other than not-found unchanged.
    async fn destroy_vm(&self, uuid: &str) -> ProviderResult<()> {
        let vm = match self.find_vm(uuid).await {
            Ok(vm) => vm,
            Err(ProviderError::VmNotFound(_)) => return Ok(()),
            Err(other) => return Err(other),
        };
        match self.client()?.destroy_server(vm.identity()).await {
            Ok(()) | Err(RemoteClientError::ServerNotFound(_)) => Ok(()),
            Err(other) => Err(other.into()),
        }
    }

    /// Opens a console session to a VM.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotSupported`] unless overridden.
    async fn console(&self, uuid: &str) -> ProviderResult<ConsoleConnection> {
        let _ = uuid;
        Err(ProviderError::not_supported(self.name(), "console"))
    }

    /// Enumerates availability zones.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotSupported`] unless overridden.
    async fn available_zones(&self) -> ProviderResult<Vec<InfrastructureObject>> {
        Err(ProviderError::not_supported(self.name(), "available_zones"))
    }

    /// Enumerates backend images.
    ///
    /// Unlike the other enumerators, a provider without an image catalogue
    /// reports an empty listing rather than an error.
    ///
    /// # Errors
    ///
    /// Propagates client failures from overriding providers.
    async fn available_images(&self) -> ProviderResult<Vec<InfrastructureObject>> {
        Ok(Vec::new())
    }

    /// Enumerates networks.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotSupported`] unless overridden.
    async fn available_networks(&self) -> ProviderResult<Vec<InfrastructureObject>> {
        Err(ProviderError::not_supported(
            self.name(),
            "available_networks",
        ))
    }

    /// Enumerates hypervisor clusters.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotSupported`] unless overridden.
    async fn available_clusters(&self) -> ProviderResult<Vec<InfrastructureObject>> {
        Err(ProviderError::not_supported(
            self.name(),
            "available_clusters",
        ))
    }

    /// Enumerates VM folders.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotSupported`] unless overridden.
    async fn available_folders(&self) -> ProviderResult<Vec<InfrastructureObject>> {
        Err(ProviderError::not_supported(
            self.name(),
            "available_folders",
        ))
    }

    /// Enumerates instance flavors.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotSupported`] unless overridden.
    async fn available_flavors(&self) -> ProviderResult<Vec<InfrastructureObject>> {
        Err(ProviderError::not_supported(
            self.name(),
            "available_flavors",
        ))
    }

    /// Enumerates resource pools.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotSupported`] unless overridden.
    async fn available_resource_pools(&self) -> ProviderResult<Vec<InfrastructureObject>> {
        Err(ProviderError::not_supported(
            self.name(),
            "available_resource_pools",
        ))
    }

    /// Enumerates security groups.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotSupported`] unless overridden.
    async fn available_security_groups(&self) -> ProviderResult<Vec<InfrastructureObject>> {
        Err(ProviderError::not_supported(
            self.name(),
            "available_security_groups",
        ))
    }

    /// Enumerates storage domains.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotSupported`] unless overridden.
    async fn available_storage_domains(&self) -> ProviderResult<Vec<InfrastructureObject>> {
        Err(ProviderError::not_supported(
            self.name(),
            "available_storage_domains",
        ))
    }

    /// Enumerates storage pods.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotSupported`] unless overridden.
    async fn available_storage_pods(&self) -> ProviderResult<Vec<InfrastructureObject>> {
        Err(ProviderError::not_supported(
            self.name(),
            "available_storage_pods",
        ))
    }

    /// Whether in-place VM modification (`update_vm`-style) is supported.
    fn supports_update(&self) -> bool {
        false
    }

    /// Whether [`Provider::list_vms`] honours paging parameters.
    fn supports_vms_pagination(&self) -> bool {
        false
    }

    /// Whether host network interfaces can be edited through this resource.
    ///
    /// Defaults to whether the resource has any configured networks.
    fn editable_network_interfaces(&self) -> bool {
        !self.config().networks().is_empty()
    }

    /// Whether a console password can be set on VMs.
    fn set_console_password(&self) -> bool {
        false
    }

    /// Whether cloud-init style user data is honoured at creation.
    fn user_data_supported(&self) -> bool {
        false
    }

    /// Whether the given backend image identifier still exists.
    ///
    /// The default trusts the caller; providers with an image catalogue
    /// override this with a real probe.
    ///
    /// # Errors
    ///
    /// Propagates client failures from overriding providers.
    async fn image_exists(&self, uuid: &str) -> ProviderResult<bool> {
        let _ = uuid;
        Ok(true)
    }
}

/// Errors returned by provider operations.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The provider has not overridden a required capability.
    #[error("provider {provider} does not implement {operation}")]
    NotImplemented {
        /// Concrete provider name.
        provider: &'static str,
        /// Operation that was invoked.
        operation: &'static str,
    },

    /// The provider deliberately does not support the capability.
    #[error("provider {provider} does not support {operation}")]
    NotSupported {
        /// Concrete provider name.
        provider: &'static str,
        /// Operation that was invoked.
        operation: &'static str,
    },

    /// The backend has no VM matching the given identifier.
    #[error("no virtual machine matches identifier {0}")]
    VmNotFound(String),

    /// Opaque backend or transport failure, propagated unchanged.
    #[error("backend error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl ProviderError {
    /// Flags a capability the provider never implemented.
    #[must_use]
    pub const fn not_implemented(provider: &'static str, operation: &'static str) -> Self {
        Self::NotImplemented {
            provider,
            operation,
        }
    }

    /// Flags a capability the provider deliberately opts out of.
    #[must_use]
    pub const fn not_supported(provider: &'static str, operation: &'static str) -> Self {
        Self::NotSupported {
            provider,
            operation,
        }
    }

    /// Wraps an opaque backend or transport error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}

impl From<RemoteClientError> for ProviderError {
    fn from(err: RemoteClientError) -> Self {
        match err {
            RemoteClientError::ServerNotFound(identity) => Self::VmNotFound(identity),
            RemoteClientError::Backend(inner) => Self::Backend(inner),
        }
    }
}
