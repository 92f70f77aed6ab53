//! A compute resource bound to its concrete provider.
//!
//! [`BoundResource`] is what the registry factory hands out: the aggregate
//! record coupled with the provider implementation chosen at creation time
//! and the clock used for generated VM names. Every VM operation delegates
//! through the provider's client seam; results flow back through the
//! reconciliation helpers before callers compare them against a host's
//! desired state.

use crate::compute_resource::domain::{
    AttrMap, ComputeResource, RemoteServer, ResourceValidationError,
};
use crate::compute_resource::ports::{Provider, ProviderError, ProviderResult};
use crate::compute_resource::services::reconcile;
use crate::compute_resource::services::registry::ProviderRegistry;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by [`BoundResource::test_connection`].
#[derive(Debug, Clone, Error)]
pub enum TestConnectionError {
    /// The record failed validation against the available providers.
    #[error(transparent)]
    Validation(#[from] ResourceValidationError),

    /// The backend-side probe failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// A compute resource coupled with its provider implementation.
pub struct BoundResource<C>
where
    C: Clock + Send + Sync,
{
    resource: ComputeResource,
    provider: Arc<dyn Provider>,
    clock: Arc<C>,
}

impl<C> BoundResource<C>
where
    C: Clock + Send + Sync,
{
    /// Couples a resource record with its provider implementation.
    ///
    /// Normally called through `ProviderRegistry::create` (fresh records)
    /// or `ProviderRegistry::bind` (persisted records).
    #[must_use]
    pub const fn new(resource: ComputeResource, provider: Arc<dyn Provider>, clock: Arc<C>) -> Self {
        Self {
            resource,
            provider,
            clock,
        }
    }

    /// Returns the underlying resource record.
    #[must_use]
    pub const fn resource(&self) -> &ComputeResource {
        &self.resource
    }

    /// Returns a mutable handle to the resource record for attribute
    /// updates (URL, credential, attrs). The provider binding itself stays
    /// immutable.
    pub const fn resource_mut(&mut self) -> &mut ComputeResource {
        &mut self.resource
    }

    /// Returns the bound provider implementation.
    #[must_use]
    pub fn provider(&self) -> &dyn Provider {
        &*self.provider
    }

    /// Operator-facing label: `"{name} ({provider friendly name})"`.
    #[must_use]
    pub fn to_label(&self) -> String {
        format!(
            "{} ({})",
            self.resource.name(),
            self.provider.friendly_name()
        )
    }

    /// Asserts the provider binding against a requested provider name.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceValidationError::ProviderChangeRejected`] when the
    /// requested name differs from the bound provider.
    pub fn rebind_provider(&self, provider: &str) -> Result<(), ResourceValidationError> {
        self.resource.rebind_provider(provider)
    }

    /// Validates the record and probes the backend.
    ///
    /// Validation errors are collected rather than raised one at a time;
    /// the provider's own probe only runs once the record validates. The
    /// whole check is free of side effects.
    ///
    /// # Errors
    ///
    /// Returns [`TestConnectionError::Validation`] with the collected field
    /// errors, or [`TestConnectionError::Provider`] when the backend probe
    /// fails.
    pub async fn test_connection(
        &self,
        registry: &ProviderRegistry,
    ) -> Result<(), TestConnectionError> {
        let available = registry.available_provider_names();
        self.resource.validate(available.iter())?;
        self.provider.test_connection().await?;
        Ok(())
    }

    /// Lists all VMs on the backend.
    ///
    /// # Errors
    ///
    /// Propagates provider failures unchanged.
    pub async fn list_vms(&self) -> ProviderResult<Vec<RemoteServer>> {
        self.provider.list_vms().await
    }

    /// Fetches one VM by its backend identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::VmNotFound`] when no VM matches.
    pub async fn find_vm(&self, uuid: &str) -> ProviderResult<RemoteServer> {
        self.provider.find_vm(uuid).await
    }

    /// Creates a VM, merging `args` over the provider defaults.
    ///
    /// A generated unique name is part of the defaults, so an empty
    /// argument map is sufficient.
    ///
    /// # Errors
    ///
    /// Propagates provider failures unchanged.
    pub async fn create_vm(&self, args: AttrMap) -> ProviderResult<RemoteServer> {
        self.provider.create_vm(args, &*self.clock).await
    }

    /// Powers on a VM.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::VmNotFound`] when no VM matches.
    pub async fn start_vm(&self, uuid: &str) -> ProviderResult<()> {
        self.provider.start_vm(uuid).await
    }

    /// Shuts down a VM.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::VmNotFound`] when no VM matches.
    pub async fn stop_vm(&self, uuid: &str) -> ProviderResult<()> {
        self.provider.stop_vm(uuid).await
    }

    /// Destroys a VM; an already-absent VM counts as success.
    ///
    /// # Errors
    ///
    /// Propagates provider failures other than not-found unchanged.
    pub async fn destroy_vm(&self, uuid: &str) -> ProviderResult<()> {
        self.provider.destroy_vm(uuid).await
    }

    /// Fetches a live VM's attributes shaped for comparison against a
    /// host's desired attributes.
    ///
    /// A VM that no longer exists yields an empty map (logged as a
    /// warning) so callers treat the host as needing a fresh apply rather
    /// than failing; every other failure propagates.
    ///
    /// # Errors
    ///
    /// Propagates provider failures other than not-found unchanged.
    pub async fn vm_compute_attributes_for(&self, uuid: &str) -> ProviderResult<AttrMap> {
        let vm = match self.provider.find_vm(uuid).await {
            Ok(vm) => vm,
            Err(ProviderError::VmNotFound(missing)) => {
                tracing::warn!(
                    uuid = %missing,
                    resource = %self.resource.name(),
                    "no VM found when extracting compute attributes"
                );
                return Ok(AttrMap::new());
            }
            Err(other) => return Err(other),
        };
        Ok(reconcile::vm_compute_attrs(&vm))
    }
}
