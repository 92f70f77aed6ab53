//! Provider registry and compute resource factory.
//!
//! The registry maps provider names to descriptors able to instantiate a
//! concrete [`Provider`] for a resource. Builtin descriptors are compiled
//! in (see `adapters::providers::builtin_registry`); plugins register
//! additional descriptors at process start, with the last registration
//! winning a name collision. Consumers only ever see the *available*
//! union: descriptors whose availability probe reports the backend
//! prerequisites as usable.

use crate::compute_resource::domain::{
    ComputeResource, NewComputeResource, ProviderName, ResourceValidationError,
};
use crate::compute_resource::ports::Provider;
use crate::compute_resource::services::lifecycle::BoundResource;
use mockable::Clock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Factory producing a provider instance bound to one resource.
type ProviderFactory = Arc<dyn Fn(&ComputeResource) -> Arc<dyn Provider> + Send + Sync>;

/// Probe reporting whether a provider's prerequisites are usable.
type AvailabilityProbe = Arc<dyn Fn() -> bool + Send + Sync>;

/// A registered `(name, implementation)` pair.
///
/// Descriptors are in-memory only; nothing about them is persisted.
#[derive(Clone)]
pub struct ProviderDescriptor {
    name: ProviderName,
    factory: ProviderFactory,
    availability: Option<AvailabilityProbe>,
}

impl ProviderDescriptor {
    /// Creates a descriptor from a provider name and an instance factory.
    ///
    /// Without an explicit probe the provider always reports available.
    #[must_use]
    pub fn new(
        name: ProviderName,
        factory: impl Fn(&ComputeResource) -> Arc<dyn Provider> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            factory: Arc::new(factory),
            availability: None,
        }
    }

    /// Sets an availability probe, used by providers whose prerequisites
    /// (native libraries, credentials helpers) may be absent at runtime.
    #[must_use]
    pub fn with_availability(mut self, probe: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.availability = Some(Arc::new(probe));
        self
    }

    /// Returns the canonical provider name.
    #[must_use]
    pub const fn name(&self) -> &ProviderName {
        &self.name
    }

    /// Returns whether the provider's prerequisites are usable.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.availability.as_ref().is_none_or(|probe| probe())
    }

    /// Instantiates the concrete provider for a resource.
    #[must_use]
    pub fn instantiate(&self, resource: &ComputeResource) -> Arc<dyn Provider> {
        (self.factory)(resource)
    }
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("name", &self.name)
            .field("available", &self.is_available())
            .finish_non_exhaustive()
    }
}

/// Errors returned by registry lookups and the resource factory.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// No available provider matches the requested name.
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    /// The factory was called without a provider name.
    #[error("compute resource provider must be specified")]
    MissingProvider,

    /// The resource fields did not validate.
    #[error(transparent)]
    Validation(#[from] ResourceValidationError),
}

/// Registry of provider descriptors, builtin and plugin-registered.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    builtin: BTreeMap<ProviderName, ProviderDescriptor>,
    registered: BTreeMap<ProviderName, ProviderDescriptor>,
}

impl ProviderRegistry {
    /// Creates an empty registry.
    ///
    /// Most callers want `adapters::providers::builtin_registry()` instead,
    /// which pre-populates the compiled-in provider list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a compiled-in provider descriptor.
    pub fn register_builtin(&mut self, descriptor: ProviderDescriptor) {
        self.builtin.insert(descriptor.name().clone(), descriptor);
    }

    /// Registers a plugin-supplied provider descriptor.
    ///
    /// Registration happens in-process at startup. On a name collision the
    /// last registration wins, including over a builtin provider of the
    /// same name.
    pub fn register(&mut self, descriptor: ProviderDescriptor) {
        tracing::debug!(provider = %descriptor.name(), "registering provider");
        self.registered
            .insert(descriptor.name().clone(), descriptor);
    }

    /// Returns the compiled-in provider descriptors.
    #[must_use]
    pub const fn builtin_providers(&self) -> &BTreeMap<ProviderName, ProviderDescriptor> {
        &self.builtin
    }

    /// Returns the plugin-registered provider descriptors.
    #[must_use]
    pub const fn registered_providers(&self) -> &BTreeMap<ProviderName, ProviderDescriptor> {
        &self.registered
    }

    /// Returns the usable union of builtin and registered providers.
    ///
    /// Registered descriptors shadow builtin descriptors of the same name;
    /// descriptors whose availability probe fails are filtered out.
    #[must_use]
    pub fn available_providers(&self) -> BTreeMap<ProviderName, ProviderDescriptor> {
        let mut union: BTreeMap<ProviderName, ProviderDescriptor> = self.builtin.clone();
        for (name, descriptor) in &self.registered {
            union.insert(name.clone(), descriptor.clone());
        }
        union
            .into_iter()
            .filter(|(_, descriptor)| descriptor.is_available())
            .collect()
    }

    /// Returns the names of all available providers.
    #[must_use]
    pub fn available_provider_names(&self) -> Vec<ProviderName> {
        self.available_providers().into_keys().collect()
    }

    /// Resolves a provider descriptor by exact name.
    ///
    /// Registered descriptors shadow builtin ones; availability is not
    /// consulted (resolution is a pure mapping lookup).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownProvider`] when no descriptor has
    /// the given name.
    pub fn resolve(&self, name: &str) -> Result<&ProviderDescriptor, RegistryError> {
        let key = ProviderName::new(name)
            .map_err(|_| RegistryError::UnknownProvider(name.to_owned()))?;
        self.registered
            .get(&key)
            .or_else(|| self.builtin.get(&key))
            .ok_or_else(|| RegistryError::UnknownProvider(name.to_owned()))
    }

    /// Creates a compute resource bound to the named provider.
    ///
    /// The name is matched case-insensitively against the available
    /// providers; the canonical spelling is what gets stored on the record.
    /// Binding is permanent: the returned resource can never switch to a
    /// different provider.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::MissingProvider`] when `provider` is
    /// `None`, [`RegistryError::UnknownProvider`] when no available
    /// provider matches, or [`RegistryError::Validation`] when the request
    /// fields do not validate.
    pub fn create<C>(
        &self,
        provider: Option<&str>,
        request: NewComputeResource,
        clock: Arc<C>,
    ) -> Result<BoundResource<C>, RegistryError>
    where
        C: Clock + Send + Sync,
    {
        let requested = provider.ok_or(RegistryError::MissingProvider)?;
        let descriptor = self
            .find_available(requested)
            .ok_or_else(|| RegistryError::UnknownProvider(requested.to_owned()))?;

        let resource = ComputeResource::new(request, descriptor.name().clone(), &*clock)?;
        let implementation = descriptor.instantiate(&resource);
        tracing::debug!(
            provider = %descriptor.name(),
            resource = %resource.name(),
            "bound new compute resource"
        );
        Ok(BoundResource::new(resource, implementation, clock))
    }

    /// Re-binds a persisted resource to its provider implementation.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownProvider`] when the stored provider
    /// is no longer among the available providers.
    pub fn bind<C>(
        &self,
        resource: ComputeResource,
        clock: Arc<C>,
    ) -> Result<BoundResource<C>, RegistryError>
    where
        C: Clock + Send + Sync,
    {
        let descriptor = self
            .find_available(resource.provider().as_str())
            .ok_or_else(|| {
                RegistryError::UnknownProvider(resource.provider().as_str().to_owned())
            })?;
        let implementation = descriptor.instantiate(&resource);
        Ok(BoundResource::new(resource, implementation, clock))
    }

    /// Case-insensitive lookup among the available providers.
    fn find_available(&self, name: &str) -> Option<ProviderDescriptor> {
        self.available_providers()
            .into_values()
            .find(|descriptor| descriptor.name().matches(name))
    }
}
