//! Compute resource aggregate root.

use super::{
    AttrMap, ComputeResourceId, EndpointUrl, Password, ProviderName, ResourceName,
    ResourceValidationError,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Compute resource aggregate root.
///
/// A compute resource is a named, configured connection to one backend
/// provider. The provider tag is chosen at construction and never changes
/// for the life of the record; everything else (URL, credential, opaque
/// attributes) may be updated in place. The credential and the attribute
/// map are excluded from change-history formatting by the surrounding
/// system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeResource {
    id: ComputeResourceId,
    name: ResourceName,
    provider: ProviderName,
    url: EndpointUrl,
    password: Option<Password>,
    attrs: AttrMap,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Request payload for creating a new compute resource.
///
/// Raw field values are carried unvalidated; [`ComputeResource::new`]
/// validates them all at once so callers receive every field error in a
/// single pass rather than one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComputeResource {
    name: String,
    url: String,
    password: Option<String>,
    attrs: AttrMap,
}

impl NewComputeResource {
    /// Creates a request with the required connection fields.
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            password: None,
            attrs: AttrMap::new(),
        }
    }

    /// Sets the backend credential.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the opaque provider-specific attributes.
    #[must_use]
    pub fn with_attrs(mut self, attrs: AttrMap) -> Self {
        self.attrs = attrs;
        self
    }
}

/// Parameter object for reconstructing a persisted compute resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedComputeResourceData {
    /// Persisted resource identifier.
    pub id: ComputeResourceId,
    /// Persisted resource name.
    pub name: ResourceName,
    /// Persisted provider tag.
    pub provider: ProviderName,
    /// Persisted endpoint URL.
    pub url: EndpointUrl,
    /// Persisted credential, if any.
    pub password: Option<Password>,
    /// Persisted opaque attributes.
    pub attrs: AttrMap,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl ComputeResource {
    /// Creates a new compute resource bound to the given provider.
    ///
    /// The provider tag is fixed here for the life of the record; there is
    /// no setter. Use [`ComputeResource::rebind_provider`] only to assert
    /// the binding is unchanged.
    ///
    /// # Errors
    ///
    /// Returns a [`ResourceValidationError`] collecting every failing field
    /// (empty name, empty URL) when the request does not validate.
    pub fn new(
        request: NewComputeResource,
        provider: ProviderName,
        clock: &impl Clock,
    ) -> Result<Self, ResourceValidationError> {
        let NewComputeResource {
            name,
            url,
            password,
            attrs,
        } = request;

        match (ResourceName::new(name), EndpointUrl::new(url)) {
            (Ok(valid_name), Ok(valid_url)) => {
                let timestamp = clock.utc();
                Ok(Self {
                    id: ComputeResourceId::new(),
                    name: valid_name,
                    provider,
                    url: valid_url,
                    password: password.map(Password::new),
                    attrs,
                    created_at: timestamp,
                    updated_at: timestamp,
                })
            }
            (name_result, url_result) => {
                let errors: Vec<ResourceValidationError> = [name_result.err(), url_result.err()]
                    .into_iter()
                    .flatten()
                    .collect();
                Err(ResourceValidationError::multiple(errors))
            }
        }
    }

    /// Reconstructs a resource from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedComputeResourceData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            provider: data.provider,
            url: data.url,
            password: data.password,
            attrs: data.attrs,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the resource identifier.
    #[must_use]
    pub const fn id(&self) -> ComputeResourceId {
        self.id
    }

    /// Returns the resource name.
    #[must_use]
    pub const fn name(&self) -> &ResourceName {
        &self.name
    }

    /// Returns the provider tag the resource is bound to.
    #[must_use]
    pub const fn provider(&self) -> &ProviderName {
        &self.provider
    }

    /// Returns the backend endpoint URL.
    #[must_use]
    pub const fn url(&self) -> &EndpointUrl {
        &self.url
    }

    /// Returns the backend credential, if one is configured.
    #[must_use]
    pub const fn password(&self) -> Option<&Password> {
        self.password.as_ref()
    }

    /// Returns the opaque provider-specific attributes.
    #[must_use]
    pub const fn attrs(&self) -> &AttrMap {
        &self.attrs
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Renames the resource.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceValidationError::EmptyName`] when the new name is
    /// empty after trimming.
    pub fn rename(
        &mut self,
        name: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), ResourceValidationError> {
        self.name = ResourceName::new(name)?;
        self.touch(clock);
        Ok(())
    }

    /// Replaces the endpoint URL, re-applying trailing-slash sanitation.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceValidationError::EmptyUrl`] when the new URL is
    /// empty after trimming.
    pub fn update_url(
        &mut self,
        url: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), ResourceValidationError> {
        self.url = EndpointUrl::new(url)?;
        self.touch(clock);
        Ok(())
    }

    /// Replaces the backend credential.
    pub fn update_password(&mut self, password: Option<Password>, clock: &impl Clock) {
        self.password = password;
        self.touch(clock);
    }

    /// Replaces the opaque attribute map.
    pub fn update_attrs(&mut self, attrs: AttrMap, clock: &impl Clock) {
        self.attrs = attrs;
        self.touch(clock);
    }

    /// Asserts the provider binding against a requested provider name.
    ///
    /// Re-binding to the provider already bound (compared case-insensitively)
    /// is a no-op; anything else is rejected. Only a fresh record may pick a
    /// provider.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceValidationError::ProviderChangeRejected`] when the
    /// requested name differs from the bound provider.
    pub fn rebind_provider(&self, provider: &str) -> Result<(), ResourceValidationError> {
        if self.provider.matches(provider) {
            return Ok(());
        }
        Err(ResourceValidationError::ProviderChangeRejected)
    }

    /// Validates the record against the currently available providers.
    ///
    /// Field-level constraints hold by construction; what can drift after
    /// creation is provider availability (a plugin may be unloaded), so this
    /// re-checks membership. Errors are collected, never raised one at a
    /// time, and the check has no side effects.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceValidationError::UnknownProvider`] when the bound
    /// provider is not in `available`.
    pub fn validate<'a>(
        &self,
        available: impl IntoIterator<Item = &'a ProviderName>,
    ) -> Result<(), ResourceValidationError> {
        let mut errors = Vec::new();

        let known = available
            .into_iter()
            .any(|candidate| candidate.matches(self.provider.as_str()));
        if !known {
            errors.push(ResourceValidationError::UnknownProvider(
                self.provider.as_str().to_owned(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ResourceValidationError::multiple(errors))
        }
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
