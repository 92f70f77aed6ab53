//! Repository port for compute resource persistence.
//!
//! Besides the aggregate itself the port manages the records a resource
//! owns: image registrations and per-profile attribute defaults both
//! cascade-delete with the resource, while host links block deletion
//! entirely until the last referencing host is detached.

use crate::compute_resource::domain::{
    ComputeAttribute, ComputeResource, ComputeResourceId, HostId, Image, ImageId, ResourceName,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Compute resource persistence contract.
#[async_trait]
pub trait ComputeResourceRepository: Send + Sync {
    /// Stores a new compute resource.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::DuplicateResource`] when the ID already
    /// exists or [`RepositoryError::DuplicateResourceName`] when the name is
    /// taken.
    async fn save(&self, resource: &ComputeResource) -> RepositoryResult<()>;

    /// Persists changes to an existing resource.
    ///
    /// The provider tag is immutable: an update carrying a different
    /// provider than the stored record is rejected outright.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] when the resource does not
    /// exist, [`RepositoryError::ProviderImmutable`] on a provider change,
    /// or [`RepositoryError::DuplicateResourceName`] when a rename collides.
    async fn update(&self, resource: &ComputeResource) -> RepositoryResult<()>;

    /// Finds a resource by identifier.
    ///
    /// Returns `None` when the resource does not exist.
    async fn find_by_id(
        &self,
        id: ComputeResourceId,
    ) -> RepositoryResult<Option<ComputeResource>>;

    /// Finds a resource by unique name.
    ///
    /// Returns `None` when no resource has the given name.
    async fn find_by_name(
        &self,
        name: &ResourceName,
    ) -> RepositoryResult<Option<ComputeResource>>;

    /// Returns all stored resources.
    async fn list(&self) -> RepositoryResult<Vec<ComputeResource>>;

    /// Deletes a resource, cascading to its images and attribute sets.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] when the resource does not
    /// exist or [`RepositoryError::ResourceInUse`] while any host still
    /// references it.
    async fn delete(&self, id: ComputeResourceId) -> RepositoryResult<()>;

    /// Registers an image against its owning resource.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] when the owning resource does
    /// not exist.
    async fn add_image(&self, image: &Image) -> RepositoryResult<()>;

    /// Returns all images owned by a resource.
    async fn images_for(&self, id: ComputeResourceId) -> RepositoryResult<Vec<Image>>;

    /// Removes one image registration.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::ImageNotFound`] when no image matches.
    async fn remove_image(&self, id: ImageId) -> RepositoryResult<()>;

    /// Stores profile attribute defaults for a resource, replacing any
    /// previous record for the same `(profile, resource)` pair.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] when the owning resource does
    /// not exist.
    async fn set_compute_attributes(&self, attributes: &ComputeAttribute)
    -> RepositoryResult<()>;

    /// Returns all profile attribute defaults stored for a resource.
    async fn compute_attributes_for(
        &self,
        id: ComputeResourceId,
    ) -> RepositoryResult<Vec<ComputeAttribute>>;

    /// Records that a host references the resource, blocking deletion.
    ///
    /// Attaching the same host twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] when the resource does not
    /// exist.
    async fn attach_host(
        &self,
        host: HostId,
        resource: ComputeResourceId,
    ) -> RepositoryResult<()>;

    /// Releases a host reference.
    async fn detach_host(
        &self,
        host: HostId,
        resource: ComputeResourceId,
    ) -> RepositoryResult<()>;

    /// Returns the number of hosts currently referencing the resource.
    async fn host_count(&self, resource: ComputeResourceId) -> RepositoryResult<usize>;
}

/// Errors returned by compute resource repository implementations.
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    /// A resource with the same identifier already exists.
    #[error("duplicate compute resource identifier: {0}")]
    DuplicateResource(ComputeResourceId),

    /// A resource with the same name already exists.
    #[error("duplicate compute resource name: {0}")]
    DuplicateResourceName(ResourceName),

    /// The resource was not found.
    #[error("compute resource not found: {0}")]
    NotFound(ComputeResourceId),

    /// The image was not found.
    #[error("image not found: {0}")]
    ImageNotFound(ImageId),

    /// An update attempted to change the provider of a stored resource.
    #[error("provider of compute resource {0} cannot be changed")]
    ProviderImmutable(ComputeResourceId),

    /// The resource is still referenced by hosts and cannot be deleted.
    #[error("compute resource {id} is used by {host_count} host(s)")]
    ResourceInUse {
        /// The resource whose deletion was blocked.
        id: ComputeResourceId,
        /// Number of hosts still referencing it.
        host_count: usize,
    },

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl RepositoryError {
    /// Wraps a data-quality or deserialization error from persisted rows.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
