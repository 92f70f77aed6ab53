//! In-memory compute resource repository.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::compute_resource::domain::{
    ComputeAttribute, ComputeResource, ComputeResourceId, HostId, Image, ImageId, ResourceName,
};
use crate::compute_resource::ports::{
    ComputeResourceRepository, RepositoryError, RepositoryResult,
};

/// Thread-safe in-memory compute resource repository.
///
/// Used by the test suites and as the local-development repository; the
/// cascade and host-blocking semantics match the postgres adapter.
#[derive(Debug, Clone, Default)]
pub struct InMemoryComputeResources {
    state: Arc<RwLock<InMemoryState>>,
}

#[derive(Debug, Default)]
struct InMemoryState {
    resources: HashMap<ComputeResourceId, ComputeResource>,
    name_index: HashMap<ResourceName, ComputeResourceId>,
    images: HashMap<ImageId, Image>,
    attribute_sets: HashMap<(uuid::Uuid, uuid::Uuid), ComputeAttribute>,
    host_links: HashSet<(HostId, ComputeResourceId)>,
}

impl InMemoryComputeResources {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl ToString) -> RepositoryError {
    RepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl ComputeResourceRepository for InMemoryComputeResources {
    async fn save(&self, resource: &ComputeResource) -> RepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;

        if state.resources.contains_key(&resource.id()) {
            return Err(RepositoryError::DuplicateResource(resource.id()));
        }
        if state.name_index.contains_key(resource.name()) {
            return Err(RepositoryError::DuplicateResourceName(
                resource.name().clone(),
            ));
        }

        state
            .name_index
            .insert(resource.name().clone(), resource.id());
        state.resources.insert(resource.id(), resource.clone());
        Ok(())
    }

    async fn update(&self, resource: &ComputeResource) -> RepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;

        let stored = state
            .resources
            .get(&resource.id())
            .ok_or(RepositoryError::NotFound(resource.id()))?;

        if stored.provider() != resource.provider() {
            return Err(RepositoryError::ProviderImmutable(resource.id()));
        }

        let old_name = stored.name().clone();
        if *resource.name() != old_name {
            if let Some(&indexed_id) = state.name_index.get(resource.name())
                && indexed_id != resource.id()
            {
                return Err(RepositoryError::DuplicateResourceName(
                    resource.name().clone(),
                ));
            }
            state.name_index.remove(&old_name);
            state
                .name_index
                .insert(resource.name().clone(), resource.id());
        }

        state.resources.insert(resource.id(), resource.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: ComputeResourceId,
    ) -> RepositoryResult<Option<ComputeResource>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.resources.get(&id).cloned())
    }

    async fn find_by_name(
        &self,
        name: &ResourceName,
    ) -> RepositoryResult<Option<ComputeResource>> {
        let state = self.state.read().map_err(lock_error)?;
        let resource = state
            .name_index
            .get(name)
            .and_then(|id| state.resources.get(id))
            .cloned();
        Ok(resource)
    }

    async fn list(&self) -> RepositoryResult<Vec<ComputeResource>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.resources.values().cloned().collect())
    }

    async fn delete(&self, id: ComputeResourceId) -> RepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;

        let resource = state
            .resources
            .get(&id)
            .ok_or(RepositoryError::NotFound(id))?;
        let name = resource.name().clone();

        let host_count = state
            .host_links
            .iter()
            .filter(|(_, linked)| *linked == id)
            .count();
        if host_count > 0 {
            return Err(RepositoryError::ResourceInUse { id, host_count });
        }

        state.images.retain(|_, image| image.resource_id() != id);
        state
            .attribute_sets
            .retain(|_, set| set.resource_id() != id);
        state.name_index.remove(&name);
        state.resources.remove(&id);
        Ok(())
    }

    async fn add_image(&self, image: &Image) -> RepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;

        if !state.resources.contains_key(&image.resource_id()) {
            return Err(RepositoryError::NotFound(image.resource_id()));
        }
        state.images.insert(image.id(), image.clone());
        Ok(())
    }

    async fn images_for(&self, id: ComputeResourceId) -> RepositoryResult<Vec<Image>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .images
            .values()
            .filter(|image| image.resource_id() == id)
            .cloned()
            .collect())
    }

    async fn remove_image(&self, id: ImageId) -> RepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state
            .images
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::ImageNotFound(id))
    }

    async fn set_compute_attributes(
        &self,
        attributes: &ComputeAttribute,
    ) -> RepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;

        if !state.resources.contains_key(&attributes.resource_id()) {
            return Err(RepositoryError::NotFound(attributes.resource_id()));
        }
        let key = (
            attributes.profile_id().into_inner(),
            attributes.resource_id().into_inner(),
        );
        state.attribute_sets.insert(key, attributes.clone());
        Ok(())
    }

    async fn compute_attributes_for(
        &self,
        id: ComputeResourceId,
    ) -> RepositoryResult<Vec<ComputeAttribute>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .attribute_sets
            .values()
            .filter(|set| set.resource_id() == id)
            .cloned()
            .collect())
    }

    async fn attach_host(
        &self,
        host: HostId,
        resource: ComputeResourceId,
    ) -> RepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;

        if !state.resources.contains_key(&resource) {
            return Err(RepositoryError::NotFound(resource));
        }
        state.host_links.insert((host, resource));
        Ok(())
    }

    async fn detach_host(
        &self,
        host: HostId,
        resource: ComputeResourceId,
    ) -> RepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.host_links.remove(&(host, resource));
        Ok(())
    }

    async fn host_count(&self, resource: ComputeResourceId) -> RepositoryResult<usize> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .host_links
            .iter()
            .filter(|(_, linked)| *linked == resource)
            .count())
    }
}
