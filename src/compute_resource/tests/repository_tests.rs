//! Unit tests for the in-memory compute resource repository.

use crate::compute_resource::adapters::memory::InMemoryComputeResources;
use crate::compute_resource::domain::{
    ComputeAttribute, ComputeProfileId, ComputeResource, HostId, Image, NewComputeResource,
    ProviderName, ResourceName, attr_map,
};
use crate::compute_resource::ports::{ComputeResourceRepository, RepositoryError};
use crate::compute_resource::tests::support::FixedClock;
use rstest::{fixture, rstest};

#[fixture]
fn repository() -> InMemoryComputeResources {
    InMemoryComputeResources::new()
}

fn resource(name: &str) -> ComputeResource {
    ComputeResource::new(
        NewComputeResource::new(name, "http://host/"),
        ProviderName::new("Libvirt").expect("valid provider name"),
        &FixedClock,
    )
    .expect("valid resource")
}

async fn saved_resource(
    repository: &InMemoryComputeResources,
    name: &str,
) -> ComputeResource {
    let record = resource(name);
    repository.save(&record).await.expect("save should succeed");
    record
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn save_and_retrieve_by_id_and_name(repository: InMemoryComputeResources) {
    let record = saved_resource(&repository, "cluster-a").await;

    let by_id = repository
        .find_by_id(record.id())
        .await
        .expect("lookup should succeed");
    assert_eq!(by_id, Some(record.clone()));

    let by_name = repository
        .find_by_name(&ResourceName::new("cluster-a").expect("valid name"))
        .await
        .expect("lookup should succeed");
    assert_eq!(by_name, Some(record));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_name_is_rejected(repository: InMemoryComputeResources) {
    saved_resource(&repository, "cluster-a").await;

    let duplicate = repository.save(&resource("cluster-a")).await;
    assert!(matches!(
        duplicate,
        Err(RepositoryError::DuplicateResourceName(_))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_rejects_provider_changes(repository: InMemoryComputeResources) {
    let record = saved_resource(&repository, "cluster-a").await;

    // Rebuild the same record under a different provider tag to simulate a
    // tampered update payload.
    let data_swap = ComputeResource::from_persisted(
        crate::compute_resource::domain::PersistedComputeResourceData {
            id: record.id(),
            name: record.name().clone(),
            provider: ProviderName::new("EC2").expect("valid name"),
            url: record.url().clone(),
            password: None,
            attrs: record.attrs().clone(),
            created_at: record.created_at(),
            updated_at: record.updated_at(),
        },
    );

    let result = repository.update(&data_swap).await;
    assert!(matches!(
        result,
        Err(RepositoryError::ProviderImmutable(id)) if id == record.id()
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_rejects_rename_collisions(repository: InMemoryComputeResources) {
    saved_resource(&repository, "cluster-a").await;
    let mut second = saved_resource(&repository, "cluster-b").await;

    second
        .rename("cluster-a", &FixedClock)
        .expect("valid name");
    let result = repository.update(&second).await;
    assert!(matches!(
        result,
        Err(RepositoryError::DuplicateResourceName(_))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_cascades_to_owned_records(repository: InMemoryComputeResources) {
    let record = saved_resource(&repository, "cluster-a").await;

    let image = Image::new(record.id(), "Debian 13", "ami-1", &FixedClock).expect("valid image");
    repository
        .add_image(&image)
        .await
        .expect("image registration should succeed");

    let attributes = ComputeAttribute::new(
        ComputeProfileId::new(),
        record.id(),
        attr_map([("cpus", 2)]),
        &FixedClock,
    );
    repository
        .set_compute_attributes(&attributes)
        .await
        .expect("attribute defaults should persist");

    repository
        .delete(record.id())
        .await
        .expect("delete should succeed");

    assert!(
        repository
            .images_for(record.id())
            .await
            .expect("listing should succeed")
            .is_empty()
    );
    assert!(
        repository
            .compute_attributes_for(record.id())
            .await
            .expect("listing should succeed")
            .is_empty()
    );
    assert_eq!(
        repository
            .find_by_id(record.id())
            .await
            .expect("lookup should succeed"),
        None
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_is_blocked_while_hosts_reference_the_resource(
    repository: InMemoryComputeResources,
) {
    let record = saved_resource(&repository, "cluster-a").await;
    let host = HostId::new();

    repository
        .attach_host(host, record.id())
        .await
        .expect("attach should succeed");

    let blocked = repository.delete(record.id()).await;
    assert!(matches!(
        blocked,
        Err(RepositoryError::ResourceInUse { host_count: 1, .. })
    ));

    repository
        .detach_host(host, record.id())
        .await
        .expect("detach should succeed");
    assert!(repository.delete(record.id()).await.is_ok());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn attaching_the_same_host_twice_counts_once(repository: InMemoryComputeResources) {
    let record = saved_resource(&repository, "cluster-a").await;
    let host = HostId::new();

    repository
        .attach_host(host, record.id())
        .await
        .expect("attach should succeed");
    repository
        .attach_host(host, record.id())
        .await
        .expect("re-attach is a no-op");

    assert_eq!(
        repository
            .host_count(record.id())
            .await
            .expect("count should succeed"),
        1
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn image_registration_requires_an_existing_resource(
    repository: InMemoryComputeResources,
) {
    let orphan = resource("never-saved");
    let image = Image::new(orphan.id(), "Debian 13", "ami-1", &FixedClock).expect("valid image");

    let result = repository.add_image(&image).await;
    assert!(matches!(result, Err(RepositoryError::NotFound(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn profile_attribute_defaults_upsert_per_profile(repository: InMemoryComputeResources) {
    let record = saved_resource(&repository, "cluster-a").await;
    let profile = ComputeProfileId::new();

    let first = ComputeAttribute::new(profile, record.id(), attr_map([("cpus", 2)]), &FixedClock);
    repository
        .set_compute_attributes(&first)
        .await
        .expect("first set should persist");

    let second = ComputeAttribute::new(profile, record.id(), attr_map([("cpus", 8)]), &FixedClock);
    repository
        .set_compute_attributes(&second)
        .await
        .expect("second set should replace the first");

    let stored = repository
        .compute_attributes_for(record.id())
        .await
        .expect("listing should succeed");
    assert_eq!(stored.len(), 1);
    assert_eq!(
        stored.first().and_then(|set| set.vm_attrs().get("cpus")),
        Some(&serde_json::json!(8))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn removing_an_unknown_image_is_an_error(repository: InMemoryComputeResources) {
    let result = repository
        .remove_image(crate::compute_resource::domain::ImageId::new())
        .await;
    assert!(matches!(result, Err(RepositoryError::ImageNotFound(_))));
}
