//! End-to-end provisioning scenarios through the public crate API.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use eyre::eyre;
use foundry::compute_resource::adapters::memory::{
    InMemoryComputeResources, InMemoryRemoteClient,
};
use foundry::compute_resource::adapters::providers::{Libvirt, builtin_registry};
use foundry::compute_resource::domain::{
    HostDefinition, HostInterface, NewComputeResource, ProviderName, ProvisionMethod, attr_map,
};
use foundry::compute_resource::ports::{ComputeResourceRepository, ProviderConfig};
use foundry::compute_resource::services::registry::ProviderDescriptor;
use foundry::compute_resource::services::{attrs_differ, host_compute_attrs};
use mockable::Clock;
use rstest::rstest;

const CREATION_TIME: i64 = 1_700_000_000;

#[derive(Debug, Clone, Copy)]
struct FrozenClock;

impl Clock for FrozenClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(CREATION_TIME, 0)
            .single()
            .expect("fixed timestamp is valid")
    }
}

fn wired_registry(client: &InMemoryRemoteClient) -> eyre::Result<
    foundry::compute_resource::services::registry::ProviderRegistry,
> {
    let mut registry = builtin_registry();
    let shared = client.clone();
    registry.register(ProviderDescriptor::new(
        ProviderName::new("Libvirt").map_err(|err| eyre!(err))?,
        move |resource| {
            Arc::new(
                Libvirt::new(ProviderConfig::from_resource(resource))
                    .with_client(Arc::new(shared.clone())),
            )
        },
    ));
    Ok(registry)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn provision_a_vm_from_a_fresh_resource() -> eyre::Result<()> {
    let backend = InMemoryRemoteClient::new();
    let registry = wired_registry(&backend)?;

    // Bind a resource; the stored URL loses its trailing slash.
    let bound = registry.create(
        Some("libvirt"),
        NewComputeResource::new("vm1", "http://host/").with_password("secret"),
        Arc::new(FrozenClock),
    )?;
    assert_eq!(bound.resource().url().as_str(), "http://host");
    assert_eq!(bound.to_label(), "vm1 (Libvirt)");
    bound.test_connection(&registry).await?;

    // An empty argument map still produces a named VM.
    let vm = bound.create_vm(Default::default()).await?;
    assert_eq!(vm.name(), format!("foundry_{CREATION_TIME}"));

    // The host definition shapes into creation parameters.
    let host = HostDefinition::new("web01", ProvisionMethod::Build)
        .with_interface(
            HostInterface::new(true)
                .with_ip("10.0.0.10")
                .with_compute_attributes(attr_map([("bridge", "br0")])),
        )
        .with_interface(HostInterface::new(false));
    let desired = host_compute_attrs(&host);

    // The live VM differs from the desired definition (different name).
    let actual = bound.vm_compute_attributes_for(vm.identity()).await?;
    assert!(attrs_differ(&actual, &desired));

    // Destroy twice: the second call is silent success.
    bound.destroy_vm(vm.identity()).await?;
    bound.destroy_vm(vm.identity()).await?;
    assert_eq!(backend.server_count(), 0);

    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn persisted_resources_rebind_and_block_deletion_while_referenced() -> eyre::Result<()> {
    let backend = InMemoryRemoteClient::new();
    let registry = wired_registry(&backend)?;
    let repository = InMemoryComputeResources::new();

    let bound = registry.create(
        Some("Libvirt"),
        NewComputeResource::new("cluster-a", "qemu+ssh://root@host/system"),
        Arc::new(FrozenClock),
    )?;
    repository.save(bound.resource()).await?;

    // A referencing host blocks deletion until detached.
    let host = foundry::compute_resource::domain::HostId::new();
    repository.attach_host(host, bound.resource().id()).await?;
    assert!(repository.delete(bound.resource().id()).await.is_err());

    // Reload and rebind the stored record; the provider stays fixed.
    let stored = repository
        .find_by_id(bound.resource().id())
        .await?
        .ok_or_else(|| eyre!("resource should be stored"))?;
    let rebound = registry.bind(stored, Arc::new(FrozenClock))?;
    assert!(rebound.rebind_provider("EC2").is_err());

    repository.detach_host(host, bound.resource().id()).await?;
    repository.delete(bound.resource().id()).await?;

    Ok(())
}
