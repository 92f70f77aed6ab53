//! Unit tests for bound resource VM lifecycle delegation.

use std::sync::Arc;

use crate::compute_resource::adapters::memory::InMemoryRemoteClient;
use crate::compute_resource::adapters::providers::Libvirt;
use crate::compute_resource::domain::{
    AttrMap, ProviderName, RemoteInterface, RemoteServer, RemoteVolume, ResourceValidationError,
    ServerState, attr_map,
};
use crate::compute_resource::ports::{
    ProviderConfig, ProviderError, RemoteClient, RemoteClientError, RemoteClientResult,
};
use crate::compute_resource::services::registry::{ProviderDescriptor, ProviderRegistry};
use crate::compute_resource::tests::support::{
    FIXED_TIMESTAMP, FixedClock, bound_libvirt_resource, sample_request,
};
use async_trait::async_trait;
use mockall::mock;
use rstest::rstest;
use serde_json::json;

mock! {
    pub Client {}

    #[async_trait]
    impl RemoteClient for Client {
        async fn list_servers(&self) -> RemoteClientResult<Vec<RemoteServer>>;
        async fn get_server(&self, identity: &str) -> RemoteClientResult<RemoteServer>;
        async fn create_server(&self, params: AttrMap) -> RemoteClientResult<RemoteServer>;
        async fn start_server(&self, identity: &str) -> RemoteClientResult<()>;
        async fn stop_server(&self, identity: &str) -> RemoteClientResult<()>;
        async fn destroy_server(&self, identity: &str) -> RemoteClientResult<()>;
        async fn list_interfaces(&self) -> RemoteClientResult<Vec<RemoteInterface>>;
        async fn create_interface(&self, params: AttrMap) -> RemoteClientResult<RemoteInterface>;
    }
}

/// Registry whose `Libvirt` descriptor injects the given mock client.
fn registry_with_mock(client: MockClient) -> ProviderRegistry {
    let shared: Arc<dyn RemoteClient> = Arc::new(client);
    let mut registry = crate::compute_resource::adapters::providers::builtin_registry();
    registry.register(ProviderDescriptor::new(
        ProviderName::new("Libvirt").expect("valid provider name"),
        move |resource| {
            Arc::new(
                Libvirt::new(ProviderConfig::from_resource(resource))
                    .with_client(Arc::clone(&shared)),
            )
        },
    ));
    registry
}

fn backend_failure() -> RemoteClientError {
    RemoteClientError::backend(std::io::Error::other("backend exploded"))
}

// ── create_vm ──────────────────────────────────────────────────────

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_vm_generates_a_unique_default_name() {
    let client = InMemoryRemoteClient::new();
    let (_registry, bound) = bound_libvirt_resource(&client);

    let vm = bound
        .create_vm(AttrMap::new())
        .await
        .expect("creation should succeed");

    assert_eq!(vm.name(), format!("foundry_{FIXED_TIMESTAMP}"));
    assert_eq!(vm.state(), ServerState::Running);
    assert_eq!(client.server_count(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_vm_lets_caller_arguments_win_over_defaults() {
    let client = InMemoryRemoteClient::new();
    let (_registry, bound) = bound_libvirt_resource(&client);

    let vm = bound
        .create_vm(attr_map([("name", "web01"), ("memory", "2048")]))
        .await
        .expect("creation should succeed");

    assert_eq!(vm.name(), "web01");
    assert_eq!(vm.attributes().get("memory"), Some(&json!("2048")));
}

// ── find / start / stop ────────────────────────────────────────────

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn find_vm_reports_missing_vms() {
    let client = InMemoryRemoteClient::new();
    let (_registry, bound) = bound_libvirt_resource(&client);

    let result = bound.find_vm("no-such-uuid").await;
    assert!(matches!(
        result,
        Err(ProviderError::VmNotFound(uuid)) if uuid == "no-such-uuid"
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn start_and_stop_toggle_the_reported_state() {
    let client = InMemoryRemoteClient::new()
        .with_server(RemoteServer::new("uuid-1", "web01", ServerState::Stopped));
    let (_registry, bound) = bound_libvirt_resource(&client);

    bound.start_vm("uuid-1").await.expect("start should succeed");
    let running = bound.find_vm("uuid-1").await.expect("vm exists");
    assert_eq!(running.state(), ServerState::Running);

    bound.stop_vm("uuid-1").await.expect("stop should succeed");
    let stopped = bound.find_vm("uuid-1").await.expect("vm exists");
    assert_eq!(stopped.state(), ServerState::Stopped);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn start_vm_on_missing_vm_reports_not_found() {
    let client = InMemoryRemoteClient::new();
    let (_registry, bound) = bound_libvirt_resource(&client);

    let result = bound.start_vm("no-such-uuid").await;
    assert!(matches!(result, Err(ProviderError::VmNotFound(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn list_vms_returns_every_defined_server() {
    let client = InMemoryRemoteClient::new()
        .with_server(RemoteServer::new("uuid-1", "web01", ServerState::Running))
        .with_server(RemoteServer::new("uuid-2", "db01", ServerState::Stopped));
    let (_registry, bound) = bound_libvirt_resource(&client);

    let vms = bound.list_vms().await.expect("listing should succeed");
    assert_eq!(vms.len(), 2);
}

// ── destroy ────────────────────────────────────────────────────────

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn destroy_vm_removes_the_server() {
    let client = InMemoryRemoteClient::new()
        .with_server(RemoteServer::new("uuid-1", "web01", ServerState::Running));
    let (_registry, bound) = bound_libvirt_resource(&client);

    bound
        .destroy_vm("uuid-1")
        .await
        .expect("destroy should succeed");
    assert_eq!(client.server_count(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn destroying_an_absent_vm_is_silent_success() {
    let client = InMemoryRemoteClient::new();
    let (_registry, bound) = bound_libvirt_resource(&client);

    assert!(bound.destroy_vm("already-gone").await.is_ok());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn destroy_swallows_a_lookup_destroy_race() {
    let mut client = MockClient::new();
    client
        .expect_get_server()
        .returning(|identity| Ok(RemoteServer::new(identity, "web01", ServerState::Running)));
    client
        .expect_destroy_server()
        .returning(|identity| Err(RemoteClientError::ServerNotFound(identity.to_owned())));

    let registry = registry_with_mock(client);
    let bound = registry
        .create(Some("Libvirt"), sample_request(), Arc::new(FixedClock))
        .expect("factory should succeed");

    assert!(bound.destroy_vm("uuid-1").await.is_ok());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn destroy_propagates_backend_failures() {
    let mut client = MockClient::new();
    client
        .expect_get_server()
        .returning(|identity| Ok(RemoteServer::new(identity, "web01", ServerState::Running)));
    client
        .expect_destroy_server()
        .returning(|_| Err(backend_failure()));

    let registry = registry_with_mock(client);
    let bound = registry
        .create(Some("Libvirt"), sample_request(), Arc::new(FixedClock))
        .expect("factory should succeed");

    let result = bound.destroy_vm("uuid-1").await;
    assert!(matches!(result, Err(ProviderError::Backend(_))));
}

// ── vm_compute_attributes_for ──────────────────────────────────────

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn vm_attributes_are_shaped_for_reconciliation() {
    let client = InMemoryRemoteClient::new().with_server(
        RemoteServer::new("uuid-1", "web01", ServerState::Running)
            .with_attribute("memory", 2048)
            .with_volumes(vec![RemoteVolume::new(attr_map([("size_gb", 20)]))]),
    );
    let (_registry, bound) = bound_libvirt_resource(&client);

    let attrs = bound
        .vm_compute_attributes_for("uuid-1")
        .await
        .expect("extraction should succeed");

    assert!(attrs.get("id").is_none());
    assert_eq!(attrs.get("memory"), Some(&json!(2048)));
    assert!(attrs.contains_key("volumes_attributes"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn vm_attributes_for_a_missing_vm_degrade_to_empty() {
    let client = InMemoryRemoteClient::new();
    let (_registry, bound) = bound_libvirt_resource(&client);

    let attrs = bound
        .vm_compute_attributes_for("already-gone")
        .await
        .expect("missing VM is not an error here");
    assert!(attrs.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn vm_attributes_propagate_backend_failures() {
    let mut client = MockClient::new();
    client
        .expect_get_server()
        .returning(|_| Err(backend_failure()));

    let registry = registry_with_mock(client);
    let bound = registry
        .create(Some("Libvirt"), sample_request(), Arc::new(FixedClock))
        .expect("factory should succeed");

    let result = bound.vm_compute_attributes_for("uuid-1").await;
    assert!(matches!(result, Err(ProviderError::Backend(_))));
}

// ── test_connection / binding ──────────────────────────────────────

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn test_connection_passes_for_a_valid_bound_resource() {
    let client = InMemoryRemoteClient::new();
    let (registry, bound) = bound_libvirt_resource(&client);

    assert!(bound.test_connection(&registry).await.is_ok());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn test_connection_collects_unknown_provider_errors() {
    let client = InMemoryRemoteClient::new();
    let (_registry, bound) = bound_libvirt_resource(&client);

    let empty = ProviderRegistry::new();
    let result = bound.test_connection(&empty).await;

    assert!(matches!(
        result,
        Err(crate::compute_resource::services::lifecycle::TestConnectionError::Validation(
            ResourceValidationError::UnknownProvider(name)
        )) if name == "Libvirt"
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn bound_resource_rejects_provider_switches() {
    let client = InMemoryRemoteClient::new();
    let (_registry, bound) = bound_libvirt_resource(&client);

    assert!(bound.rebind_provider("Libvirt").is_ok());
    assert!(matches!(
        bound.rebind_provider("EC2"),
        Err(ResourceValidationError::ProviderChangeRejected)
    ));
}

// ── defaults on the provider surface ───────────────────────────────

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn console_is_unsupported_by_default() {
    let client = InMemoryRemoteClient::new();
    let (_registry, bound) = bound_libvirt_resource(&client);

    let result = bound.provider().console("uuid-1").await;
    assert!(matches!(
        result,
        Err(ProviderError::NotSupported { operation, .. }) if operation == "console"
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn operations_without_a_client_report_not_implemented() {
    let registry = crate::compute_resource::adapters::providers::builtin_registry();
    let bound = registry
        .create(Some("Vmware"), sample_request(), Arc::new(FixedClock))
        .expect("factory should succeed");

    let result = bound.list_vms().await;
    assert!(matches!(
        result,
        Err(ProviderError::NotImplemented { operation, .. }) if operation == "client"
    ));
}
