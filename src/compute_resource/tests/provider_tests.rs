//! Unit tests for the compiled-in provider implementations.

use crate::compute_resource::adapters::providers::{
    Ec2, Gce, Libvirt, Openstack, Ovirt, Rackspace, Vmware,
};
use crate::compute_resource::domain::{Capability, EndpointUrl, attr_map};
use crate::compute_resource::ports::{Provider, ProviderConfig, ProviderError};
use rstest::rstest;
use serde_json::json;

fn config() -> ProviderConfig {
    ProviderConfig::new(
        EndpointUrl::new("http://host").expect("valid url"),
        None,
        attr_map([("datacenter", "dc1")]),
    )
}

fn config_with_networks() -> ProviderConfig {
    ProviderConfig::new(
        EndpointUrl::new("http://host").expect("valid url"),
        None,
        attr_map([("networks", json!(["br0", "br1"]))]),
    )
}

// ── identity ───────────────────────────────────────────────────────

#[rstest]
fn friendly_names_match_the_marketing_spelling() {
    assert_eq!(Libvirt::new(config()).friendly_name(), "Libvirt");
    assert_eq!(Ovirt::new(config()).friendly_name(), "oVirt");
    assert_eq!(Ec2::new(config()).friendly_name(), "EC2");
    assert_eq!(Vmware::new(config()).friendly_name(), "VMware");
    assert_eq!(Openstack::new(config()).friendly_name(), "OpenStack");
    assert_eq!(Rackspace::new(config()).friendly_name(), "Rackspace");
    assert_eq!(Gce::new(config()).friendly_name(), "Google Compute Engine");
}

// ── capability flags ───────────────────────────────────────────────

#[rstest]
fn hypervisor_providers_support_builds_and_volumes() {
    for capabilities in [
        Libvirt::new(config()).capabilities(),
        Ovirt::new(config()).capabilities(),
        Vmware::new(config()).capabilities(),
    ] {
        assert!(capabilities.contains(&Capability::Build));
        assert!(capabilities.contains(&Capability::NewVolume));
    }
}

#[rstest]
fn cloud_providers_are_image_only() {
    for capabilities in [
        Ec2::new(config()).capabilities(),
        Openstack::new(config()).capabilities(),
        Rackspace::new(config()).capabilities(),
    ] {
        assert!(capabilities.contains(&Capability::Image));
        assert!(!capabilities.contains(&Capability::Build));
    }
}

#[rstest]
fn update_support_is_limited_to_hypervisors() {
    assert!(Libvirt::new(config()).supports_update());
    assert!(Ovirt::new(config()).supports_update());
    assert!(Vmware::new(config()).supports_update());
    assert!(!Ec2::new(config()).supports_update());
    assert!(!Gce::new(config()).supports_update());
}

#[rstest]
fn pagination_is_limited_to_engine_backed_inventories() {
    assert!(Ovirt::new(config()).supports_vms_pagination());
    assert!(Vmware::new(config()).supports_vms_pagination());
    assert!(!Libvirt::new(config()).supports_vms_pagination());
}

#[rstest]
fn console_passwords_are_limited_to_graphics_capable_backends() {
    assert!(Libvirt::new(config()).set_console_password());
    assert!(Vmware::new(config()).set_console_password());
    assert!(!Ec2::new(config()).set_console_password());
}

#[rstest]
fn user_data_is_a_cloud_feature() {
    assert!(Ec2::new(config()).user_data_supported());
    assert!(Openstack::new(config()).user_data_supported());
    assert!(Rackspace::new(config()).user_data_supported());
    assert!(Gce::new(config()).user_data_supported());
    assert!(!Libvirt::new(config()).user_data_supported());
}

// ── provided attributes ────────────────────────────────────────────

#[rstest]
fn every_provider_reports_the_vm_identity() {
    let providers: Vec<Box<dyn Provider>> = vec![
        Box::new(Libvirt::new(config())),
        Box::new(Ovirt::new(config())),
        Box::new(Ec2::new(config())),
        Box::new(Vmware::new(config())),
        Box::new(Openstack::new(config())),
        Box::new(Rackspace::new(config())),
        Box::new(Gce::new(config())),
    ];

    for provider in providers {
        assert_eq!(
            provider.provided_attributes().get("uuid"),
            Some(&"identity"),
            "{} must provide the identity",
            provider.name()
        );
    }
}

#[rstest]
fn cloud_providers_report_their_public_ip_source() {
    assert_eq!(
        Ec2::new(config()).provided_attributes().get("ip"),
        Some(&"public_ip_address")
    );
    assert_eq!(
        Openstack::new(config()).provided_attributes().get("ip"),
        Some(&"floating_ip_address")
    );
}

// ── network interface editing ──────────────────────────────────────

#[rstest]
fn interfaces_are_editable_only_with_configured_networks() {
    assert!(!Libvirt::new(config()).editable_network_interfaces());
    assert!(Libvirt::new(config_with_networks()).editable_network_interfaces());
}

// ── defaults ───────────────────────────────────────────────────────

#[rstest]
fn client_seam_is_not_implemented_without_injection() {
    let result = Libvirt::new(config()).client();
    assert!(matches!(
        result,
        Err(ProviderError::NotImplemented { provider, operation })
            if provider == "Libvirt" && operation == "client"
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn infrastructure_enumerators_default_to_not_supported() {
    let provider = Rackspace::new(config());

    for result in [
        provider.available_zones().await,
        provider.available_networks().await,
        provider.available_clusters().await,
        provider.available_folders().await,
        provider.available_flavors().await,
        provider.available_resource_pools().await,
        provider.available_security_groups().await,
        provider.available_storage_domains().await,
        provider.available_storage_pods().await,
    ] {
        assert!(matches!(result, Err(ProviderError::NotSupported { .. })));
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn available_images_default_to_an_empty_catalogue() {
    let images = Gce::new(config())
        .available_images()
        .await
        .expect("empty catalogue, not an error");
    assert!(images.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn image_existence_is_assumed_by_default() {
    assert!(
        Ovirt::new(config())
            .image_exists("template-1")
            .await
            .expect("no probe by default")
    );
}
