//! Unit tests for the provider registry and resource factory.

use std::sync::Arc;

use crate::compute_resource::adapters::providers::builtin_registry;
use crate::compute_resource::domain::{NewComputeResource, ProviderName, ResourceValidationError};
use crate::compute_resource::ports::ProviderConfig;
use crate::compute_resource::services::registry::{ProviderDescriptor, RegistryError};
use crate::compute_resource::tests::support::{FixedClock, StubProvider, sample_request};
use rstest::rstest;

fn provider_name(name: &str) -> ProviderName {
    ProviderName::new(name).expect("valid provider name")
}

fn stub_descriptor(name: &'static str, friendly: &'static str) -> ProviderDescriptor {
    ProviderDescriptor::new(provider_name(name), move |resource| {
        Arc::new(StubProvider::new(
            name,
            friendly,
            ProviderConfig::from_resource(resource),
        ))
    })
}

// ── builtin list ───────────────────────────────────────────────────

#[rstest]
fn builtin_list_contains_the_compiled_in_providers() {
    let registry = builtin_registry();
    let names: Vec<_> = registry
        .builtin_providers()
        .keys()
        .map(ProviderName::as_str)
        .collect();

    for expected in [
        "Libvirt",
        "Ovirt",
        "EC2",
        "Vmware",
        "Openstack",
        "Rackspace",
        "GCE",
    ] {
        assert!(names.contains(&expected), "missing builtin {expected}");
    }
    assert_eq!(names.len(), 7);
    assert!(registry.registered_providers().is_empty());
}

#[rstest]
fn builtins_are_all_available() {
    let registry = builtin_registry();
    assert_eq!(registry.available_providers().len(), 7);
}

// ── plugin registration ────────────────────────────────────────────

#[rstest]
fn registered_provider_joins_the_available_union() {
    let mut registry = builtin_registry();
    registry.register(stub_descriptor("Proxmox", "Proxmox VE"));

    let available = registry.available_providers();
    assert_eq!(available.len(), 8);
    assert!(available.contains_key(&provider_name("Proxmox")));
}

#[rstest]
fn last_registration_wins_name_collisions() {
    let mut registry = builtin_registry();
    registry.register(stub_descriptor("Proxmox", "Proxmox VE (first)"));
    registry.register(stub_descriptor("Proxmox", "Proxmox VE (second)"));

    let bound = registry
        .create(Some("Proxmox"), sample_request(), Arc::new(FixedClock))
        .expect("factory should bind the plugin provider");
    assert_eq!(bound.provider().friendly_name(), "Proxmox VE (second)");
}

#[rstest]
fn registered_provider_shadows_builtin_of_same_name() {
    let mut registry = builtin_registry();
    registry.register(stub_descriptor("Libvirt", "Patched Libvirt"));

    let bound = registry
        .create(Some("Libvirt"), sample_request(), Arc::new(FixedClock))
        .expect("factory should bind the plugin provider");
    assert_eq!(bound.provider().friendly_name(), "Patched Libvirt");
}

#[rstest]
fn unavailable_provider_is_filtered_out() {
    let mut registry = builtin_registry();
    registry.register(
        stub_descriptor("Proxmox", "Proxmox VE").with_availability(|| false),
    );

    assert!(
        !registry
            .available_providers()
            .contains_key(&provider_name("Proxmox"))
    );

    let result = registry.create(Some("Proxmox"), sample_request(), Arc::new(FixedClock));
    assert!(matches!(
        result,
        Err(RegistryError::UnknownProvider(name)) if name == "Proxmox"
    ));
}

// ── resolve ────────────────────────────────────────────────────────

#[rstest]
fn resolve_finds_builtin_descriptors_by_exact_name() {
    let registry = builtin_registry();
    let descriptor = registry.resolve("Libvirt").expect("should resolve");
    assert_eq!(descriptor.name().as_str(), "Libvirt");
}

#[rstest]
fn resolve_rejects_unknown_names() {
    let registry = builtin_registry();
    let result = registry.resolve("DigitalOcean");
    assert!(matches!(
        result,
        Err(RegistryError::UnknownProvider(name)) if name == "DigitalOcean"
    ));
}

// ── factory ────────────────────────────────────────────────────────

#[rstest]
fn create_matches_provider_names_case_insensitively() {
    let registry = builtin_registry();
    let bound = registry
        .create(Some("libvirt"), sample_request(), Arc::new(FixedClock))
        .expect("factory should match case-insensitively");

    assert_eq!(bound.resource().provider().as_str(), "Libvirt");
}

#[rstest]
fn create_sanitizes_the_url_end_to_end() {
    let registry = builtin_registry();
    let bound = registry
        .create(
            Some("Libvirt"),
            NewComputeResource::new("vm1", "http://host/"),
            Arc::new(FixedClock),
        )
        .expect("factory should succeed");

    assert_eq!(bound.resource().url().as_str(), "http://host");
}

#[rstest]
fn create_without_provider_is_rejected() {
    let registry = builtin_registry();
    let result = registry.create(None, sample_request(), Arc::new(FixedClock));
    assert!(matches!(result, Err(RegistryError::MissingProvider)));
}

#[rstest]
#[case("DigitalOcean")]
#[case("")]
fn create_with_unknown_provider_is_rejected(#[case] requested: &str) {
    let registry = builtin_registry();
    let result = registry.create(Some(requested), sample_request(), Arc::new(FixedClock));
    assert!(matches!(result, Err(RegistryError::UnknownProvider(_))));
}

#[rstest]
fn create_collects_field_validation_errors() {
    let registry = builtin_registry();
    let result = registry.create(
        Some("Libvirt"),
        NewComputeResource::new("", ""),
        Arc::new(FixedClock),
    );

    match result {
        Err(RegistryError::Validation(ResourceValidationError::Multiple(errors))) => {
            assert_eq!(errors.len(), 2);
        }
        Err(other) => panic!("expected collected validation errors, got {other:?}"),
        Ok(_) => panic!("expected collected validation errors, got a bound resource"),
    }
}

#[rstest]
fn to_label_combines_name_and_friendly_provider_name() {
    let registry = builtin_registry();
    let bound = registry
        .create(Some("Ovirt"), sample_request(), Arc::new(FixedClock))
        .expect("factory should succeed");

    assert_eq!(bound.to_label(), "vm1 (oVirt)");
}

// ── bind (persisted records) ───────────────────────────────────────

#[rstest]
fn bind_reattaches_a_persisted_record_to_its_provider() {
    let registry = builtin_registry();
    let bound = registry
        .create(Some("GCE"), sample_request(), Arc::new(FixedClock))
        .expect("factory should succeed");
    let record = bound.resource().clone();

    let rebound = registry
        .bind(record, Arc::new(FixedClock))
        .expect("bind should succeed");
    assert_eq!(rebound.provider().friendly_name(), "Google Compute Engine");
}

#[rstest]
fn bind_rejects_records_whose_provider_disappeared() {
    let registry = builtin_registry();
    let bound = registry
        .create(Some("Libvirt"), sample_request(), Arc::new(FixedClock))
        .expect("factory should succeed");
    let record = bound.resource().clone();

    let empty = crate::compute_resource::services::registry::ProviderRegistry::new();
    let result = empty.bind(record, Arc::new(FixedClock));
    assert!(matches!(result, Err(RegistryError::UnknownProvider(_))));
}
