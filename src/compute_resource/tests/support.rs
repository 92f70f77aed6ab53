//! Shared fixtures for compute resource tests.

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use std::sync::Arc;

use crate::compute_resource::adapters::memory::InMemoryRemoteClient;
use crate::compute_resource::adapters::providers::builtin_registry;
use crate::compute_resource::domain::{NewComputeResource, ProviderName};
use crate::compute_resource::ports::{Provider, ProviderConfig};
use crate::compute_resource::services::lifecycle::BoundResource;
use crate::compute_resource::services::registry::{ProviderDescriptor, ProviderRegistry};

/// Unix timestamp all fixed-clock tests pin to.
pub const FIXED_TIMESTAMP: i64 = 1_700_000_000;

/// Clock frozen at [`FIXED_TIMESTAMP`].
#[derive(Debug, Clone, Copy)]
pub struct FixedClock;

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(FIXED_TIMESTAMP, 0)
            .single()
            .expect("fixed timestamp is valid")
    }
}

/// Provider stub with configurable identity, used by registry tests.
pub struct StubProvider {
    name: &'static str,
    friendly: &'static str,
    config: ProviderConfig,
}

impl StubProvider {
    pub const fn new(
        name: &'static str,
        friendly: &'static str,
        config: ProviderConfig,
    ) -> Self {
        Self {
            name,
            friendly,
            config,
        }
    }
}

impl Provider for StubProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn friendly_name(&self) -> &'static str {
        self.friendly
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

/// Request with valid connection fields.
pub fn sample_request() -> NewComputeResource {
    NewComputeResource::new("vm1", "http://host/")
}

/// Registry whose `Libvirt` descriptor injects the given fake backend.
pub fn registry_with_libvirt_client(client: &InMemoryRemoteClient) -> ProviderRegistry {
    let mut registry = builtin_registry();
    let shared = client.clone();
    registry.register(ProviderDescriptor::new(
        ProviderName::new("Libvirt").expect("valid provider name"),
        move |resource| {
            Arc::new(
                crate::compute_resource::adapters::providers::Libvirt::new(
                    ProviderConfig::from_resource(resource),
                )
                .with_client(Arc::new(shared.clone())),
            )
        },
    ));
    registry
}

/// Creates a bound resource on the fake backend via the registry factory.
pub fn bound_libvirt_resource(
    client: &InMemoryRemoteClient,
) -> (ProviderRegistry, BoundResource<FixedClock>) {
    let registry = registry_with_libvirt_client(client);
    let bound = registry
        .create(Some("Libvirt"), sample_request(), Arc::new(FixedClock))
        .expect("factory should bind Libvirt");
    (registry, bound)
}
