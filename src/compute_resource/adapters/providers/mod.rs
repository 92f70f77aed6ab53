//! Compiled-in backend provider implementations.
//!
//! Each provider is a thin [`crate::compute_resource::ports::Provider`]
//! implementation: it carries the bound connection configuration, an
//! optional injected remote client, and the capability flags its backend
//! genuinely differs on. Wire clients themselves are injected by the
//! surrounding system (`with_client`); a provider without one reports its
//! `client` seam as not implemented.

mod ec2;
mod gce;
mod libvirt;
mod openstack;
mod ovirt;
mod rackspace;
mod vmware;

pub use ec2::Ec2;
pub use gce::Gce;
pub use libvirt::Libvirt;
pub use openstack::Openstack;
pub use ovirt::Ovirt;
pub use rackspace::Rackspace;
pub use vmware::Vmware;

use crate::compute_resource::domain::ProviderName;
use crate::compute_resource::ports::ProviderConfig;
use crate::compute_resource::services::registry::{ProviderDescriptor, ProviderRegistry};
use std::sync::Arc;

/// Builds the compiled-in provider descriptor list.
///
/// None of the builtin descriptors carries an availability probe: the
/// concrete wire clients are injected rather than linked in, so there is
/// no native prerequisite to probe for. Plugins register probes through
/// [`ProviderDescriptor::with_availability`].
#[must_use]
pub fn builtin_descriptors() -> Vec<ProviderDescriptor> {
    vec![
        ProviderDescriptor::new(ProviderName::from_static(Libvirt::NAME), |resource| {
            Arc::new(Libvirt::new(ProviderConfig::from_resource(resource)))
        }),
        ProviderDescriptor::new(ProviderName::from_static(Ovirt::NAME), |resource| {
            Arc::new(Ovirt::new(ProviderConfig::from_resource(resource)))
        }),
        ProviderDescriptor::new(ProviderName::from_static(Ec2::NAME), |resource| {
            Arc::new(Ec2::new(ProviderConfig::from_resource(resource)))
        }),
        ProviderDescriptor::new(ProviderName::from_static(Vmware::NAME), |resource| {
            Arc::new(Vmware::new(ProviderConfig::from_resource(resource)))
        }),
        ProviderDescriptor::new(ProviderName::from_static(Openstack::NAME), |resource| {
            Arc::new(Openstack::new(ProviderConfig::from_resource(resource)))
        }),
        ProviderDescriptor::new(ProviderName::from_static(Rackspace::NAME), |resource| {
            Arc::new(Rackspace::new(ProviderConfig::from_resource(resource)))
        }),
        ProviderDescriptor::new(ProviderName::from_static(Gce::NAME), |resource| {
            Arc::new(Gce::new(ProviderConfig::from_resource(resource)))
        }),
    ]
}

/// Builds a registry pre-populated with the compiled-in providers.
#[must_use]
pub fn builtin_registry() -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    for descriptor in builtin_descriptors() {
        registry.register_builtin(descriptor);
    }
    registry
}
