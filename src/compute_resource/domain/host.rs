//! Host read-model consumed during attribute reconciliation.
//!
//! Hosts are owned by the surrounding system; reconciliation only reads the
//! VM name, the provisioning method, and the ordered network interface
//! list. Nothing is ever written back to a host through this module.

use super::AttrMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// How a host's operating system is put onto the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisionMethod {
    /// Network boot and install from media.
    Build,
    /// Clone from a backend image.
    Image,
}

impl ProvisionMethod {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for ProvisionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProvisionMethod {
    type Error = ParseProvisionMethodError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "build" => Ok(Self::Build),
            "image" => Ok(Self::Image),
            _ => Err(ParseProvisionMethodError(value.to_owned())),
        }
    }
}

/// Error returned while parsing a provision method.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown provision method: {0}")]
pub struct ParseProvisionMethodError(pub String);

/// One network interface of a host definition.
///
/// Only physical interfaces are sent to the backend; virtual interfaces
/// (VLANs, bonds' members' aliases) are filtered out during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInterface {
    physical: bool,
    ip: Option<String>,
    ip6: Option<String>,
    compute_attributes: AttrMap,
}

impl HostInterface {
    /// Creates an interface, physical or virtual.
    #[must_use]
    pub fn new(physical: bool) -> Self {
        Self {
            physical,
            ip: None,
            ip6: None,
            compute_attributes: AttrMap::new(),
        }
    }

    /// Sets the IPv4 address.
    #[must_use]
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    /// Sets the IPv6 address.
    #[must_use]
    pub fn with_ip6(mut self, ip6: impl Into<String>) -> Self {
        self.ip6 = Some(ip6.into());
        self
    }

    /// Sets the backend-specific interface attributes (bridge, model, ...).
    #[must_use]
    pub fn with_compute_attributes(mut self, attributes: AttrMap) -> Self {
        self.compute_attributes = attributes;
        self
    }

    /// Returns whether the interface is physical.
    #[must_use]
    pub const fn physical(&self) -> bool {
        self.physical
    }

    /// Returns the IPv4 address, if assigned.
    #[must_use]
    pub fn ip(&self) -> Option<&str> {
        self.ip.as_deref()
    }

    /// Returns the IPv6 address, if assigned.
    #[must_use]
    pub fn ip6(&self) -> Option<&str> {
        self.ip6.as_deref()
    }

    /// Returns the backend-specific interface attributes.
    #[must_use]
    pub const fn compute_attributes(&self) -> &AttrMap {
        &self.compute_attributes
    }
}

/// Host definition read during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostDefinition {
    vm_name: String,
    provision_method: ProvisionMethod,
    interfaces: Vec<HostInterface>,
}

impl HostDefinition {
    /// Creates a host definition with no interfaces.
    #[must_use]
    pub fn new(vm_name: impl Into<String>, provision_method: ProvisionMethod) -> Self {
        Self {
            vm_name: vm_name.into(),
            provision_method,
            interfaces: Vec::new(),
        }
    }

    /// Appends a network interface, keeping declaration order.
    #[must_use]
    pub fn with_interface(mut self, interface: HostInterface) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Returns the name the VM should carry on the backend.
    #[must_use]
    pub fn vm_name(&self) -> &str {
        &self.vm_name
    }

    /// Returns the provisioning method.
    #[must_use]
    pub const fn provision_method(&self) -> ProvisionMethod {
        self.provision_method
    }

    /// Returns the ordered interface list.
    #[must_use]
    pub fn interfaces(&self) -> &[HostInterface] {
        &self.interfaces
    }
}
