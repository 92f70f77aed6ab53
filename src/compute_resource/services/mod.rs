//! Orchestration services for compute resource management.
//!
//! - [`registry`]: provider discovery and the resource factory
//! - [`lifecycle`]: a resource bound to its provider, delegating VM
//!   operations
//! - [`reconcile`]: host-to-VM attribute shaping and comparison

pub mod lifecycle;
pub mod reconcile;
pub mod registry;

pub use lifecycle::{BoundResource, TestConnectionError};
pub use reconcile::{attrs_differ, host_compute_attrs, parse_nested_params, vm_compute_attrs};
pub use registry::{ProviderDescriptor, ProviderRegistry, RegistryError};
