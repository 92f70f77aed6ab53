//! Domain model for compute resources and their provider bindings.
//!
//! The compute resource domain models connection configuration, provider
//! selection, owned image and profile-attribute records, and the read-model
//! of a host whose definition is applied to a backend. All infrastructure
//! concerns are kept outside the domain boundary.

mod attrs;
mod capability;
mod endpoint;
mod error;
mod host;
mod ids;
mod image;
mod name;
mod profile;
mod provider_name;
mod resource;
mod secret;
mod server;

pub use attrs::{AttrMap, attr_map};
pub use capability::{Capability, ParseCapabilityError};
pub use endpoint::EndpointUrl;
pub use error::ResourceValidationError;
pub use host::{HostDefinition, HostInterface, ParseProvisionMethodError, ProvisionMethod};
pub use ids::{ComputeAttributeId, ComputeProfileId, ComputeResourceId, HostId, ImageId};
pub use image::Image;
pub use name::ResourceName;
pub use profile::{ComputeAttribute, ComputeProfile};
pub use provider_name::ProviderName;
pub use resource::{ComputeResource, NewComputeResource, PersistedComputeResourceData};
pub use secret::Password;
pub use server::{
    ConsoleConnection, ConsoleProtocol, InfrastructureObject, ParseServerStateError,
    RemoteInterface, RemoteServer, RemoteVolume, ServerState,
};
