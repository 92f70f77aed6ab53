//! Compute profiles and per-resource attribute defaults.

use super::{AttrMap, ComputeAttributeId, ComputeProfileId, ComputeResourceId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Named sizing profile (e.g. "1-Small", "2-Medium").
///
/// Profiles are owned by the surrounding system; the minimal shape here is
/// what compute attribute records link against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeProfile {
    id: ComputeProfileId,
    name: String,
}

impl ComputeProfile {
    /// Creates a profile with the given display name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ComputeProfileId::new(),
            name: name.into(),
        }
    }

    /// Returns the profile identifier.
    #[must_use]
    pub const fn id(&self) -> ComputeProfileId {
        self.id
    }

    /// Returns the profile display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Default VM attributes a profile applies on one specific resource.
///
/// One record per `(profile, resource)` pair; cascade-deleted with the
/// resource. The attribute tree uses the same opaque shape the provider's
/// `create_vm` accepts, so profile defaults can be merged straight into
/// creation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeAttribute {
    id: ComputeAttributeId,
    profile_id: ComputeProfileId,
    resource_id: ComputeResourceId,
    vm_attrs: AttrMap,
    created_at: DateTime<Utc>,
}

impl ComputeAttribute {
    /// Creates an attribute set linking a profile to a resource.
    #[must_use]
    pub fn new(
        profile_id: ComputeProfileId,
        resource_id: ComputeResourceId,
        vm_attrs: AttrMap,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: ComputeAttributeId::new(),
            profile_id,
            resource_id,
            vm_attrs,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs an attribute set from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: ComputeAttributeId,
        profile_id: ComputeProfileId,
        resource_id: ComputeResourceId,
        vm_attrs: AttrMap,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            profile_id,
            resource_id,
            vm_attrs,
            created_at,
        }
    }

    /// Returns the attribute set identifier.
    #[must_use]
    pub const fn id(&self) -> ComputeAttributeId {
        self.id
    }

    /// Returns the linked profile identifier.
    #[must_use]
    pub const fn profile_id(&self) -> ComputeProfileId {
        self.profile_id
    }

    /// Returns the linked resource identifier.
    #[must_use]
    pub const fn resource_id(&self) -> ComputeResourceId {
        self.resource_id
    }

    /// Returns the default VM attribute tree.
    #[must_use]
    pub const fn vm_attrs(&self) -> &AttrMap {
        &self.vm_attrs
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
