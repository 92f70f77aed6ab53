//! Image records owned by a compute resource.

use super::{ComputeResourceId, ImageId, ResourceValidationError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Backend image registered against a compute resource.
///
/// Images are owned by their resource and cascade-deleted with it. The
/// `uuid` field is the backend's own identifier for the template or AMI the
/// image points at; it is opaque to this system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    id: ImageId,
    resource_id: ComputeResourceId,
    name: String,
    uuid: String,
    username: Option<String>,
    user_data: bool,
    created_at: DateTime<Utc>,
}

impl Image {
    /// Creates an image record for the given resource.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceValidationError::EmptyImageName`] or
    /// [`ResourceValidationError::EmptyImageUuid`] when either field is
    /// empty after trimming.
    pub fn new(
        resource_id: ComputeResourceId,
        name: impl Into<String>,
        uuid: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, ResourceValidationError> {
        let name_value = name.into();
        let trimmed_name = name_value.trim();
        if trimmed_name.is_empty() {
            return Err(ResourceValidationError::EmptyImageName);
        }

        let uuid_value = uuid.into();
        let trimmed_uuid = uuid_value.trim();
        if trimmed_uuid.is_empty() {
            return Err(ResourceValidationError::EmptyImageUuid);
        }

        Ok(Self {
            id: ImageId::new(),
            resource_id,
            name: trimmed_name.to_owned(),
            uuid: trimmed_uuid.to_owned(),
            username: None,
            user_data: false,
            created_at: clock.utc(),
        })
    }

    /// Reconstructs an image from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: ImageId,
        resource_id: ComputeResourceId,
        name: String,
        uuid: String,
        username: Option<String>,
        user_data: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            resource_id,
            name,
            uuid,
            username,
            user_data,
            created_at,
        }
    }

    /// Sets the login user baked into the image.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Marks the image as supporting user-data injection.
    #[must_use]
    pub const fn with_user_data(mut self, user_data: bool) -> Self {
        self.user_data = user_data;
        self
    }

    /// Returns the image identifier.
    #[must_use]
    pub const fn id(&self) -> ImageId {
        self.id
    }

    /// Returns the owning resource identifier.
    #[must_use]
    pub const fn resource_id(&self) -> ComputeResourceId {
        self.resource_id
    }

    /// Returns the operator-facing image name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the backend identifier the image points at.
    #[must_use]
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// Returns the login user baked into the image, if declared.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Returns whether the image supports user-data injection.
    #[must_use]
    pub const fn user_data(&self) -> bool {
        self.user_data
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
