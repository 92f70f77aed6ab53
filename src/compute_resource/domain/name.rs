//! Validated compute resource name type.

use super::ResourceValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated, non-empty compute resource name.
///
/// Names identify a configured backend connection to operators (e.g.
/// `production-cluster`, `us-east-ec2`). Uniqueness across all resources is
/// enforced by the repository, not here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceName(String);

impl ResourceName {
    /// Creates a validated resource name.
    ///
    /// Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceValidationError::EmptyName`] when the value is
    /// empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, ResourceValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(ResourceValidationError::EmptyName);
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the resource name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ResourceName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
