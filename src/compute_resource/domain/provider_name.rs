//! Provider name tag carried by every compute resource.

use super::ResourceValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a backend provider as registered in the provider registry
/// (e.g. `Libvirt`, `EC2`, `Openstack`).
///
/// The canonical spelling is the one the registry descriptor was created
/// with; factory lookups match case-insensitively but always store the
/// canonical form on the resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderName(String);

impl ProviderName {
    /// Creates a validated provider name.
    ///
    /// Surrounding whitespace is trimmed; the original casing is kept.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceValidationError::EmptyProviderName`] when the value
    /// is empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, ResourceValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(ResourceValidationError::EmptyProviderName);
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Creates a provider name from a compiled-in descriptor name.
    ///
    /// Only used for the builtin provider list, whose names are known to be
    /// non-empty.
    pub(crate) fn from_static(value: &'static str) -> Self {
        Self(value.to_owned())
    }

    /// Returns the provider name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compares against another spelling ignoring ASCII case.
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl AsRef<str> for ProviderName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
