//! Validated backend endpoint URL type.

use super::ResourceValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated backend endpoint URL.
///
/// Trailing slashes are stripped at construction so a stored URL never ends
/// in `/` and path concatenation by backend clients stays predictable.
/// Sanitation is idempotent: re-wrapping an already sanitized value is a
/// no-op.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointUrl(String);

impl EndpointUrl {
    /// Creates a validated endpoint URL.
    ///
    /// Surrounding whitespace is trimmed and every trailing `/` is removed.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceValidationError::EmptyUrl`] when the value is empty
    /// after trimming (a bare `/` therefore also fails).
    pub fn new(value: impl Into<String>) -> Result<Self, ResourceValidationError> {
        let raw = value.into();
        let sanitized = raw.trim().trim_end_matches('/');

        if sanitized.is_empty() {
            return Err(ResourceValidationError::EmptyUrl);
        }

        Ok(Self(sanitized.to_owned()))
    }

    /// Returns the URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EndpointUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for EndpointUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
