//! Error types for compute resource domain validation.

use thiserror::Error;

/// Errors raised while constructing or validating compute resource values.
///
/// Validation failures are collected, not raised one at a time: entity
/// construction and [`super::ComputeResource::validate`] gather every field
/// error into a [`ResourceValidationError::Multiple`] before returning.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResourceValidationError {
    /// The resource name is empty after trimming.
    #[error("compute resource name must not be empty")]
    EmptyName,

    /// The endpoint URL is empty after trimming.
    #[error("compute resource URL must not be empty")]
    EmptyUrl,

    /// The provider name is empty after trimming.
    #[error("provider name must not be empty")]
    EmptyProviderName,

    /// The provider is not among the currently available providers.
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    /// A bound resource was asked to switch to a different provider.
    #[error("provider cannot be changed once a compute resource is bound")]
    ProviderChangeRejected,

    /// The image name is empty after trimming.
    #[error("image name must not be empty")]
    EmptyImageName,

    /// The image has no backend identifier.
    #[error("image must reference a backend image identifier")]
    EmptyImageUuid,

    /// Multiple validation errors occurred.
    #[error("multiple validation errors: {}", format_errors(.0))]
    Multiple(Vec<Self>),
}

fn format_errors(errors: &[ResourceValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ResourceValidationError {
    /// Combines multiple validation errors into a single error.
    ///
    /// If only one error is provided, returns it directly rather than
    /// wrapping.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if called with an empty vector, as this
    /// indicates a logic error in the caller. In release builds, returns an
    /// `EmptyName` placeholder instead of panicking.
    #[must_use]
    pub fn multiple(mut errors: Vec<Self>) -> Self {
        match errors.len() {
            0 => {
                debug_assert!(false, "multiple() called with empty errors vector");
                Self::EmptyName
            }
            1 => errors.remove(0),
            _ => Self::Multiple(errors),
        }
    }

    /// Returns the individual errors carried by this value.
    ///
    /// A non-`Multiple` error yields a single-element slice view of itself.
    #[must_use]
    pub fn errors(&self) -> Vec<&Self> {
        match self {
            Self::Multiple(errors) => errors.iter().collect(),
            single => vec![single],
        }
    }
}
