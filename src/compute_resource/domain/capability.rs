//! Provider capability flags.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Optional feature a backend provider may advertise.
///
/// Callers probe a provider's capability set before offering the matching
/// workflow; a provider that omits a flag simply never receives the
/// corresponding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// VMs can be network-booted and built from installation media.
    Build,
    /// VMs can be provisioned from a backend image.
    Image,
    /// Additional storage volumes can be attached at creation time.
    NewVolume,
    /// Additional network interfaces can be attached at creation time.
    NewInterface,
    /// A console password can be set on the VM.
    ConsolePassword,
    /// SSH key pairs are managed through the backend.
    KeyPair,
}

impl Capability {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Image => "image",
            Self::NewVolume => "new_volume",
            Self::NewInterface => "new_interface",
            Self::ConsolePassword => "console_password",
            Self::KeyPair => "key_pair",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Capability {
    type Error = ParseCapabilityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "build" => Ok(Self::Build),
            "image" => Ok(Self::Image),
            "new_volume" => Ok(Self::NewVolume),
            "new_interface" => Ok(Self::NewInterface),
            "console_password" => Ok(Self::ConsolePassword),
            "key_pair" => Ok(Self::KeyPair),
            _ => Err(ParseCapabilityError(value.to_owned())),
        }
    }
}

/// Error returned while parsing a capability flag from storage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown provider capability: {0}")]
pub struct ParseCapabilityError(pub String);
