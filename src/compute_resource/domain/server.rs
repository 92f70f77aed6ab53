//! Remote virtual machine handles and backend-side infrastructure objects.
//!
//! Nothing in this module is owned by Foundry: servers, volumes, and
//! interfaces live on the backend and are only referenced by opaque
//! identifiers. The attribute maps mirror whatever the backend reports.

use super::AttrMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Power/lifecycle state a backend reports for a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerState {
    /// Creation requested, not yet running.
    Pending,
    /// Running.
    Running,
    /// Shut down but still defined on the backend.
    Stopped,
    /// Destroyed; kept briefly by some backends for bookkeeping.
    Terminated,
}

impl ServerState {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ServerState {
    type Error = ParseServerStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "stopped" => Ok(Self::Stopped),
            "terminated" => Ok(Self::Terminated),
            _ => Err(ParseServerStateError(value.to_owned())),
        }
    }
}

/// Error returned while parsing a server state string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown server state: {0}")]
pub struct ParseServerStateError(pub String);

/// Storage volume attached to a remote server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteVolume {
    attributes: AttrMap,
}

impl RemoteVolume {
    /// Wraps the attribute map a backend reports for one volume.
    #[must_use]
    pub const fn new(attributes: AttrMap) -> Self {
        Self { attributes }
    }

    /// Returns the volume's backend attributes.
    #[must_use]
    pub const fn attributes(&self) -> &AttrMap {
        &self.attributes
    }
}

/// Network interface defined on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteInterface {
    identity: String,
    attributes: AttrMap,
}

impl RemoteInterface {
    /// Creates an interface handle from its backend identifier.
    #[must_use]
    pub fn new(identity: impl Into<String>, attributes: AttrMap) -> Self {
        Self {
            identity: identity.into(),
            attributes,
        }
    }

    /// Returns the backend identifier.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Returns the interface's backend attributes.
    #[must_use]
    pub const fn attributes(&self) -> &AttrMap {
        &self.attributes
    }
}

/// Handle to a virtual machine on a remote backend.
///
/// The attribute map always carries the `id`, `name`, and `state` keys so
/// reconciliation sees the same tree a raw backend listing would produce;
/// additional backend-specific keys are layered on with
/// [`RemoteServer::with_attribute`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteServer {
    identity: String,
    name: String,
    state: ServerState,
    attributes: AttrMap,
    volumes: Option<Vec<RemoteVolume>>,
}

impl RemoteServer {
    /// Creates a server handle, seeding the attribute map with the
    /// identity, name, and state.
    #[must_use]
    pub fn new(identity: impl Into<String>, name: impl Into<String>, state: ServerState) -> Self {
        let identity_value = identity.into();
        let name_value = name.into();
        let mut attributes = AttrMap::new();
        attributes.insert("id".to_owned(), Value::String(identity_value.clone()));
        attributes.insert("name".to_owned(), Value::String(name_value.clone()));
        attributes.insert("state".to_owned(), Value::String(state.as_str().to_owned()));
        Self {
            identity: identity_value,
            name: name_value,
            state,
            attributes,
            volumes: None,
        }
    }

    /// Adds one backend-specific attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Attaches the volume collection, enabling volume reconciliation.
    ///
    /// Backends that do not model volumes simply never call this, and the
    /// handle reports `None`.
    #[must_use]
    pub fn with_volumes(mut self, volumes: Vec<RemoteVolume>) -> Self {
        self.volumes = Some(volumes);
        self
    }

    /// Returns the opaque backend identifier (UUID on most backends).
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Returns the server name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the reported power state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// Replaces the reported power state, keeping the attribute map in sync.
    pub fn set_state(&mut self, state: ServerState) {
        self.state = state;
        self.attributes
            .insert("state".to_owned(), Value::String(state.as_str().to_owned()));
    }

    /// Returns the full backend attribute map.
    #[must_use]
    pub const fn attributes(&self) -> &AttrMap {
        &self.attributes
    }

    /// Returns the volume collection, when the backend exposes one.
    #[must_use]
    pub fn volumes(&self) -> Option<&[RemoteVolume]> {
        self.volumes.as_deref()
    }
}

/// Generic backend-side infrastructure object (zone, network, cluster,
/// flavor, storage domain, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfrastructureObject {
    identity: String,
    name: String,
}

impl InfrastructureObject {
    /// Creates an infrastructure object handle.
    #[must_use]
    pub fn new(identity: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            name: name.into(),
        }
    }

    /// Returns the backend identifier.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for InfrastructureObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.identity)
    }
}

/// How a graphical or serial console is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsoleProtocol {
    /// VNC framebuffer.
    Vnc,
    /// SPICE protocol.
    Spice,
    /// Text serial console.
    Serial,
}

/// Connection details for a VM console session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleConnection {
    protocol: ConsoleProtocol,
    address: String,
    port: Option<u16>,
    password: Option<String>,
}

impl ConsoleConnection {
    /// Creates console connection details.
    #[must_use]
    pub fn new(protocol: ConsoleProtocol, address: impl Into<String>) -> Self {
        Self {
            protocol,
            address: address.into(),
            port: None,
            password: None,
        }
    }

    /// Sets the TCP port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the one-time console password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Returns the console protocol.
    #[must_use]
    pub const fn protocol(&self) -> ConsoleProtocol {
        self.protocol
    }

    /// Returns the host or URL the console listens on.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns the TCP port, if one applies.
    #[must_use]
    pub const fn port(&self) -> Option<u16> {
        self.port
    }

    /// Returns the one-time console password, if one was issued.
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
}
