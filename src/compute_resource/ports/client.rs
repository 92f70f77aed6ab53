//! Remote client port: the seam through which every VM operation reaches a
//! backend.
//!
//! Concrete providers return an authenticated handle implementing
//! [`RemoteClient`]; all higher-level operations (list, create, power
//! control, destroy) funnel through it. The port distinguishes "no such
//! server" from every other failure so callers can apply the different
//! propagation rules the lifecycle contract demands.

use crate::compute_resource::domain::{AttrMap, RemoteInterface, RemoteServer};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for remote client operations.
pub type RemoteClientResult<T> = Result<T, RemoteClientError>;

/// Authenticated handle to a virtualization or cloud backend.
///
/// Every call is a blocking round-trip to the backend awaited on the async
/// runtime; the client performs no retries and enforces no timeouts —
/// both are caller policy.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Lists all servers visible to the configured account.
    ///
    /// The returned collection is finite and the call is restartable:
    /// invoking it again yields a fresh listing.
    async fn list_servers(&self) -> RemoteClientResult<Vec<RemoteServer>>;

    /// Fetches one server by its backend identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteClientError::ServerNotFound`] when no server matches.
    async fn get_server(&self, identity: &str) -> RemoteClientResult<RemoteServer>;

    /// Creates a server from the given parameter tree.
    async fn create_server(&self, params: AttrMap) -> RemoteClientResult<RemoteServer>;

    /// Powers on a server.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteClientError::ServerNotFound`] when no server matches.
    async fn start_server(&self, identity: &str) -> RemoteClientResult<()>;

    /// Shuts down a server.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteClientError::ServerNotFound`] when no server matches.
    async fn stop_server(&self, identity: &str) -> RemoteClientResult<()>;

    /// Destroys a server and its backend bookkeeping.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteClientError::ServerNotFound`] when no server matches.
    async fn destroy_server(&self, identity: &str) -> RemoteClientResult<()>;

    /// Lists network interfaces defined on the backend.
    async fn list_interfaces(&self) -> RemoteClientResult<Vec<RemoteInterface>>;

    /// Creates a network interface from the given parameter tree.
    async fn create_interface(&self, params: AttrMap) -> RemoteClientResult<RemoteInterface>;
}

/// Errors returned by remote client implementations.
#[derive(Debug, Clone, Error)]
pub enum RemoteClientError {
    /// No server matches the given backend identifier.
    #[error("no server matches identifier {0}")]
    ServerNotFound(String),

    /// Opaque backend or transport failure, propagated unchanged.
    #[error("backend error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl RemoteClientError {
    /// Wraps an opaque backend or transport error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
