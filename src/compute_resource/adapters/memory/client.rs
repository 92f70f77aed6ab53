//! In-memory remote client: a fake backend for tests and local wiring.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::compute_resource::domain::{
    AttrMap, RemoteInterface, RemoteServer, ServerState,
};
use crate::compute_resource::ports::{RemoteClient, RemoteClientError, RemoteClientResult};

/// Thread-safe in-memory backend holding servers and interfaces.
///
/// Created servers start in the running state and keep whatever parameter
/// tree they were created from as their backend attributes, so
/// reconciliation round-trips behave like a real listing would.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRemoteClient {
    state: Arc<RwLock<BackendState>>,
}

#[derive(Debug, Default)]
struct BackendState {
    servers: HashMap<String, RemoteServer>,
    interfaces: HashMap<String, RemoteInterface>,
}

impl InMemoryRemoteClient {
    /// Creates an empty fake backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the backend with an existing server.
    #[must_use]
    pub fn with_server(self, server: RemoteServer) -> Self {
        self.insert_server(server);
        self
    }

    /// Inserts a server, replacing any with the same identity.
    pub fn insert_server(&self, server: RemoteServer) {
        if let Ok(mut state) = self.state.write() {
            state.servers.insert(server.identity().to_owned(), server);
        }
    }

    /// Returns the number of servers currently defined, zero when the
    /// backing lock is poisoned.
    #[must_use]
    pub fn server_count(&self) -> usize {
        self.state
            .read()
            .map(|state| state.servers.len())
            .unwrap_or(0)
    }
}

fn lock_error(err: impl ToString) -> RemoteClientError {
    RemoteClientError::backend(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl RemoteClient for InMemoryRemoteClient {
    async fn list_servers(&self) -> RemoteClientResult<Vec<RemoteServer>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.servers.values().cloned().collect())
    }

    async fn get_server(&self, identity: &str) -> RemoteClientResult<RemoteServer> {
        let state = self.state.read().map_err(lock_error)?;
        state
            .servers
            .get(identity)
            .cloned()
            .ok_or_else(|| RemoteClientError::ServerNotFound(identity.to_owned()))
    }

    async fn create_server(&self, params: AttrMap) -> RemoteClientResult<RemoteServer> {
        let identity = Uuid::new_v4().to_string();
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("unnamed")
            .to_owned();

        let mut server = RemoteServer::new(identity, name, ServerState::Running);
        for (key, value) in params {
            if key != "name" {
                server = server.with_attribute(key, value);
            }
        }

        let mut state = self.state.write().map_err(lock_error)?;
        state
            .servers
            .insert(server.identity().to_owned(), server.clone());
        Ok(server)
    }

    async fn start_server(&self, identity: &str) -> RemoteClientResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let server = state
            .servers
            .get_mut(identity)
            .ok_or_else(|| RemoteClientError::ServerNotFound(identity.to_owned()))?;
        server.set_state(ServerState::Running);
        Ok(())
    }

    async fn stop_server(&self, identity: &str) -> RemoteClientResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let server = state
            .servers
            .get_mut(identity)
            .ok_or_else(|| RemoteClientError::ServerNotFound(identity.to_owned()))?;
        server.set_state(ServerState::Stopped);
        Ok(())
    }

    async fn destroy_server(&self, identity: &str) -> RemoteClientResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state
            .servers
            .remove(identity)
            .map(|_| ())
            .ok_or_else(|| RemoteClientError::ServerNotFound(identity.to_owned()))
    }

    async fn list_interfaces(&self) -> RemoteClientResult<Vec<RemoteInterface>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.interfaces.values().cloned().collect())
    }

    async fn create_interface(&self, params: AttrMap) -> RemoteClientResult<RemoteInterface> {
        let identity = Uuid::new_v4().to_string();
        let interface = RemoteInterface::new(identity, params);

        let mut state = self.state.write().map_err(lock_error)?;
        state
            .interfaces
            .insert(interface.identity().to_owned(), interface.clone());
        Ok(interface)
    }
}
