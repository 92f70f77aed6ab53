//! Adapter implementations of the compute resource ports.
//!
//! - [`memory`]: thread-safe in-memory repository and fake remote client
//! - [`postgres`]: Diesel-backed repository
//! - [`providers`]: compiled-in backend provider implementations

pub mod memory;
pub mod postgres;
pub mod providers;
