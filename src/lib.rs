//! Foundry: compute resource provisioning core.
//!
//! This crate provides the data model and provider abstraction for compute
//! resources: configured connections to virtualization or cloud backends
//! through which virtual machines are provisioned, queried, and destroyed.
//! A single polymorphic entity type selects a concrete backend provider at
//! creation time and exposes a uniform VM lifecycle contract, while each
//! provider opts into or out of parts of that contract through overridable
//! capability flags.
//!
//! # Architecture
//!
//! Foundry follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, backends, etc.)
//!
//! # Modules
//!
//! - [`compute_resource`]: Provider registry, compute resource entity, VM
//!   attribute reconciliation, and remote client delegation

pub mod compute_resource;
