//! `PostgreSQL` adapter for compute resource persistence.

mod models;
mod repository;
mod schema;

pub use repository::{ComputeResourcePgPool, PostgresComputeResources};
