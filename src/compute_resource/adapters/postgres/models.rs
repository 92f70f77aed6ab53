//! Diesel row models for compute resource persistence.

use super::schema::{compute_attribute_sets, compute_resource_images, compute_resources, host_links};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for compute resource records.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = compute_resources)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ComputeResourceRow {
    /// Internal resource identifier.
    pub id: uuid::Uuid,
    /// Unique operator-facing resource name.
    pub name: String,
    /// Provider discriminator.
    pub provider: String,
    /// Backend endpoint URL.
    pub url: String,
    /// Backend credential.
    pub password: Option<String>,
    /// Opaque attribute JSON payload.
    pub attrs: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for compute resource records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = compute_resources)]
pub struct NewComputeResourceRow {
    /// Internal resource identifier.
    pub id: uuid::Uuid,
    /// Unique operator-facing resource name.
    pub name: String,
    /// Provider discriminator.
    pub provider: String,
    /// Backend endpoint URL.
    pub url: String,
    /// Backend credential.
    pub password: Option<String>,
    /// Opaque attribute JSON payload.
    pub attrs: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for image records.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = compute_resource_images)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ImageRow {
    /// Internal image identifier.
    pub id: uuid::Uuid,
    /// Owning resource identifier.
    pub compute_resource_id: uuid::Uuid,
    /// Operator-facing image name.
    pub name: String,
    /// Backend identifier of the template or image.
    pub uuid: String,
    /// Login user baked into the image.
    pub username: Option<String>,
    /// Whether the image supports user-data injection.
    pub user_data: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for image records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = compute_resource_images)]
pub struct NewImageRow {
    /// Internal image identifier.
    pub id: uuid::Uuid,
    /// Owning resource identifier.
    pub compute_resource_id: uuid::Uuid,
    /// Operator-facing image name.
    pub name: String,
    /// Backend identifier of the template or image.
    pub uuid: String,
    /// Login user baked into the image.
    pub username: Option<String>,
    /// Whether the image supports user-data injection.
    pub user_data: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Query result row for compute attribute set records.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = compute_attribute_sets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ComputeAttributeRow {
    /// Internal attribute set identifier.
    pub id: uuid::Uuid,
    /// Linked profile identifier.
    pub compute_profile_id: uuid::Uuid,
    /// Linked resource identifier.
    pub compute_resource_id: uuid::Uuid,
    /// Default VM attribute JSON payload.
    pub vm_attrs: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for compute attribute set records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = compute_attribute_sets)]
pub struct NewComputeAttributeRow {
    /// Internal attribute set identifier.
    pub id: uuid::Uuid,
    /// Linked profile identifier.
    pub compute_profile_id: uuid::Uuid,
    /// Linked resource identifier.
    pub compute_resource_id: uuid::Uuid,
    /// Default VM attribute JSON payload.
    pub vm_attrs: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for host link records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = host_links)]
pub struct NewHostLinkRow {
    /// Referencing host identifier.
    pub host_id: uuid::Uuid,
    /// Referenced resource identifier.
    pub compute_resource_id: uuid::Uuid,
}
