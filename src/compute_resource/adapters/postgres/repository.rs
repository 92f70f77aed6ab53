//! `PostgreSQL` repository implementation for compute resources.

use super::{
    models::{
        ComputeAttributeRow, ComputeResourceRow, ImageRow, NewComputeAttributeRow,
        NewComputeResourceRow, NewHostLinkRow, NewImageRow,
    },
    schema::{compute_attribute_sets, compute_resource_images, compute_resources, host_links},
};
use crate::compute_resource::domain::{
    AttrMap, ComputeAttribute, ComputeAttributeId, ComputeProfileId, ComputeResource,
    ComputeResourceId, EndpointUrl, HostId, Image, ImageId, Password,
    PersistedComputeResourceData, ProviderName, ResourceName,
};
use crate::compute_resource::ports::{
    ComputeResourceRepository, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by compute resource adapters.
pub type ComputeResourcePgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed compute resource repository.
#[derive(Debug, Clone)]
pub struct PostgresComputeResources {
    pool: ComputeResourcePgPool,
}

impl From<DieselError> for RepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

impl PostgresComputeResources {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: ComputeResourcePgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> RepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(RepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(RepositoryError::persistence)?
    }
}

#[async_trait]
impl ComputeResourceRepository for PostgresComputeResources {
    async fn save(&self, resource: &ComputeResource) -> RepositoryResult<()> {
        let resource_id = resource.id();
        let resource_name = resource.name().clone();
        let new_row = to_new_row(resource)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(compute_resources::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_name_unique_violation(info.as_ref()) =>
                    {
                        RepositoryError::DuplicateResourceName(resource_name.clone())
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        RepositoryError::DuplicateResource(resource_id)
                    }
                    other => RepositoryError::persistence(other),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, resource: &ComputeResource) -> RepositoryResult<()> {
        let resource_id = resource.id();
        let id_value = resource_id.into_inner();
        let provider_value = resource.provider().as_str().to_owned();
        let resource_name = resource.name().clone();
        let name_value = resource.name().as_str().to_owned();
        let url_value = resource.url().as_str().to_owned();
        let password_value = resource.password().map(|p| p.expose().to_owned());
        let attrs_value = serde_json::to_value(resource.attrs())
            .map_err(RepositoryError::persistence)?;
        let updated_value = resource.updated_at();

        self.run_blocking(move |connection| {
            let stored_provider = compute_resources::table
                .filter(compute_resources::id.eq(id_value))
                .select(compute_resources::provider)
                .first::<String>(connection)
                .optional()
                .map_err(RepositoryError::persistence)?
                .ok_or(RepositoryError::NotFound(resource_id))?;

            if !stored_provider.eq_ignore_ascii_case(&provider_value) {
                return Err(RepositoryError::ProviderImmutable(resource_id));
            }

            // The provider column is deliberately absent from the SET list.
            diesel::update(
                compute_resources::table.filter(compute_resources::id.eq(id_value)),
            )
            .set((
                compute_resources::name.eq(&name_value),
                compute_resources::url.eq(&url_value),
                compute_resources::password.eq(&password_value),
                compute_resources::attrs.eq(&attrs_value),
                compute_resources::updated_at.eq(updated_value),
            ))
            .execute(connection)
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    RepositoryError::DuplicateResourceName(resource_name.clone())
                }
                other => RepositoryError::persistence(other),
            })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(
        &self,
        id: ComputeResourceId,
    ) -> RepositoryResult<Option<ComputeResource>> {
        self.run_blocking(move |connection| {
            let row = compute_resources::table
                .filter(compute_resources::id.eq(id.into_inner()))
                .select(ComputeResourceRow::as_select())
                .first::<ComputeResourceRow>(connection)
                .optional()
                .map_err(RepositoryError::persistence)?;
            row.map(row_to_resource).transpose()
        })
        .await
    }

    async fn find_by_name(
        &self,
        name: &ResourceName,
    ) -> RepositoryResult<Option<ComputeResource>> {
        let name_value = name.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = compute_resources::table
                .filter(compute_resources::name.eq(&name_value))
                .select(ComputeResourceRow::as_select())
                .first::<ComputeResourceRow>(connection)
                .optional()
                .map_err(RepositoryError::persistence)?;
            row.map(row_to_resource).transpose()
        })
        .await
    }

    async fn list(&self) -> RepositoryResult<Vec<ComputeResource>> {
        self.run_blocking(move |connection| {
            let rows = compute_resources::table
                .select(ComputeResourceRow::as_select())
                .load::<ComputeResourceRow>(connection)
                .map_err(RepositoryError::persistence)?;
            rows.into_iter().map(row_to_resource).collect()
        })
        .await
    }

    async fn delete(&self, id: ComputeResourceId) -> RepositoryResult<()> {
        let id_value = id.into_inner();
        self.run_blocking(move |connection| {
            connection.transaction::<_, RepositoryError, _>(|conn| {
                let host_count: i64 = host_links::table
                    .filter(host_links::compute_resource_id.eq(id_value))
                    .count()
                    .get_result(conn)?;
                if host_count > 0 {
                    return Err(RepositoryError::ResourceInUse {
                        id,
                        host_count: usize::try_from(host_count)
                            .map_err(RepositoryError::persistence)?,
                    });
                }

                diesel::delete(
                    compute_resource_images::table
                        .filter(compute_resource_images::compute_resource_id.eq(id_value)),
                )
                .execute(conn)?;
                diesel::delete(
                    compute_attribute_sets::table
                        .filter(compute_attribute_sets::compute_resource_id.eq(id_value)),
                )
                .execute(conn)?;

                let deleted = diesel::delete(
                    compute_resources::table.filter(compute_resources::id.eq(id_value)),
                )
                .execute(conn)?;
                if deleted == 0 {
                    return Err(RepositoryError::NotFound(id));
                }
                Ok(())
            })
        })
        .await
    }

    async fn add_image(&self, image: &Image) -> RepositoryResult<()> {
        let resource_id = image.resource_id();
        let new_row = NewImageRow {
            id: image.id().into_inner(),
            compute_resource_id: resource_id.into_inner(),
            name: image.name().to_owned(),
            uuid: image.uuid().to_owned(),
            username: image.username().map(str::to_owned),
            user_data: image.user_data(),
            created_at: image.created_at(),
        };

        self.run_blocking(move |connection| {
            ensure_resource_exists(connection, resource_id)?;
            diesel::insert_into(compute_resource_images::table)
                .values(&new_row)
                .execute(connection)
                .map_err(RepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn images_for(&self, id: ComputeResourceId) -> RepositoryResult<Vec<Image>> {
        self.run_blocking(move |connection| {
            let rows = compute_resource_images::table
                .filter(compute_resource_images::compute_resource_id.eq(id.into_inner()))
                .select(ImageRow::as_select())
                .load::<ImageRow>(connection)
                .map_err(RepositoryError::persistence)?;
            Ok(rows.into_iter().map(row_to_image).collect())
        })
        .await
    }

    async fn remove_image(&self, id: ImageId) -> RepositoryResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(
                compute_resource_images::table
                    .filter(compute_resource_images::id.eq(id.into_inner())),
            )
            .execute(connection)
            .map_err(RepositoryError::persistence)?;
            if deleted == 0 {
                return Err(RepositoryError::ImageNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn set_compute_attributes(
        &self,
        attributes: &ComputeAttribute,
    ) -> RepositoryResult<()> {
        let resource_id = attributes.resource_id();
        let vm_attrs_value = serde_json::to_value(attributes.vm_attrs())
            .map_err(RepositoryError::persistence)?;
        let new_row = NewComputeAttributeRow {
            id: attributes.id().into_inner(),
            compute_profile_id: attributes.profile_id().into_inner(),
            compute_resource_id: resource_id.into_inner(),
            vm_attrs: vm_attrs_value.clone(),
            created_at: attributes.created_at(),
        };

        self.run_blocking(move |connection| {
            ensure_resource_exists(connection, resource_id)?;
            diesel::insert_into(compute_attribute_sets::table)
                .values(&new_row)
                .on_conflict((
                    compute_attribute_sets::compute_profile_id,
                    compute_attribute_sets::compute_resource_id,
                ))
                .do_update()
                .set(compute_attribute_sets::vm_attrs.eq(&vm_attrs_value))
                .execute(connection)
                .map_err(RepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn compute_attributes_for(
        &self,
        id: ComputeResourceId,
    ) -> RepositoryResult<Vec<ComputeAttribute>> {
        self.run_blocking(move |connection| {
            let rows = compute_attribute_sets::table
                .filter(compute_attribute_sets::compute_resource_id.eq(id.into_inner()))
                .select(ComputeAttributeRow::as_select())
                .load::<ComputeAttributeRow>(connection)
                .map_err(RepositoryError::persistence)?;
            rows.into_iter().map(row_to_compute_attribute).collect()
        })
        .await
    }

    async fn attach_host(
        &self,
        host: HostId,
        resource: ComputeResourceId,
    ) -> RepositoryResult<()> {
        let new_row = NewHostLinkRow {
            host_id: host.into_inner(),
            compute_resource_id: resource.into_inner(),
        };

        self.run_blocking(move |connection| {
            ensure_resource_exists(connection, resource)?;
            diesel::insert_into(host_links::table)
                .values(&new_row)
                .on_conflict_do_nothing()
                .execute(connection)
                .map_err(RepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn detach_host(
        &self,
        host: HostId,
        resource: ComputeResourceId,
    ) -> RepositoryResult<()> {
        self.run_blocking(move |connection| {
            diesel::delete(
                host_links::table
                    .filter(host_links::host_id.eq(host.into_inner()))
                    .filter(host_links::compute_resource_id.eq(resource.into_inner())),
            )
            .execute(connection)
            .map_err(RepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn host_count(&self, resource: ComputeResourceId) -> RepositoryResult<usize> {
        self.run_blocking(move |connection| {
            let count: i64 = host_links::table
                .filter(host_links::compute_resource_id.eq(resource.into_inner()))
                .count()
                .get_result(connection)
                .map_err(RepositoryError::persistence)?;
            usize::try_from(count).map_err(RepositoryError::persistence)
        })
        .await
    }
}

fn ensure_resource_exists(
    connection: &mut PgConnection,
    id: ComputeResourceId,
) -> RepositoryResult<()> {
    let exists: i64 = compute_resources::table
        .filter(compute_resources::id.eq(id.into_inner()))
        .count()
        .get_result(connection)
        .map_err(RepositoryError::persistence)?;
    if exists == 0 {
        return Err(RepositoryError::NotFound(id));
    }
    Ok(())
}

fn to_new_row(resource: &ComputeResource) -> RepositoryResult<NewComputeResourceRow> {
    let attrs = serde_json::to_value(resource.attrs()).map_err(RepositoryError::persistence)?;

    Ok(NewComputeResourceRow {
        id: resource.id().into_inner(),
        name: resource.name().as_str().to_owned(),
        provider: resource.provider().as_str().to_owned(),
        url: resource.url().as_str().to_owned(),
        password: resource.password().map(|p| p.expose().to_owned()),
        attrs,
        created_at: resource.created_at(),
        updated_at: resource.updated_at(),
    })
}

fn row_to_resource(row: ComputeResourceRow) -> RepositoryResult<ComputeResource> {
    let ComputeResourceRow {
        id,
        name,
        provider,
        url,
        password,
        attrs,
        created_at,
        updated_at,
    } = row;

    let parsed_name = ResourceName::new(&name).map_err(RepositoryError::invalid_persisted_data)?;
    let parsed_provider =
        ProviderName::new(&provider).map_err(RepositoryError::invalid_persisted_data)?;
    let parsed_url = EndpointUrl::new(&url).map_err(RepositoryError::invalid_persisted_data)?;
    let parsed_attrs: AttrMap =
        serde_json::from_value(attrs).map_err(RepositoryError::invalid_persisted_data)?;

    let data = PersistedComputeResourceData {
        id: ComputeResourceId::from_uuid(id),
        name: parsed_name,
        provider: parsed_provider,
        url: parsed_url,
        password: password.map(Password::new),
        attrs: parsed_attrs,
        created_at,
        updated_at,
    };
    Ok(ComputeResource::from_persisted(data))
}

fn row_to_image(row: ImageRow) -> Image {
    let ImageRow {
        id,
        compute_resource_id,
        name,
        uuid,
        username,
        user_data,
        created_at,
    } = row;

    Image::from_persisted(
        ImageId::from_uuid(id),
        ComputeResourceId::from_uuid(compute_resource_id),
        name,
        uuid,
        username,
        user_data,
        created_at,
    )
}

fn row_to_compute_attribute(row: ComputeAttributeRow) -> RepositoryResult<ComputeAttribute> {
    let ComputeAttributeRow {
        id,
        compute_profile_id,
        compute_resource_id,
        vm_attrs,
        created_at,
    } = row;

    let parsed_attrs: AttrMap =
        serde_json::from_value(vm_attrs).map_err(RepositoryError::invalid_persisted_data)?;

    Ok(ComputeAttribute::from_persisted(
        ComputeAttributeId::from_uuid(id),
        ComputeProfileId::from_uuid(compute_profile_id),
        ComputeResourceId::from_uuid(compute_resource_id),
        parsed_attrs,
        created_at,
    ))
}

fn is_name_unique_violation(info: &dyn diesel::result::DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == "idx_compute_resources_name")
}
