//! Diesel schema for compute resource persistence.

diesel::table! {
    /// Compute resource records.
    compute_resources (id) {
        /// Internal resource identifier.
        id -> Uuid,
        /// Unique operator-facing resource name.
        #[max_length = 255]
        name -> Varchar,
        /// Provider discriminator; never updated after insert.
        #[max_length = 100]
        provider -> Varchar,
        /// Backend endpoint URL, stored without trailing slash.
        url -> Text,
        /// Backend credential; encrypted at rest by the surrounding system.
        password -> Nullable<Text>,
        /// Opaque provider-specific attributes as JSONB.
        attrs -> Jsonb,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Images registered against a compute resource.
    compute_resource_images (id) {
        /// Internal image identifier.
        id -> Uuid,
        /// Owning resource identifier.
        compute_resource_id -> Uuid,
        /// Operator-facing image name.
        #[max_length = 255]
        name -> Varchar,
        /// Backend identifier of the template or image.
        #[max_length = 255]
        uuid -> Varchar,
        /// Login user baked into the image.
        #[max_length = 255]
        username -> Nullable<Varchar>,
        /// Whether the image supports user-data injection.
        user_data -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-profile VM attribute defaults, unique per (profile, resource).
    compute_attribute_sets (id) {
        /// Internal attribute set identifier.
        id -> Uuid,
        /// Linked profile identifier.
        compute_profile_id -> Uuid,
        /// Linked resource identifier.
        compute_resource_id -> Uuid,
        /// Default VM attribute tree as JSONB.
        vm_attrs -> Jsonb,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Host references blocking resource deletion.
    host_links (host_id, compute_resource_id) {
        /// Referencing host identifier.
        host_id -> Uuid,
        /// Referenced resource identifier.
        compute_resource_id -> Uuid,
    }
}
