//! Diesel schema for task persistence.

diesel::table! {
    /// Per-user task records.
    tasks (id) {
        /// Storage-assigned task identifier.
        id -> Int8,
        /// Task title.
        title -> Text,
        /// Optional free-text description.
        description -> Nullable<Text>,
        /// Lifecycle status in canonical upper-case form.
        #[max_length = 20]
        status -> Varchar,
        /// Owning user identifier.
        owner_id -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
