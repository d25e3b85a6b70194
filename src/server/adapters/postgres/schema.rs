//! Diesel schema for server persistence.

diesel::table! {
    /// Registered servers of every kind.
    servers (id) {
        /// Server identifier.
        id -> Uuid,
        /// Server kind (`webview` or `user_delivery`).
        #[max_length = 32]
        kind -> Varchar,
        /// Name, unique per kind.
        #[max_length = 255]
        name -> Varchar,
        /// Activation status (active or inactive).
        #[max_length = 16]
        status -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last mutation timestamp.
        updated_at -> Timestamptz,
    }
}
