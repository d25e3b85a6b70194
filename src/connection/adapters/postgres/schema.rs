//! Diesel schema for connection persistence.

diesel::table! {
    /// Connections between a webview server and a user-delivery server.
    connections (id) {
        /// Connection identifier.
        id -> Uuid,
        /// Paired webview server.
        webview_server_id -> Uuid,
        /// Paired user-delivery server.
        user_delivery_server_id -> Uuid,
        /// Key issued to the webview server.
        #[max_length = 128]
        webview_server_api_key -> Varchar,
        /// Key issued to the user-delivery server.
        #[max_length = 128]
        user_delivery_server_api_key -> Varchar,
        /// Optional user-delivery callback.
        webhook_url -> Nullable<Text>,
        /// Activation status (active or inactive).
        #[max_length = 16]
        status -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last mutation timestamp.
        updated_at -> Timestamptz,
    }
}
