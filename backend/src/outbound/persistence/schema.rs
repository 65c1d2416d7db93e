//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate
//! with `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts. `email` is unique.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        display_name -> Varchar,
        department -> Nullable<Varchar>,
        /// `USER`, `STAFF`, or `ADMIN`.
        role -> Varchar,
        /// Encoded one-way verifier.
        password_hash -> Text,
        active -> Bool,
        registered_at -> Timestamptz,
    }
}

diesel::table! {
    /// Reported items.
    items (id) {
        id -> Uuid,
        reporter_id -> Uuid,
        name -> Varchar,
        description -> Text,
        location -> Varchar,
        category -> Nullable<Varchar>,
        /// `LOST` or `FOUND`.
        kind -> Nullable<Varchar>,
        status -> Varchar,
        reported_at -> Timestamptz,
    }
}

diesel::table! {
    /// Claim requests. Rows are removed with their item.
    claim_requests (id) {
        id -> Uuid,
        item_id -> Uuid,
        requester_id -> Uuid,
        /// `PENDING`, `APPROVED`, or `REJECTED`.
        status -> Varchar,
        requested_at -> Timestamptz,
        /// Set only once the request is approved.
        approved_date -> Nullable<Date>,
    }
}

diesel::joinable!(items -> users (reporter_id));
diesel::joinable!(claim_requests -> items (item_id));
diesel::joinable!(claim_requests -> users (requester_id));

diesel::allow_tables_to_appear_in_same_query!(users, items, claim_requests);
