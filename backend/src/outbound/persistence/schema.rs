//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        display_name -> Varchar,
        /// Lower-cased; unique.
        email -> Varchar,
        /// Salted SHA-256 digest, `salt$hash` in hex.
        password_digest -> Varchar,
        phone -> Nullable<Varchar>,
        address -> Nullable<Varchar>,
        city -> Nullable<Varchar>,
        state -> Nullable<Varchar>,
        zip_code -> Nullable<Varchar>,
        bio -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Offered items.
    donations (id) {
        id -> Uuid,
        donor_id -> Uuid,
        title -> Varchar,
        description -> Text,
        category -> Varchar,
        condition -> Nullable<Varchar>,
        quantity -> Int4,
        location -> Nullable<Varchar>,
        city -> Nullable<Varchar>,
        state -> Nullable<Varchar>,
        zip_code -> Nullable<Varchar>,
        image_urls -> Array<Text>,
        pickup_instructions -> Nullable<Text>,
        expires_at -> Nullable<Timestamptz>,
        /// One of AVAILABLE, RESERVED, COMPLETED, EXPIRED, CANCELLED.
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Requests for donations. `(donation_id, requester_id)` is unique.
    matches (id) {
        id -> Uuid,
        donation_id -> Uuid,
        requester_id -> Uuid,
        message -> Nullable<Text>,
        /// One of PENDING, APPROVED, REJECTED, IN_PROGRESS, COMPLETED, CANCELLED.
        status -> Varchar,
        requested_at -> Timestamptz,
        responded_at -> Nullable<Timestamptz>,
        completed_at -> Nullable<Timestamptz>,
        pickup_date -> Nullable<Timestamptz>,
        pickup_notes -> Nullable<Text>,
        donor_notes -> Nullable<Text>,
        requester_rating -> Nullable<Int2>,
        donor_rating -> Nullable<Int2>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(donations -> users (donor_id));
diesel::joinable!(matches -> donations (donation_id));

diesel::allow_tables_to_appear_in_same_query!(users, donations, matches);
