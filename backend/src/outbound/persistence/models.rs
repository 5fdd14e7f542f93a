//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{donations, matches, users};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub password_digest: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    #[expect(dead_code, reason = "audit column not surfaced on the domain user")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub display_name: &'a str,
    pub email: &'a str,
    pub password_digest: &'a str,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
    pub city: Option<&'a str>,
    pub state: Option<&'a str>,
    pub zip_code: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable profile columns; `None` clears the column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserProfileUpdate<'a> {
    pub display_name: &'a str,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
    pub city: Option<&'a str>,
    pub state: Option<&'a str>,
    pub zip_code: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Donation models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = donations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DonationRow {
    pub id: Uuid,
    pub donor_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub condition: Option<String>,
    pub quantity: i32,
    pub location: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub image_urls: Vec<String>,
    pub pickup_instructions: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = donations)]
pub(crate) struct NewDonationRow<'a> {
    pub id: Uuid,
    pub donor_id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub category: &'a str,
    pub condition: Option<&'a str>,
    pub quantity: i32,
    pub location: Option<&'a str>,
    pub city: Option<&'a str>,
    pub state: Option<&'a str>,
    pub zip_code: Option<&'a str>,
    pub image_urls: &'a [String],
    pub pickup_instructions: Option<&'a str>,
    pub expires_at: Option<DateTime<Utc>>,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full replacement of the mutable donation columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = donations)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct DonationUpdate<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub category: &'a str,
    pub condition: Option<&'a str>,
    pub quantity: i32,
    pub location: Option<&'a str>,
    pub city: Option<&'a str>,
    pub state: Option<&'a str>,
    pub zip_code: Option<&'a str>,
    pub image_urls: &'a [String],
    pub pickup_instructions: Option<&'a str>,
    pub expires_at: Option<DateTime<Utc>>,
    pub status: &'a str,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Match models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = matches)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MatchRow {
    pub id: Uuid,
    pub donation_id: Uuid,
    pub requester_id: Uuid,
    pub message: Option<String>,
    pub status: String,
    pub requested_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub pickup_date: Option<DateTime<Utc>>,
    pub pickup_notes: Option<String>,
    pub donor_notes: Option<String>,
    pub requester_rating: Option<i16>,
    pub donor_rating: Option<i16>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = matches)]
pub(crate) struct NewMatchRow<'a> {
    pub id: Uuid,
    pub donation_id: Uuid,
    pub requester_id: Uuid,
    pub message: Option<&'a str>,
    pub status: &'a str,
    pub requested_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Columns a status transition may rewrite.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = matches)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct MatchUpdate<'a> {
    pub status: &'a str,
    pub responded_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub pickup_date: Option<DateTime<Utc>>,
    pub pickup_notes: Option<&'a str>,
    pub donor_notes: Option<&'a str>,
    pub requester_rating: Option<i16>,
    pub donor_rating: Option<i16>,
    pub updated_at: DateTime<Utc>,
}
