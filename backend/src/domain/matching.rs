//! Donation requests ("matches") and their status lifecycle.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Donation, DonationId, UserId};

/// Longest message a requester may attach to a request.
pub const MESSAGE_MAX: usize = 500;
const NOTES_MAX: usize = 1000;

/// Stable match identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(Uuid);

impl MatchId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for MatchId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Lifecycle state of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Pending,
    Approved,
    Rejected,
    InProgress,
    Completed,
    Cancelled,
}

impl MatchStatus {
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Approved,
        Self::Rejected,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Wire and storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Terminal statuses accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Completed | Self::Cancelled)
    }

    /// Statuses that block deleting the donation.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Approved | Self::InProgress)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown match status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown match status: {0}")]
pub struct ParseMatchStatusError(pub String);

impl FromStr for MatchStatus {
    type Err = ParseMatchStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == upper)
            .ok_or_else(|| ParseMatchStatusError(s.to_owned()))
    }
}

/// A 1..=5 satisfaction score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

/// Error returned for ratings outside 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rating must be between {min} and {max}, got {value}", min = Rating::MIN, max = Rating::MAX)]
pub struct RatingOutOfRange {
    pub value: i64,
}

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> Result<Self, RatingOutOfRange> {
        u8::try_from(value)
            .ok()
            .filter(|score| (Self::MIN..=Self::MAX).contains(score))
            .map(Self)
            .ok_or(RatingOutOfRange { value })
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = RatingOutOfRange;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

/// Validation failures for free-text match fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchFieldError {
    #[error("message must be at most {max} characters")]
    MessageTooLong { max: usize },
    #[error("{field} must be at most {max} characters")]
    NotesTooLong { field: &'static str, max: usize },
}

impl MatchFieldError {
    /// Request field the error refers to, in wire casing.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MessageTooLong { .. } => "message",
            Self::NotesTooLong { field, .. } => field,
        }
    }
}

/// Trim a request message, dropping blanks and enforcing [`MESSAGE_MAX`].
pub fn normalise_message(message: Option<String>) -> Result<Option<String>, MatchFieldError> {
    bounded_text(message, MESSAGE_MAX)
        .map_err(|()| MatchFieldError::MessageTooLong { max: MESSAGE_MAX })
}

/// Trim a notes field, dropping blanks and enforcing the notes limit.
pub fn normalise_notes(
    notes: Option<String>,
    field: &'static str,
) -> Result<Option<String>, MatchFieldError> {
    bounded_text(notes, NOTES_MAX).map_err(|()| MatchFieldError::NotesTooLong {
        field,
        max: NOTES_MAX,
    })
}

fn bounded_text(value: Option<String>, max: usize) -> Result<Option<String>, ()> {
    let value = value
        .map(|raw| raw.trim().to_owned())
        .filter(|value| !value.is_empty());
    match value {
        Some(text) if text.chars().count() > max => Err(()),
        other => Ok(other),
    }
}

/// A requester's request against a donation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub id: MatchId,
    pub donation_id: DonationId,
    pub requester_id: UserId,
    pub message: Option<String>,
    pub status: MatchStatus,
    pub requested_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub pickup_date: Option<DateTime<Utc>>,
    pub pickup_notes: Option<String>,
    pub donor_notes: Option<String>,
    pub requester_rating: Option<Rating>,
    pub donor_rating: Option<Rating>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Match {
    /// Open a PENDING request.
    pub fn request(
        donation_id: DonationId,
        requester_id: UserId,
        message: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MatchId::random(),
            donation_id,
            requester_id,
            message,
            status: MatchStatus::Pending,
            requested_at: now,
            responded_at: None,
            completed_at: None,
            pickup_date: None,
            pickup_notes: None,
            donor_notes: None,
            requester_rating: None,
            donor_rating: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Auto-reject a competing PENDING request.
    pub fn rejected_by_approval(mut self, now: DateTime<Utc>) -> Self {
        self.status = MatchStatus::Rejected;
        self.responded_at.get_or_insert(now);
        self.updated_at = now;
        self
    }
}

/// A match bundled with the donation it targets.
///
/// This is the record returned by every workflow operation; the donor id is
/// available through `donation.donor_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub request: Match,
    pub donation: Donation,
}

impl MatchRecord {
    pub fn donor_id(&self) -> &UserId {
        &self.donation.donor_id
    }

    pub fn requester_id(&self) -> &UserId {
        &self.request.requester_id
    }
}
