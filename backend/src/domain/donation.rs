//! Donation listings offered by donors.
//!
//! A donation's descriptive fields are validated once through
//! [`DonationDetails::try_from_draft`]; its status is driven by the match
//! workflow and is never taken from user input.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

pub const TITLE_MIN: usize = 5;
pub const TITLE_MAX: usize = 200;
pub const DESCRIPTION_MIN: usize = 10;
pub const DESCRIPTION_MAX: usize = 4000;
pub const CATEGORY_MAX: usize = 50;
pub const MAX_IMAGE_URLS: usize = 10;
const SHORT_FIELD_MAX: usize = 120;
const LONG_FIELD_MAX: usize = 1000;

/// Stable donation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DonationId(Uuid);

impl DonationId {
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

impl fmt::Display for DonationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for DonationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Availability of a donation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DonationStatus {
    Available,
    Reserved,
    Completed,
    Expired,
    Cancelled,
}

impl DonationStatus {
    pub const ALL: [Self; 5] = [
        Self::Available,
        Self::Reserved,
        Self::Completed,
        Self::Expired,
        Self::Cancelled,
    ];

    /// Wire and storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Reserved => "RESERVED",
            Self::Completed => "COMPLETED",
            Self::Expired => "EXPIRED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown donation status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown donation status: {0}")]
pub struct ParseDonationStatusError(pub String);

impl FromStr for DonationStatus {
    type Err = ParseDonationStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == upper)
            .ok_or_else(|| ParseDonationStatusError(s.to_owned()))
    }
}

/// Validation failures for donation details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DonationValidationError {
    TitleLength { min: usize, max: usize },
    DescriptionLength { min: usize, max: usize },
    EmptyCategory,
    CategoryTooLong { max: usize },
    QuantityNotPositive,
    InvalidState,
    FieldTooLong { field: &'static str, max: usize },
    TooManyImages { max: usize },
    EmptyImageUrl { index: usize },
}

impl DonationValidationError {
    /// Request field the error refers to, in wire casing.
    pub fn field(&self) -> &'static str {
        match self {
            Self::TitleLength { .. } => "title",
            Self::DescriptionLength { .. } => "description",
            Self::EmptyCategory | Self::CategoryTooLong { .. } => "category",
            Self::QuantityNotPositive => "quantity",
            Self::InvalidState => "state",
            Self::FieldTooLong { field, .. } => field,
            Self::TooManyImages { .. } | Self::EmptyImageUrl { .. } => "imageUrls",
        }
    }
}

impl fmt::Display for DonationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TitleLength { min, max } => {
                write!(f, "title must be between {min} and {max} characters")
            }
            Self::DescriptionLength { min, max } => {
                write!(f, "description must be between {min} and {max} characters")
            }
            Self::EmptyCategory => write!(f, "category must not be empty"),
            Self::CategoryTooLong { max } => {
                write!(f, "category must be at most {max} characters")
            }
            Self::QuantityNotPositive => write!(f, "quantity must be positive"),
            Self::InvalidState => write!(f, "state must be a two-letter code"),
            Self::FieldTooLong { field, max } => {
                write!(f, "{field} must be at most {max} characters")
            }
            Self::TooManyImages { max } => write!(f, "at most {max} image URLs are allowed"),
            Self::EmptyImageUrl { index } => write!(f, "image URL at index {index} is empty"),
        }
    }
}

impl std::error::Error for DonationValidationError {}

/// Raw descriptive fields as received from an inbound adapter.
#[derive(Debug, Clone, Default)]
pub struct DonationDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub condition: Option<String>,
    pub quantity: Option<i64>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub image_urls: Vec<String>,
    pub pickup_instructions: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Validated descriptive fields of a donation.
///
/// ## Invariants
/// - `title` is 5..=200 characters, `description` at least 10.
/// - `category` is non-empty; `quantity` is positive.
/// - Optional text fields are trimmed and never blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationDetails {
    title: String,
    description: String,
    category: String,
    condition: Option<String>,
    quantity: u32,
    location: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip_code: Option<String>,
    image_urls: Vec<String>,
    pickup_instructions: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn bounded(
    value: Option<String>,
    field: &'static str,
    max: usize,
) -> Result<Option<String>, DonationValidationError> {
    match trimmed(value) {
        Some(value) if value.chars().count() > max => {
            Err(DonationValidationError::FieldTooLong { field, max })
        }
        other => Ok(other),
    }
}

fn within(value: &str, min: usize, max: usize) -> bool {
    let length = value.chars().count();
    (min..=max).contains(&length)
}

impl DonationDetails {
    /// Validate a draft.
    ///
    /// # Examples
    /// ```
    /// use donations::domain::{DonationDetails, DonationDraft};
    ///
    /// let details = DonationDetails::try_from_draft(DonationDraft {
    ///     title: "Winter coats".into(),
    ///     description: "Three adult winter coats, lightly used.".into(),
    ///     category: "Clothing".into(),
    ///     ..DonationDraft::default()
    /// })
    /// .unwrap();
    /// assert_eq!(details.quantity(), 1);
    /// ```
    pub fn try_from_draft(draft: DonationDraft) -> Result<Self, DonationValidationError> {
        let title = draft.title.trim().to_owned();
        if !within(&title, TITLE_MIN, TITLE_MAX) {
            return Err(DonationValidationError::TitleLength {
                min: TITLE_MIN,
                max: TITLE_MAX,
            });
        }

        let description = draft.description.trim().to_owned();
        if !within(&description, DESCRIPTION_MIN, DESCRIPTION_MAX) {
            return Err(DonationValidationError::DescriptionLength {
                min: DESCRIPTION_MIN,
                max: DESCRIPTION_MAX,
            });
        }

        let category = draft.category.trim().to_owned();
        if category.is_empty() {
            return Err(DonationValidationError::EmptyCategory);
        }
        if category.chars().count() > CATEGORY_MAX {
            return Err(DonationValidationError::CategoryTooLong { max: CATEGORY_MAX });
        }

        let quantity = match draft.quantity {
            None => 1,
            Some(value) => u32::try_from(value)
                .ok()
                .filter(|quantity| *quantity > 0)
                .ok_or(DonationValidationError::QuantityNotPositive)?,
        };

        let state = trimmed(draft.state)
            .map(|value| {
                if value.chars().count() == 2 && value.chars().all(|c| c.is_ascii_alphabetic()) {
                    Ok(value.to_uppercase())
                } else {
                    Err(DonationValidationError::InvalidState)
                }
            })
            .transpose()?;

        if draft.image_urls.len() > MAX_IMAGE_URLS {
            return Err(DonationValidationError::TooManyImages {
                max: MAX_IMAGE_URLS,
            });
        }
        let image_urls = draft
            .image_urls
            .into_iter()
            .enumerate()
            .map(|(index, url)| {
                let url = url.trim().to_owned();
                if url.is_empty() {
                    Err(DonationValidationError::EmptyImageUrl { index })
                } else {
                    Ok(url)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            title,
            description,
            category,
            condition: bounded(draft.condition, "condition", SHORT_FIELD_MAX)?,
            quantity,
            location: bounded(draft.location, "location", LONG_FIELD_MAX)?,
            city: bounded(draft.city, "city", SHORT_FIELD_MAX)?,
            state,
            zip_code: bounded(draft.zip_code, "zipCode", SHORT_FIELD_MAX)?,
            image_urls,
            pickup_instructions: bounded(
                draft.pickup_instructions,
                "pickupInstructions",
                LONG_FIELD_MAX,
            )?,
            expires_at: draft.expires_at,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn zip_code(&self) -> Option<&str> {
        self.zip_code.as_deref()
    }

    pub fn image_urls(&self) -> &[String] {
        &self.image_urls
    }

    pub fn pickup_instructions(&self) -> Option<&str> {
        self.pickup_instructions.as_deref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}

/// A donation listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Donation {
    pub id: DonationId,
    pub donor_id: UserId,
    pub status: DonationStatus,
    pub details: DonationDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Donation {
    /// Create a fresh AVAILABLE donation.
    pub fn offer(donor_id: UserId, details: DonationDetails, now: DateTime<Utc>) -> Self {
        Self {
            id: DonationId::random(),
            donor_id,
            status: DonationStatus::Available,
            details,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `user` owns this donation.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.donor_id == user
    }
}

/// Equality and substring predicates for donation listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DonationFilter {
    pub category: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub status: Option<DonationStatus>,
    /// Case-insensitive substring matched against title and description.
    pub search: Option<String>,
}

impl DonationFilter {
    /// Evaluate the filter against an in-memory donation.
    pub fn matches(&self, donation: &Donation) -> bool {
        let details = &donation.details;
        let eq = |wanted: &Option<String>, actual: Option<&str>| {
            wanted
                .as_deref()
                .is_none_or(|wanted| actual == Some(wanted))
        };
        let search_hit = self.search.as_deref().is_none_or(|needle| {
            let needle = needle.to_lowercase();
            details.title().to_lowercase().contains(&needle)
                || details.description().to_lowercase().contains(&needle)
        });

        eq(&self.category, Some(details.category()))
            && eq(&self.city, details.city())
            && eq(&self.state, details.state())
            && self.status.is_none_or(|status| donation.status == status)
            && search_hit
    }
}

/// Sortable donation columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DonationSortField {
    #[default]
    CreatedAt,
    Title,
}

/// Sort direction for listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Ordering applied to donation listings. Defaults to newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DonationSort {
    pub field: DonationSortField,
    pub direction: SortDirection,
}

impl DonationSort {
    /// Sort an in-memory collection, breaking ties by id.
    pub fn apply(&self, donations: &mut [Donation]) {
        donations.sort_by(|a, b| {
            let ordering = match self.field {
                DonationSortField::CreatedAt => a.created_at.cmp(&b.created_at),
                DonationSortField::Title => a.details.title().cmp(b.details.title()),
            }
            .then_with(|| a.id.cmp(&b.id));
            match self.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }
}
