//! User data model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors raised by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    EmptyDisplayName,
    DisplayNameTooShort { min: usize },
    DisplayNameTooLong { max: usize },
    EmptyEmail,
    InvalidEmail,
    EmailTooLong { max: usize },
    InvalidState,
    FieldTooLong { field: &'static str, max: usize },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyDisplayName => write!(f, "name must not be empty"),
            Self::DisplayNameTooShort { min } => {
                write!(f, "name must be at least {min} characters")
            }
            Self::DisplayNameTooLong { max } => {
                write!(f, "name must be at most {max} characters")
            }
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::InvalidState => write!(f, "state must be a two-letter code"),
            Self::FieldTooLong { field, max } => {
                write!(f, "{field} must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

impl UserValidationError {
    /// Request field the failure refers to, in camelCase.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyId | Self::InvalidId => "id",
            Self::EmptyDisplayName
            | Self::DisplayNameTooShort { .. }
            | Self::DisplayNameTooLong { .. } => "name",
            Self::EmptyEmail | Self::InvalidEmail | Self::EmailTooLong { .. } => "email",
            Self::InvalidState => "state",
            Self::FieldTooLong { field, .. } => field,
        }
    }
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Wrap an already parsed UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, uuid.to_string())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }

        let parsed = Uuid::parse_str(&id).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        let UserId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Minimum allowed length for a display name.
pub const DISPLAY_NAME_MIN: usize = 3;
/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 64;
/// Maximum allowed length for an e-mail address.
pub const EMAIL_MAX: usize = 254;

const CONTACT_FIELD_MAX: usize = 120;
const BIO_MAX: usize = 1000;

/// Human readable name for the user, trimmed of surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`].
    pub fn new(display_name: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = display_name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }

        let length = trimmed.chars().count();
        if length < DISPLAY_NAME_MIN {
            return Err(UserValidationError::DisplayNameTooShort {
                min: DISPLAY_NAME_MIN,
            });
        }
        if length > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Login e-mail address, normalised to lowercase.
///
/// # Examples
/// ```
/// use donations::domain::EmailAddress;
///
/// let email = EmailAddress::new("  Ada@Example.org ").unwrap();
/// assert_eq!(email.as_ref(), "ada@example.org");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an e-mail address.
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = email.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if normalised.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }

        let mut parts = normalised.split('@');
        let well_formed = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty()
        );
        if !well_formed || normalised.chars().any(char::is_whitespace) {
            return Err(UserValidationError::InvalidEmail);
        }

        Ok(Self(normalised))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Optional contact and location details attached to a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub bio: Option<String>,
}

impl ContactDetails {
    /// Trim every field, drop blanks, and validate lengths.
    ///
    /// `state` is normalised to an uppercase two-letter code.
    pub fn normalised(self) -> Result<Self, UserValidationError> {
        let state = trimmed(self.state)
            .map(|value| {
                if value.chars().count() == 2 && value.chars().all(|c| c.is_ascii_alphabetic()) {
                    Ok(value.to_uppercase())
                } else {
                    Err(UserValidationError::InvalidState)
                }
            })
            .transpose()?;

        Ok(Self {
            phone: bounded(self.phone, "phone", CONTACT_FIELD_MAX)?,
            address: bounded(self.address, "address", CONTACT_FIELD_MAX)?,
            city: bounded(self.city, "city", CONTACT_FIELD_MAX)?,
            state,
            zip_code: bounded(self.zip_code, "zipCode", CONTACT_FIELD_MAX)?,
            bio: bounded(self.bio, "bio", BIO_MAX)?,
        })
    }
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
) -> Result<Option<String>, UserValidationError> {
    match trimmed(value) {
        Some(value) if value.chars().count() > max => {
            Err(UserValidationError::FieldTooLong { field, max })
        }
        other => Ok(other),
    }
}

/// Partial profile edit. Absent fields keep their stored value; a blank
/// contact field clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub bio: Option<String>,
}

/// Application user.
///
/// ## Invariants
/// - `name` and `email` are validated on construction.
/// - The password digest never lives on this type; see
///   [`crate::domain::UserAccount`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: DisplayName,
    email: EmailAddress,
    contact: ContactDetails,
    created_at: DateTime<Utc>,
}

impl User {
    /// Build a new [`User`] from validated components.
    pub fn new(
        id: UserId,
        name: DisplayName,
        email: EmailAddress,
        contact: ContactDetails,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            contact,
            created_at,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn contact(&self) -> &ContactDetails {
        &self.contact
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Apply a partial profile edit, validating the merged result.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use donations::domain::{
    ///     ContactDetails, DisplayName, EmailAddress, ProfileUpdate, User, UserId,
    /// };
    ///
    /// let user = User::new(
    ///     UserId::random(),
    ///     DisplayName::new("Ada Lovelace").unwrap(),
    ///     EmailAddress::new("ada@example.org").unwrap(),
    ///     ContactDetails::default(),
    ///     Utc::now(),
    /// );
    /// let edited = user
    ///     .with_profile(ProfileUpdate {
    ///         city: Some(" London ".to_owned()),
    ///         ..ProfileUpdate::default()
    ///     })
    ///     .unwrap();
    /// assert_eq!(edited.name().as_ref(), "Ada Lovelace");
    /// assert_eq!(edited.contact().city.as_deref(), Some("London"));
    /// ```
    pub fn with_profile(self, update: ProfileUpdate) -> Result<Self, UserValidationError> {
        let ProfileUpdate {
            name,
            phone,
            address,
            city,
            state,
            zip_code,
            bio,
        } = update;
        let current = self.contact;
        let contact = ContactDetails {
            phone: phone.or(current.phone),
            address: address.or(current.address),
            city: city.or(current.city),
            state: state.or(current.state),
            zip_code: zip_code.or(current.zip_code),
            bio: bio.or(current.bio),
        }
        .normalised()?;
        let name = match name {
            Some(raw) => DisplayName::new(raw)?,
            None => self.name,
        };

        Ok(Self {
            name,
            contact,
            ..self
        })
    }
}
