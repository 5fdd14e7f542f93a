//! Authentication primitives: login credentials, registrations, and password
//! digests.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use super::user::{ContactDetails, DisplayName, EmailAddress, User, UserValidationError};

/// Minimum password length accepted at registration.
pub const PASSWORD_MIN: usize = 6;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// E-mail was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `email` is trimmed, lowercased, and must not be empty.
/// - `password` must be non-empty but keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use donations::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Ada@Example.org", "123456").unwrap();
/// assert_eq!(creds.email(), "ada@example.org");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw e-mail/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = email.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            email: normalized,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised e-mail suitable for user lookups.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Failure raised when a password cannot be hashed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("password hashing failed: {message}")]
pub struct PasswordHashError {
    message: String,
}

/// Argon2id password digest stored as a PHC string
/// (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`).
///
/// The PHC string carries its own algorithm and cost parameters, so digests
/// created with older parameters keep verifying after a cost change.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Hash `password` with a fresh random salt.
    pub fn generate(password: &str) -> Result<Self, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| PasswordHashError {
                message: err.to_string(),
            })?;
        Ok(Self(hash.to_string()))
    }

    /// Rehydrate a stored digest. Returns `None` when the PHC string is
    /// malformed.
    pub fn from_stored(stored: impl Into<String>) -> Option<Self> {
        let stored = stored.into();
        PasswordHash::new(&stored).ok()?;
        Some(Self(stored))
    }

    /// Check a candidate password against the digest.
    pub fn verify(&self, password: &str) -> bool {
        PasswordHash::new(&self.0).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    }

    /// Stored representation.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(..)")
    }
}

/// A user together with their stored password digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub user: User,
    pub password: PasswordDigest,
}

/// Validation failures for a registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationValidationError {
    /// A user field failed validation.
    User(UserValidationError),
    /// The password is shorter than [`PASSWORD_MIN`].
    PasswordTooShort { min: usize },
}

impl fmt::Display for RegistrationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(err) => err.fmt(f),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
        }
    }
}

impl std::error::Error for RegistrationValidationError {}

impl From<UserValidationError> for RegistrationValidationError {
    fn from(value: UserValidationError) -> Self {
        Self::User(value)
    }
}

/// Raw registration input as received from an inbound adapter.
#[derive(Debug, Clone, Default)]
pub struct RegistrationDraft {
    pub name: String,
    pub email: String,
    pub password: String,
    pub contact: ContactDetails,
}

/// Validated registration request.
#[derive(Debug, Clone)]
pub struct Registration {
    name: DisplayName,
    email: EmailAddress,
    password: Zeroizing<String>,
    contact: ContactDetails,
}

impl Registration {
    /// Validate a registration draft.
    pub fn try_from_draft(draft: RegistrationDraft) -> Result<Self, RegistrationValidationError> {
        let RegistrationDraft {
            name,
            email,
            password,
            contact,
        } = draft;
        let password = Zeroizing::new(password);
        if password.chars().count() < PASSWORD_MIN {
            return Err(RegistrationValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }

        Ok(Self {
            name: DisplayName::new(name)?,
            email: EmailAddress::new(email)?,
            password,
            contact: contact.normalised()?,
        })
    }

    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub fn contact(&self) -> &ContactDetails {
        &self.contact
    }
}
