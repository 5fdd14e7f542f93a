//! Domain primitives, aggregates, and services.
//!
//! Purpose: define strongly typed entities for users, donations and matches,
//! the match status workflow, and the services implementing the driving
//! ports. Keep types free of transport and persistence concerns.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User, Donation, Match and their identifiers.
//! - `plan_transition`: pure match status transition planning.
//! - `MatchWorkflowService`, `DonationService`, `AccountService`.

pub mod account_service;
pub mod auth;
pub mod donation;
pub mod donation_locks;
pub mod donation_service;
pub mod error;
pub mod match_service;
pub mod match_transition;
pub mod matching;
pub mod pagination;
pub mod ports;
pub mod trace_id;
pub mod user;

pub use self::account_service::AccountService;
pub use self::auth::{
    LoginCredentials, LoginValidationError, PASSWORD_MIN, PasswordDigest, PasswordHashError,
    Registration, RegistrationDraft, RegistrationValidationError, UserAccount,
};
pub use self::donation::{
    Donation, DonationDetails, DonationDraft, DonationFilter, DonationId, DonationSort,
    DonationSortField, DonationStatus, DonationValidationError, ParseDonationStatusError,
    SortDirection,
};
pub use self::donation_locks::DonationLocks;
pub use self::donation_service::DonationService;
pub use self::error::{Error, ErrorCode};
pub use self::match_service::MatchWorkflowService;
pub use self::match_transition::{
    Party, StatusChange, TransitionError, TransitionPlan, plan_transition,
};
pub use self::matching::{
    MESSAGE_MAX, Match, MatchFieldError, MatchId, MatchRecord, MatchStatus,
    ParseMatchStatusError, Rating, RatingOutOfRange, normalise_message, normalise_notes,
};
pub use self::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Page, PageRequest, PageRequestError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    ContactDetails, DisplayName, EmailAddress, ProfileUpdate, User, UserId, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use donations::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
