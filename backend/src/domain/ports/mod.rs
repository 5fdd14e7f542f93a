//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`) are implemented by outbound adapters; driving
//! ports (`*Command`, `*Query`, `*Service`) are implemented by domain services
//! and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod donation_command;
mod donation_query;
mod donation_repository;
mod login_service;
mod match_command;
mod match_query;
mod match_repository;
mod profile_command;
mod user_profile_query;
mod user_repository;

#[cfg(test)]
pub use donation_command::MockDonationCommand;
pub use donation_command::DonationCommand;
#[cfg(test)]
pub use donation_query::MockDonationQuery;
pub use donation_query::{DonationQuery, ListDonationsRequest};
#[cfg(test)]
pub use donation_repository::MockDonationRepository;
pub use donation_repository::{
    DonationRepository, DonationRepositoryError, FixtureDonationRepository,
};
#[cfg(test)]
pub use login_service::{MockLoginService, MockRegistrationService};
pub use login_service::{LoginService, RegistrationService};
#[cfg(test)]
pub use match_command::MockMatchCommand;
pub use match_command::{MatchCommand, RequestDonationRequest, UpdateMatchStatusRequest};
#[cfg(test)]
pub use match_query::MockMatchQuery;
pub use match_query::MatchQuery;
#[cfg(test)]
pub use match_repository::MockMatchRepository;
pub use match_repository::{FixtureMatchRepository, MatchRepository, MatchRepositoryError};
#[cfg(test)]
pub use profile_command::MockProfileCommand;
pub use profile_command::ProfileCommand;
#[cfg(test)]
pub use user_profile_query::MockUserProfileQuery;
pub use user_profile_query::UserProfileQuery;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{FixtureUserRepository, UserPersistenceError, UserRepository};
