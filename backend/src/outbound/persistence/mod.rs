//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations translate between Diesel row structs and
//! domain types; no workflow rules live here. Row structs (`models.rs`) and
//! table definitions (`schema.rs`) stay private to this module. Connections
//! come from a `bb8` pool through `diesel-async`.
//!
//! # Example
//!
//! ```no_run
//! use donations::outbound::persistence::{DbPool, DieselMatchRepository, PoolConfig};
//!
//! # async fn wire() -> Result<(), donations::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/donations")).await?;
//! let matches = DieselMatchRepository::new(pool);
//! # let _ = matches;
//! # Ok(())
//! # }
//! ```

mod diesel_basic_error_mapping;
mod diesel_donation_repository;
mod diesel_match_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_donation_repository::DieselDonationRepository;
pub use diesel_match_repository::DieselMatchRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
