//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    ContactDetails, DisplayName, EmailAddress, PasswordDigest, User, UserAccount, UserId,
};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, unique_violation,
};
use super::models::{NewUserRow, UserProfileUpdate, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn row_to_account(row: UserRow) -> Result<UserAccount, UserPersistenceError> {
    let UserRow {
        id,
        display_name,
        email,
        password_digest,
        phone,
        address,
        city,
        state,
        zip_code,
        bio,
        created_at,
        updated_at: _,
    } = row;

    let name =
        DisplayName::new(display_name).map_err(|err| UserPersistenceError::query(err.to_string()))?;
    let email =
        EmailAddress::new(email).map_err(|err| UserPersistenceError::query(err.to_string()))?;
    let password = PasswordDigest::from_stored(password_digest)
        .ok_or_else(|| UserPersistenceError::query(format!("malformed password digest for {id}")))?;
    let contact = ContactDetails {
        phone,
        address,
        city,
        state,
        zip_code,
        bio,
    };

    Ok(UserAccount {
        user: User::new(UserId::from_uuid(id), name, email, contact, created_at),
        password,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user = &account.user;
        let contact = user.contact();
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            display_name: user.name().as_ref(),
            email: user.email().as_ref(),
            password_digest: account.password.as_str(),
            phone: contact.phone.as_deref(),
            address: contact.address.as_deref(),
            city: contact.city.as_deref(),
            state: contact.state.as_deref(),
            zip_code: contact.zip_code.as_deref(),
            bio: contact.bio.as_deref(),
            created_at: user.created_at(),
            updated_at: user.created_at(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| {
                if unique_violation(&error).is_some() {
                    UserPersistenceError::duplicate_email(user.email().as_ref())
                } else {
                    map_diesel_error(error)
                }
            })
    }

    async fn update_profile(&self, user: &User) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let contact = user.contact();
        let changes = UserProfileUpdate {
            display_name: user.name().as_ref(),
            phone: contact.phone.as_deref(),
            address: contact.address.as_deref(),
            city: contact.city.as_deref(),
            state: contact.state.as_deref(),
            zip_code: contact.zip_code.as_deref(),
            bio: contact.bio.as_deref(),
            updated_at: Utc::now(),
        };

        let updated = diesel::update(users::table.filter(users::id.eq(user.id().as_uuid())))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_account)
            .transpose()
            .map(|account| account.map(|account| account.user))
    }

    async fn find_account_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_account).transpose()
    }
}
