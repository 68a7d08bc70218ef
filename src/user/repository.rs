//! Credential store interface.

use async_trait::async_trait;
use uuid::Uuid;

use crate::database::StoreError;
use crate::user::{NewUser, User, UserChanges, UserFilter};

/// Persistence capability for [`User`] records.
///
/// Lookups return `Ok(None)` when nothing matches; `Err` is reserved for
/// store failures.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// List users matching `filter`.
    async fn find(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError>;

    /// Find a user using `id` field.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Find a user using `email` field.
    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<User>, StoreError>;

    /// Find the user whose stored refresh token is exactly `token`.
    async fn find_by_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<User>, StoreError>;

    /// Insert a user. Fails with [`StoreError::Duplicate`] on a taken email.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    /// Replace profile fields, `Ok(None)` when the user does not exist.
    async fn update(
        &self,
        id: Uuid,
        changes: UserChanges,
    ) -> Result<Option<User>, StoreError>;

    /// Overwrite the stored refresh token.
    async fn set_refresh_token(
        &self,
        id: Uuid,
        token: Option<&str>,
    ) -> Result<(), StoreError>;

    /// Delete a user, `false` when there was nothing to delete.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}
