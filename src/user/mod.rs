mod repository;

pub use repository::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User as saved on database.
#[derive(
    Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string, unset for users created without signup.
    #[serde(skip)]
    pub password: Option<String>,
    #[serde(skip)]
    pub refresh_token: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Data required to insert a [`User`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
}

/// Profile fields replaced on update.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserChanges {
    pub name: String,
    pub email: String,
}

/// Exact-match filters used when listing users.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct UserFilter {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserFilter {
    /// Whether `user` passes every set filter.
    pub fn matches(&self, user: &User) -> bool {
        self.name.as_ref().is_none_or(|name| *name == user.name)
            && self.email.as_ref().is_none_or(|email| *email == user.email)
    }
}
