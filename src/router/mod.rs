pub mod bookings;
pub mod flights;
pub mod status;
pub mod users;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::ServerError;

/// JSON body checked against its `validator` rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct Valid<T>(pub T);

impl<T, S> FromRequest<S> for Valid<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Valid(value))
    }
}

/// In-memory state for handler tests.
#[cfg(test)]
pub fn state() -> crate::AppState {
    state_with(std::sync::Arc::new(crate::directory::StubDirectory::new()))
}

/// Same as [`state`] with a given User service.
#[cfg(test)]
pub fn state_with(
    directory: std::sync::Arc<dyn crate::directory::UserDirectory>,
) -> crate::AppState {
    use std::sync::Arc;

    let db = crate::database::Database::in_memory();
    let token = crate::token::test_manager();
    let auth = crate::auth::AuthService::new(
        db.users.clone(),
        Arc::new(crate::crypto::test_manager()),
        token.clone(),
    );

    crate::AppState {
        config: Arc::new(crate::config::Configuration::default()),
        db,
        auth,
        token,
        directory,
    }
}
