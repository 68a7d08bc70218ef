use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::Result;
use crate::router::Valid;
use crate::user::{User, UserChanges};
use crate::{AppState, ServerError};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(length(min = 1, message = "Name is required."))]
    pub name: String,
    #[validate(email(message = "Email must be formatted."))]
    pub email: String,
}

pub async fn handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Valid(body): Valid<Body>,
) -> Result<Json<User>> {
    let changes = UserChanges {
        name: body.name,
        email: body.email,
    };

    let user = state
        .db
        .users
        .update(id, changes)
        .await?
        .ok_or(ServerError::NotFound("user"))?;

    Ok(Json(user))
}
