use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use crate::error::Result;
use crate::user::User;
use crate::{AppState, ServerError};

pub async fn handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>> {
    let user = state
        .db
        .users
        .find_by_id(id)
        .await?
        .ok_or(ServerError::NotFound("user"))?;

    Ok(Json(user))
}
