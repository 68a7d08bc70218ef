use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::error::Result;
use crate::{AppState, ServerError};

pub async fn handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    if !state.db.flights.delete(id).await? {
        return Err(ServerError::NotFound("flight"));
    }

    Ok(StatusCode::NO_CONTENT)
}
