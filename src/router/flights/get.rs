use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use crate::error::Result;
use crate::flight::Flight;
use crate::{AppState, ServerError};

pub async fn handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Flight>> {
    let flight = state
        .db
        .flights
        .find_by_id(id)
        .await?
        .ok_or(ServerError::NotFound("flight"))?;

    Ok(Json(flight))
}
