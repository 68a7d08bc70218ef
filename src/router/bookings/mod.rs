//! Bookings-related HTTP API.
//!
//! Bookings reference users and flights by id only; neither is checked.
mod create;
mod update;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use crate::booking::Booking;
use crate::error::Result;
use crate::{AppState, ServerError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create::handler))
        .route(
            "/{id}",
            get(find).put(update::handler).delete(delete),
        )
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<Booking>>> {
    Ok(Json(state.db.bookings.find().await?))
}

async fn find(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>> {
    let booking = state
        .db
        .bookings
        .find_by_id(id)
        .await?
        .ok_or(ServerError::NotFound("booking"))?;

    Ok(Json(booking))
}

async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    if !state.db.bookings.delete(id).await? {
        return Err(ServerError::NotFound("booking"));
    }

    Ok(StatusCode::NO_CONTENT)
}
