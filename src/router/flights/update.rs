use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::Result;
use crate::flight::{Flight, FlightChanges};
use crate::router::Valid;
use crate::{AppState, ServerError};

/// Owner is fixed at creation and cannot be changed.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    #[validate(length(min = 1, message = "Origin is required."))]
    pub origin: String,
    #[validate(length(min = 1, message = "Destination is required."))]
    pub destination: String,
    #[validate(range(min = 0.0, message = "Price cannot be negative."))]
    pub price: f64,
    pub departure_time: Option<DateTime<Utc>>,
    pub arrival_time: Option<DateTime<Utc>>,
}

pub async fn handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Valid(body): Valid<Body>,
) -> Result<Json<Flight>> {
    let changes = FlightChanges {
        origin: body.origin,
        destination: body.destination,
        price: body.price,
        departure_time: body.departure_time,
        arrival_time: body.arrival_time,
    };

    let flight = state
        .db
        .flights
        .update(id, changes)
        .await?
        .ok_or(ServerError::NotFound("flight"))?;

    Ok(Json(flight))
}
