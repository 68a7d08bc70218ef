use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use crate::error::Result;
use crate::flight::{Flight, FlightFilter, SortOrder};
use crate::{AppState, ServerError};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Params {
    origin: Option<String>,
    destination: Option<String>,
    sort_by_price: Option<String>,
}

/// List flights, optionally filtered and sorted on price.
pub async fn handler(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Json<Vec<Flight>>> {
    let sort_by_price = params
        .sort_by_price
        .as_deref()
        .map(str::parse::<SortOrder>)
        .transpose()
        .map_err(|err| ServerError::ParsingForm(err.into()))?;

    let filter = FlightFilter {
        origin: params.origin,
        destination: params.destination,
        sort_by_price,
    };

    Ok(Json(state.db.flights.find(&filter).await?))
}
