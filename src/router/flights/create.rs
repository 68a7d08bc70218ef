use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::Result;
use crate::flight::{Flight, NewFlight};
use crate::router::Valid;
use crate::{AppState, ServerError};

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    #[validate(length(min = 1, message = "Origin is required."))]
    pub origin: String,
    #[validate(length(min = 1, message = "Destination is required."))]
    pub destination: String,
    #[validate(range(min = 0.0, message = "Price cannot be negative."))]
    pub price: f64,
    pub user_id: Uuid,
    pub departure_time: Option<DateTime<Utc>>,
    pub arrival_time: Option<DateTime<Utc>>,
}

/// Handler to create a flight owned by an existing user.
///
/// The user is checked against the User service first. Nothing holds the
/// user between the check and the insert.
pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<Flight>)> {
    if !state.directory.user_exists(body.user_id).await? {
        return Err(ServerError::NotFound("user"));
    }

    let flight = state
        .db
        .flights
        .create(NewFlight {
            origin: body.origin,
            destination: body.destination,
            price: body.price,
            departure_time: body.departure_time,
            arrival_time: body.arrival_time,
            user_id: body.user_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(flight)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::directory::StubDirectory;
    use crate::flight::FlightFilter;
    use crate::router::flights::tests::{app_with_user, create_flight};
    use crate::*;

    fn body(user_id: Uuid) -> String {
        json!({
            "origin": "JFK",
            "destination": "CDG",
            "price": 420.0,
            "userId": user_id,
            "departureTime": "2025-07-01T08:00:00Z",
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_create_handler() {
        let (_, app, user_id) = app_with_user();

        let flight = create_flight(&app, user_id, "JFK", "CDG", 420.0).await;
        assert_eq!(flight.user_id, user_id);
        assert_eq!(flight.price, 420.0);
    }

    #[tokio::test]
    async fn test_create_with_unknown_user() {
        let (state, app, _) = app_with_user();

        let response = make_request(
            None,
            app,
            Method::POST,
            "/api/flights",
            body(Uuid::new_v4()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let flights = state.db.flights.find(&FlightFilter::default()).await.unwrap();
        assert!(flights.is_empty());
    }

    #[tokio::test]
    async fn test_create_with_user_service_down() {
        let state = router::state_with(Arc::new(StubDirectory::failing(503)));
        let app = app(state.clone());

        let response =
            make_request(None, app, Method::POST, "/api/flights", body(Uuid::new_v4()))
                .await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let flights = state.db.flights.find(&FlightFilter::default()).await.unwrap();
        assert!(flights.is_empty());
    }

    #[tokio::test]
    async fn test_create_with_invalid_body() {
        let (_, app, user_id) = app_with_user();

        let response = make_request(
            None,
            app.clone(),
            Method::POST,
            "/api/flights",
            json!({ "origin": "JFK", "destination": "CDG", "price": -1.0, "userId": user_id })
                .to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = make_request(
            None,
            app,
            Method::POST,
            "/api/flights",
            json!({ "origin": "JFK", "destination": "CDG", "price": 10.0 }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
