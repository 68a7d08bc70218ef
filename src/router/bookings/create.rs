use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use crate::booking::{Booking, BookingStatus, NewBooking};
use crate::error::Result;
use crate::router::Valid;

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    pub user_id: Uuid,
    pub flight_id: Uuid,
    pub booking_date: DateTime<Utc>,
    #[serde(default)]
    pub status: BookingStatus,
}

pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<Booking>)> {
    let booking = state
        .db
        .bookings
        .create(NewBooking {
            user_id: body.user_id,
            flight_id: body.flight_id,
            booking_date: body.booking_date,
            status: body.status,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use serde_json::json;

    use super::*;
    use crate::*;

    #[tokio::test]
    async fn test_create_with_status() {
        let app = app(router::state());

        let response = make_request(
            None,
            app,
            Method::POST,
            "/api/bookings",
            json!({
                "userId": Uuid::new_v4(),
                "flightId": Uuid::new_v4(),
                "bookingDate": "2025-07-01T08:00:00Z",
                "status": "confirmed",
            })
            .to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let booking: Booking = serde_json::from_slice(&body).unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_create_with_bad_status() {
        let app = app(router::state());

        let response = make_request(
            None,
            app,
            Method::POST,
            "/api/bookings",
            json!({
                "userId": Uuid::new_v4(),
                "flightId": Uuid::new_v4(),
                "bookingDate": "2025-07-01T08:00:00Z",
                "status": "lost",
            })
            .to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
