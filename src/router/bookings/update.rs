use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::booking::{Booking, BookingChanges, BookingStatus};
use crate::error::Result;
use crate::router::Valid;
use crate::{AppState, ServerError};

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    pub booking_date: Option<DateTime<Utc>>,
    pub status: Option<BookingStatus>,
}

/// Update only the fields present in the body.
pub async fn handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Valid(body): Valid<Body>,
) -> Result<Json<Booking>> {
    let changes = BookingChanges {
        booking_date: body.booking_date,
        status: body.status,
    };

    let booking = state
        .db
        .bookings
        .update(id, changes)
        .await?
        .ok_or(ServerError::NotFound("booking"))?;

    Ok(Json(booking))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use serde_json::json;

    use super::*;
    use crate::router::bookings::tests::create_booking;
    use crate::*;

    #[tokio::test]
    async fn test_update_handler() {
        let app = app(router::state());
        let booking = create_booking(&app).await;

        let path = format!("/api/bookings/{}", booking.id);
        let response = make_request(
            None,
            app.clone(),
            Method::PUT,
            &path,
            json!({ "status": "cancelled" }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let updated: Booking = serde_json::from_slice(&body).unwrap();
        assert_eq!(updated.status, BookingStatus::Cancelled);
        assert_eq!(updated.booking_date, booking.booking_date);

        let path = format!("/api/bookings/{}", Uuid::new_v4());
        let response =
            make_request(None, app, Method::PUT, &path, "{}".to_owned()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
