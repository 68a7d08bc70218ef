use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use crate::AppState;
use crate::error::Result;
use crate::flight::{AveragePrice, GroupBy};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Params {
    #[serde(default)]
    group_by: GroupBy,
}

/// Average flight price per origin or destination.
pub async fn handler(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Json<Vec<AveragePrice>>> {
    Ok(Json(state.db.flights.average_price(params.group_by).await?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use http_body_util::BodyExt;

    use super::*;
    use crate::router::flights::tests::{app_with_user, create_flight};
    use crate::*;

    #[tokio::test]
    async fn test_average_handler() {
        let (_, app, user_id) = app_with_user();
        create_flight(&app, user_id, "JFK", "CDG", 400.0).await;
        create_flight(&app, user_id, "JFK", "LHR", 200.0).await;
        create_flight(&app, user_id, "LHR", "CDG", 100.0).await;

        let response = make_request(
            None,
            app.clone(),
            Method::GET,
            "/api/flights/average-price",
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body,
            serde_json::json!([
                { "key": "JFK", "averagePrice": 300.0 },
                { "key": "LHR", "averagePrice": 100.0 },
            ])
        );

        let response = make_request(
            None,
            app.clone(),
            Method::GET,
            "/api/flights/average-price?groupBy=destination",
            String::default(),
        )
        .await;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Vec<AveragePrice> = serde_json::from_slice(&body).unwrap();
        assert_eq!(body[0].key, "CDG");
        assert_eq!(body[0].average_price, 250.0);

        let response = make_request(
            None,
            app,
            Method::GET,
            "/api/flights/average-price?groupBy=price",
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
