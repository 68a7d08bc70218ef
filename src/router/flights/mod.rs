//! Flights-related HTTP API.
mod average;
mod create;
mod delete;
mod get;
mod list;
mod update;

use axum::Router;
use axum::routing::get;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::handler).post(create::handler))
        // `GET /average-price` wins over `/{id}`.
        .route("/average-price", get(average::handler))
        .route(
            "/{id}",
            get(get::handler)
                .put(update::handler)
                .delete(delete::handler),
        )
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use serde_json::json;
    use uuid::Uuid;

    use crate::directory::StubDirectory;
    use crate::flight::Flight;
    use crate::*;

    /// App whose User service knows a single user.
    pub fn app_with_user() -> (AppState, Router, Uuid) {
        let directory = Arc::new(StubDirectory::new());
        let user_id = Uuid::new_v4();
        directory.add(user_id);

        let state = router::state_with(directory);
        (state.clone(), app(state), user_id)
    }

    pub async fn create_flight(
        app: &Router,
        user_id: Uuid,
        origin: &str,
        destination: &str,
        price: f64,
    ) -> Flight {
        let body = json!({
            "origin": origin,
            "destination": destination,
            "price": price,
            "userId": user_id,
        });
        let response = make_request(
            None,
            app.clone(),
            Method::POST,
            "/api/flights",
            body.to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }
}
