use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::router::Valid;
use crate::user::{NewUser, User};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(length(min = 1, message = "Name is required."))]
    pub name: String,
    #[validate(email(message = "Email must be formatted."))]
    pub email: String,
}

/// Handler to create a user without credentials.
pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<User>)> {
    let user = state
        .db
        .users
        .create(NewUser {
            name: body.name,
            email: body.email,
            password: None,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

#[cfg(test)]
pub(super) mod tests {
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use serde_json::json;

    use super::*;
    use crate::*;

    pub async fn create_user(app: &Router, email: &str) -> User {
        let response = make_request(
            None,
            app.clone(),
            Method::POST,
            "/api/users",
            json!({ "name": "Alice", "email": email }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_create_handler() {
        let state = router::state();
        let app = app(state.clone());

        let user = create_user(&app, "alice@x.com").await;
        assert_eq!(user.name, "Alice");
        assert!(user.password.is_none());

        let stored = state.db.users.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.email, "alice@x.com");
    }

    #[tokio::test]
    async fn test_create_with_invalid_email() {
        let app = app(router::state());

        let response = make_request(
            None,
            app,
            Method::POST,
            "/api/users",
            json!({ "name": "Alice", "email": "alice" }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
