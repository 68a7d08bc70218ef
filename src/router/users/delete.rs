use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::error::Result;
use crate::{AppState, ServerError};

pub async fn handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    if !state.db.users.delete(id).await? {
        return Err(ServerError::NotFound("user"));
    }

    tracing::info!(user_id = %id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::router::users::create::tests::create_user;
    use crate::*;

    #[tokio::test]
    async fn test_delete_handler() {
        let app = app(router::state());
        let user = create_user(&app, "alice@x.com").await;

        let path = format!("/api/users/{}", user.id);
        let response =
            make_request(None, app.clone(), Method::DELETE, &path, String::default())
                .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        // Gone.
        let response =
            make_request(None, app.clone(), Method::GET, &path, String::default())
                .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response =
            make_request(None, app, Method::DELETE, &path, String::default()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
