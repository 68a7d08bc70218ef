use axum::Json;
use axum::extract::{Query, State};

use crate::AppState;
use crate::error::Result;
use crate::user::{User, UserFilter};

/// List users, filtered on exact `name` and `email`.
pub async fn handler(
    State(state): State<AppState>,
    Query(filter): Query<UserFilter>,
) -> Result<Json<Vec<User>>> {
    Ok(Json(state.db.users.find(&filter).await?))
}
