use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::Result;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    pub refresh_token: Option<String>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub access_token: String,
}

/// Handler to mint a new access token.
///
/// An unreadable body counts as a missing token.
pub async fn handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<Body>, JsonRejection>,
) -> Result<Json<Response>> {
    let body = body.map(|Json(body)| body).unwrap_or_default();
    let access_token = state.auth.refresh(body.refresh_token.as_deref()).await?;

    Ok(Json(Response { access_token }))
}
