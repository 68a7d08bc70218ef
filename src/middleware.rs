//! Route guards.

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use crate::token::{Claims, TokenKind, TokenManager};
use crate::ServerError;

const BEARER: &str = "Bearer ";

/// Reject requests without a valid access token.
///
/// Decoded [`Claims`] are put into request extensions.
pub async fn require_access_token(
    State(token): State<TokenManager>,
    mut req: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix(BEARER))
        .filter(|token| !token.is_empty())
        .ok_or(ServerError::Unauthorized("missing access token"))?;

    let claims: Claims = token.decode(TokenKind::Access, bearer)?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
