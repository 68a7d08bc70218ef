//! Users-related HTTP API, authentication included.
mod create;
mod delete;
mod get;
mod list;
pub mod refresh;
pub mod signin;
pub mod signup;
mod update;

use axum::handler::Handler;
use axum::routing::{get, post};
use axum::{Router, middleware};

use crate::AppState;
use crate::middleware::require_access_token;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        // `POST /signup`, `/signin` and `/refresh` go to the auth service.
        .route("/signup", post(signup::handler))
        .route("/signin", post(signin::handler))
        .route("/refresh", post(refresh::handler))
        // `GET /` lists users. Access token required.
        .route(
            "/",
            get(list::handler.layer(middleware::from_fn_with_state(
                state,
                require_access_token,
            )))
            .post(create::handler),
        )
        .route(
            "/{id}",
            get(get::handler)
                .put(update::handler)
                .delete(delete::handler),
        )
}
