//! Travel booking backend: users with token-based authentication, flights
//! checked against the User service, and bookings.

#[forbid(unsafe_code)]
#[deny(missing_docs, unused_mut)]
mod auth;
mod booking;
mod crypto;
mod database;
mod directory;
pub mod error;
mod flight;
mod middleware;
mod router;
pub mod telemetry;
mod token;
mod user;

pub mod config;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{Method, StatusCode, header};
use axum::routing::get;
use axum::{Router, middleware as AxumMiddleware};
use error::ServerError;
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// MUST NEVER be used in production.
///
/// With a state, the request carries an access token for a random user.
#[cfg(test)]
pub async fn make_request(
    state: Option<&AppState>,
    app: Router,
    method: Method,
    path: &str,
    body: String,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use tower::util::ServiceExt;

    let mut request = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(state) = state {
        let token = state
            .token
            .create(token::TokenKind::Access, &uuid::Uuid::new_v4().to_string())
            .expect("cannot create JWT");
        request =
            request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    app.oneshot(request.body(axum::body::Body::from(body)).unwrap())
        .await
        .unwrap()
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Configuration>,
    pub db: database::Database,
    pub auth: auth::AuthService,
    pub token: token::TokenManager,
    pub directory: Arc<dyn directory::UserDirectory>,
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .on_body_chunk(|chunk: &Bytes, latency: Duration, _span: &tracing::Span| {
                    tracing::trace!(size_bytes = chunk.len(), latency = ?latency, "sending body chunk")
                })
                .make_span_with(DefaultMakeSpan::new().include_headers(true).level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new())
                .on_response(DefaultOnResponse::new().include_headers(true).latency_unit(LatencyUnit::Micros)),
        )
        // Set a timeout.
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, REQUEST_TIMEOUT))
        // Remove senstive headers from trace.
        .layer(SetSensitiveHeadersLayer::new([header::AUTHORIZATION, header::COOKIE]))
        // Add CORS preflight support.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
                .allow_headers(Any)
                .vary([header::AUTHORIZATION]),
        );

    Router::new()
        // `GET /status.json` goes to `status`.
        .route("/status.json", get(router::status::status))
        .nest("/api/users", router::users::router(state.clone()))
        .nest("/api/flights", router::flights::router())
        .nest("/api/bookings", router::bookings::router())
        .with_state(state)
        .route_layer(AxumMiddleware::from_fn(telemetry::track))
        .layer(middleware)
}

/// Initialize the application state.
pub async fn initialize_state(
    config: Arc<config::Configuration>,
) -> Result<AppState, Box<dyn std::error::Error>> {
    let db = match config.postgres {
        Some(ref postgres) => {
            database::Database::connect(
                &postgres.url,
                postgres.pool_size.unwrap_or(database::DEFAULT_POOL_SIZE),
            )
            .await?
        },
        None => {
            tracing::warn!(
                "no `DATABASE_URL` nor `postgres` entry, data is kept in memory and lost on restart"
            );
            database::Database::in_memory()
        },
    };

    let passwords = Arc::new(crypto::PasswordManager::new(config.argon2.clone())?);

    let token = token::TokenManager::new(&config.secrets, &config.token)?;
    if !token.is_configured() {
        tracing::warn!(
            fault = "configuration",
            "missing `{}` or `{}`, signin and refresh will fail",
            config::ACCESS_TOKEN_SECRET,
            config::REFRESH_TOKEN_SECRET
        );
    }

    let directory = Arc::new(directory::HttpUserDirectory::new(
        config.user_service_url.clone(),
        &config.directory,
    )?);
    tracing::info!(url = %config.user_service_url, "user service configured");

    let auth = auth::AuthService::new(db.users.clone(), passwords, token.clone());

    Ok(AppState {
        config,
        db,
        auth,
        token,
        directory,
    })
}
