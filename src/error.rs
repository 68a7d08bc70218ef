//! Error handler for travel-booking.

use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::crypto::CryptoError;
use crate::database::StoreError;
use crate::directory::DirectoryError;
use crate::token::TokenError;

pub type Result<T> = std::result::Result<T, ServerError>;

type Source = Box<dyn std::error::Error + Send + Sync>;

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("validation error occurred")]
    Validation(#[from] ValidationErrors),

    #[error("error parsing form data")]
    ParsingForm(Source),

    #[error(transparent)]
    Axum(#[from] JsonRejection),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("invalid or expired token")]
    Forbidden,

    #[error("server is misconfigured: {0}")]
    Configuration(String),

    #[error("dependency failed, {details}")]
    Dependency {
        details: String,
        status: Option<u16>,
        source: Option<Source>,
    },

    #[error("storage request failed")]
    Store(#[from] StoreError),

    #[error("internal server error, {details}")]
    Internal {
        details: String,
        source: Option<Source>,
    },
}

impl From<CryptoError> for ServerError {
    fn from(err: CryptoError) -> Self {
        ServerError::Internal {
            details: "password hashing failed".into(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<DirectoryError> for ServerError {
    fn from(err: DirectoryError) -> Self {
        let status = match &err {
            DirectoryError::Status(code) if *code >= 500 => Some(*code),
            _ => None,
        };

        ServerError::Dependency {
            details: "user service check failed".into(),
            status,
            source: Some(Box::new(err)),
        }
    }
}

impl From<TokenError> for ServerError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::MissingSecret(_)
            | TokenError::SharedSecret
            | TokenError::Lifetime(_) => {
                ServerError::Configuration(err.to_string())
            },
            TokenError::Malformed
            | TokenError::BadSignature
            | TokenError::Expired => ServerError::Forbidden,
            TokenError::Encoding(_) | TokenError::Clock(_) => {
                ServerError::Internal {
                    details: "token signing failed".into(),
                    source: Some(Box::new(err)),
                }
            },
        }
    }
}

/// Structure for detailed error responses.
#[derive(Debug, Serialize)]
pub struct ResponseError {
    r#type: Option<String>,
    title: String,
    status: u16,
    detail: String,
    instance: Option<String>,
    errors: Option<Vec<FieldError>>,
}

impl ResponseError {
    /// Update error status code.
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code.as_u16();
        self
    }

    /// Update `title` field.
    pub fn title(mut self, title: &str) -> Self {
        self.title = title.into();
        self
    }

    /// Add detailed error.
    pub fn details(mut self, description: &str) -> Self {
        self.detail = description.into();
        self
    }

    /// Automatically add errors field.
    pub fn errors(mut self, errors: &ValidationErrors) -> Self {
        self.errors = Some(parse_validation_errors(errors));
        self
    }

    /// Transform [`ResponseError`] into axum [`Response`].
    pub fn into_response(
        self,
    ) -> std::result::Result<Response, axum::http::Error> {
        if let Ok(body) = serde_json::to_string(&self) {
            Response::builder()
                .status(self.status)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
        } else {
            Ok(internal_server_error())
        }
    }
}

impl Default for ResponseError {
    fn default() -> Self {
        Self {
            r#type: None,
            title: "Internal server error.".to_owned(),
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            detail: String::default(),
            instance: None,
            errors: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct FieldError {
    field: String,
    message: String,
}

fn parse_validation_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, issues)| {
            issues.iter().map(move |issue| FieldError {
                field: field.to_string(),
                message: issue
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| issue.code.to_string()),
            })
        })
        .collect()
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let response = ResponseError::default()
            .title("There were validation errors with your request.")
            .details(&self.to_string())
            .status(StatusCode::BAD_REQUEST);

        let response = match &self {
            ServerError::Validation(validation_errors) => {
                response.errors(validation_errors)
            },

            ServerError::ParsingForm(err) => response
                .title("Server error during data parsing.")
                .details(&err.to_string()),

            ServerError::Axum(rejection) => response
                .title("Request body is not valid JSON.")
                .details(&rejection.body_text()),

            ServerError::NotFound(_) => response
                .title("Resource not found.")
                .status(StatusCode::NOT_FOUND),

            ServerError::Unauthorized(_) => response
                .title("Authentication failed.")
                .status(StatusCode::UNAUTHORIZED),

            ServerError::Forbidden => response
                .title("Invalid token.")
                .status(StatusCode::FORBIDDEN),

            ServerError::Configuration(details) => {
                tracing::error!(fault = "configuration", %details, "server is misconfigured");

                ResponseError::default()
            },

            ServerError::Dependency {
                details,
                status,
                source,
            } => {
                tracing::error!(fault = "dependency", err = ?source, %details, "dependency call failed");

                let status = status
                    .and_then(|s| StatusCode::from_u16(s).ok())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                ResponseError::default()
                    .title("A dependency failed.")
                    .details(details)
                    .status(status)
            },

            ServerError::Store(err) => {
                tracing::error!(fault = "dependency", %err, "storage request failed");

                ResponseError::default()
            },

            ServerError::Internal { details, source } => {
                tracing::error!(err = ?source, %details, "server returned 500 status");

                ResponseError::default()
            },
        };

        response
            .into_response()
            .unwrap_or_else(|_| internal_server_error())
    }
}

fn internal_server_error() -> Response {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(
            serde_json::json!({
                "type": null,
                "title": "Internal server error.",
                "status": StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                "detail": null,
                "instance": null,
                "errors": null,
            })
            .to_string()
            .into(),
        )
        .unwrap_or_else(|_| Response::new("Internal server error".into()))
}
