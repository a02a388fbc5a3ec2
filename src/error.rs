use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Fatal configuration problems detected before the server binds.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Why a call to the remote evaluation API did not produce evaluations.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("feature flag API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("feature flag API responded with {status}: {message}")]
    Status { status: u16, message: String },

    #[error("feature flag API did not answer within {0:?}")]
    Timeout(Duration),

    #[error("feature flag API returned an unreadable body: {0}")]
    Decode(String),
}

/// Rejected inbound session parameters. Rendered as a 400.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("instituteId query parameter is required")]
    MissingInstituteId,

    #[error("userId query parameter is required")]
    MissingUserId,
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for InputError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: self.to_string(),
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}
