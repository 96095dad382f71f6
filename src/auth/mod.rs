//! Authentication module.
//!
//! Two independent checks: the optional application key guarding the API
//! surface, and the bearer session token identifying the signed-in user.
//! The key comparison is constant-time to mitigate timing attacks.

mod password;
mod session;

pub use password::*;
pub use session::*;

use axum::{
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use subtle::ConstantTimeEq;

use crate::errors::{codes, AppErrorWithRevision, ErrorDetails, ErrorResponse};
use crate::models::Identity;
use crate::AppState;

/// Header name for the application key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Application key layer function that takes the expected key as a parameter.
pub async fn app_key_layer(expected_key: Option<String>, request: Request, next: Next) -> Response {
    // If no key is configured, allow all requests (dev mode)
    let Some(expected) = expected_key else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    match provided {
        Some(provided_key) if constant_time_compare(provided_key, &expected) => {
            next.run(request).await
        }
        Some(_) => invalid_key_response("Invalid API key"),
        None => invalid_key_response("Missing API key"),
    }
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn invalid_key_response(message: &str) -> Response {
    let body = ErrorResponse {
        success: false,
        error: ErrorDetails {
            code: codes::INVALID_API_KEY.to_string(),
            message: message.to_string(),
            details: None,
        },
        revision_id: 0,
    };

    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

/// The session token from `Authorization: Bearer <token>`, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// The signed-in identity, or `None` for guests.
///
/// Unknown or expired tokens resolve to a guest; whether a guest may proceed
/// is up to the handler.
pub struct CurrentUser(pub Option<Identity>);

impl CurrentUser {
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppErrorWithRevision;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Ok(CurrentUser(None));
        };

        match state.sessions.current(token).await {
            Ok(identity) => Ok(CurrentUser(identity)),
            Err(error) => {
                let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
                Err(AppErrorWithRevision { error, revision_id })
            }
        }
    }
}
