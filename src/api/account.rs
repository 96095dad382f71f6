//! Account API endpoints: sign-up, sign-in, sign-out and the current identity.

use axum::{extract::State, http::HeaderMap, Json};

use super::{current_revision, error, success, ApiResult};
use crate::auth::{bearer_token, CurrentUser};
use crate::errors::AppError;
use crate::models::{Identity, SessionGrant, SignInRequest, SignUpRequest};
use crate::AppState;

/// POST /api/auth/signup - Create an account and open a session.
pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> ApiResult<SessionGrant> {
    let revision_id = current_revision(&state).await;

    match state.sessions.sign_up(&request).await {
        Ok(grant) => success(grant, current_revision(&state).await),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/auth/signin - Open a session for existing credentials.
pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> ApiResult<SessionGrant> {
    let revision_id = current_revision(&state).await;

    match state.sessions.sign_in(&request).await {
        Ok(grant) => success(grant, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/auth/signout - End the caller's session.
pub async fn sign_out(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<()> {
    let revision_id = current_revision(&state).await;

    let Some(token) = bearer_token(&headers) else {
        return error(
            AppError::Unauthenticated("No session to sign out of".to_string()),
            revision_id,
        );
    };

    match state.sessions.sign_out(token).await {
        Ok(_) => success((), revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/auth/me - The signed-in identity, or null for guests.
pub async fn current_identity(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Option<Identity>> {
    let revision_id = current_revision(&state).await;
    success(user.0, revision_id)
}
