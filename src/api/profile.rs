//! Profile API endpoints.

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{header, HeaderMap},
    Json,
};

use super::{current_revision, error, success, ApiResult};
use crate::auth::CurrentUser;
use crate::blob::image_extension;
use crate::errors::AppError;
use crate::models::{Identity, Profile, SaveProfileRequest};
use crate::AppState;

fn require_identity(user: &CurrentUser) -> Result<&Identity, AppError> {
    user.identity()
        .ok_or_else(|| AppError::Unauthenticated("Please log in to manage your profile".to_string()))
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

/// GET /api/profile - The caller's profile.
pub async fn get_profile(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Profile> {
    let revision_id = current_revision(&state).await;

    let identity = match require_identity(&user) {
        Ok(identity) => identity,
        Err(e) => return error(e, revision_id),
    };

    match state.repo.get_profile(&identity.uid).await {
        Ok(Some(profile)) => success(profile, revision_id),
        Ok(None) => error(
            AppError::NotFound(format!("Profile {} not found", identity.uid)),
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/profile - Merge the supplied fields into the caller's profile.
pub async fn save_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<SaveProfileRequest>,
) -> ApiResult<Profile> {
    let revision_id = current_revision(&state).await;

    let identity = match require_identity(&user) {
        Ok(identity) => identity,
        Err(e) => return error(e, revision_id),
    };

    let request = SaveProfileRequest {
        display_name: trimmed(request.display_name),
        player_name: trimmed(request.player_name),
        phone: trimmed(request.phone),
    };

    match state.repo.save_profile(&identity.uid, &request).await {
        Ok(profile) => {
            tracing::info!(uid = %identity.uid, "Profile saved");
            success(profile, current_revision(&state).await)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/profile/avatar - Upload the caller's avatar image.
///
/// The body is the raw image; its `Content-Type` must be an image type. The
/// body is read up to the configured limit, so oversized uploads get the
/// error envelope rather than a bare 413.
pub async fn upload_avatar(
    State(state): State<AppState>,
    user: CurrentUser,
    headers: HeaderMap,
    body: Body,
) -> ApiResult<Profile> {
    let revision_id = current_revision(&state).await;

    let identity = match require_identity(&user) {
        Ok(identity) => identity,
        Err(e) => return error(e, revision_id),
    };

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let Some(extension) = image_extension(content_type) else {
        return error(
            AppError::Validation(format!("Unsupported avatar type '{}'", content_type)),
            revision_id,
        );
    };

    let max_bytes = state.config.max_avatar_bytes;
    let body = match to_bytes(body, max_bytes).await {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(uid = %identity.uid, "Avatar body rejected: {}", e);
            return error(
                AppError::Validation(format!("Avatar exceeds {} bytes", max_bytes)),
                revision_id,
            );
        }
    };
    if body.is_empty() {
        return error(
            AppError::Validation("Avatar image is empty".to_string()),
            revision_id,
        );
    }

    let path = format!("avatars/{}.{}", identity.uid, extension);
    let url = match state.blobs.upload(&path, &body).await {
        Ok(url) => url,
        Err(e) => return error(e, revision_id),
    };

    match state.repo.set_avatar_url(&identity.uid, &url).await {
        Ok(profile) => success(profile, current_revision(&state).await),
        Err(e) => error(e, revision_id),
    }
}
