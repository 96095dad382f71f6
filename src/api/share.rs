//! Share and export API endpoints.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use super::{current_revision, error, success, ApiResult};
use crate::errors::{AppError, AppErrorWithRevision};
use crate::models::Game;
use crate::share::{
    ics_filename, ics_payload, share_intent, share_links, ShareLinks, SharePayload, SharePlatform,
};
use crate::AppState;

async fn find_game(state: &AppState, id: &str) -> Result<Game, AppError> {
    state
        .repo
        .get_game(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Game {} not found", id)))
}

/// GET /api/games/:id/share - Every share and export link for a game.
pub async fn get_share_links(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ShareLinks> {
    let revision_id = current_revision(&state).await;

    match find_game(&state, &id).await {
        Ok(game) => success(share_links(&game, state.config.utc_offset), revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/games/:id/share/:platform - Share intent for one platform.
pub async fn get_share_intent(
    State(state): State<AppState>,
    Path((id, platform)): Path<(String, String)>,
) -> ApiResult<SharePayload> {
    let revision_id = current_revision(&state).await;

    let Some(platform) = SharePlatform::from_str(&platform) else {
        return error(
            AppError::Validation(format!("Unsupported share platform '{}'", platform)),
            revision_id,
        );
    };

    match find_game(&state, &id).await {
        Ok(game) => success(share_intent(&game, platform), revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/games/:id/ics - Download the game as an iCalendar file.
pub async fn download_ics(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppErrorWithRevision> {
    let revision_id = current_revision(&state).await;
    let fail = |error| AppErrorWithRevision { error, revision_id };

    let game = find_game(&state, &id).await.map_err(fail)?;
    let payload = ics_payload(&game, state.config.utc_offset).ok_or_else(|| {
        fail(AppError::Validation(
            "Game has no valid date and time".to_string(),
        ))
    })?;

    let disposition = format!("attachment; filename=\"{}\"", ics_filename(&game));
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        payload,
    )
        .into_response())
}
