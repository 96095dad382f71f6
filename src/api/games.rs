//! Game API endpoints: catalog, lifecycle and roster.
//!
//! Every write is awaited before the catalog is re-fetched, and the response
//! carries the re-fetched state rather than a locally patched copy.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{current_revision, error, success, ApiResult};
use crate::auth::CurrentUser;
use crate::catalog::{Catalog, GameFilter, ViewContext};
use crate::errors::AppError;
use crate::models::{
    CatalogRefresh, CreateGameRequest, Game, GameView, Identity, UpdateGameRequest,
    UpdateNotesRequest,
};
use crate::ownership::{ensure_creator, GuardedAction};
use crate::roster;
use crate::AppState;

/// Fetch the catalog with read retries and derive views for `viewer`.
async fn load_views(
    state: &AppState,
    viewer: Option<&Identity>,
    filter: &GameFilter,
) -> Result<Vec<GameView>, AppError> {
    let policy = state.config.retry_policy();
    let repo = &state.repo;

    let games = policy.run("list games", || repo.list_games()).await?;
    let creator_names = policy
        .run("load creator names", || repo.creator_names())
        .await?;

    let ctx = ViewContext {
        now: state.config.local_now(),
        offset: state.config.utc_offset,
        classifier: state.config.classifier(),
        viewer,
        creator_names: &creator_names,
    };
    Ok(Catalog::new(games).views(&ctx, filter))
}

/// Fetch one game with read retries.
async fn load_game(state: &AppState, id: &str) -> Result<Game, AppError> {
    let repo = &state.repo;
    state
        .config
        .retry_policy()
        .run("get game", || repo.get_game(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Game {} not found", id)))
}

async fn load_view(
    state: &AppState,
    viewer: Option<&Identity>,
    id: &str,
) -> Result<GameView, AppError> {
    let game = load_game(state, id).await?;
    let creator_names = state.repo.creator_names().await?;
    let ctx = ViewContext {
        now: state.config.local_now(),
        offset: state.config.utc_offset,
        classifier: state.config.classifier(),
        viewer,
        creator_names: &creator_names,
    };
    Ok(ctx.view(&game))
}

async fn refreshed(
    state: &AppState,
    viewer: Option<&Identity>,
    notice: String,
    game_id: Option<String>,
) -> Result<CatalogRefresh, AppError> {
    let games = load_views(state, viewer, &GameFilter::default()).await?;
    Ok(CatalogRefresh {
        notice,
        game_id,
        games,
    })
}

/// GET /api/games - List games, optionally filtered by skill and date.
pub async fn list_games(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(filter): Query<GameFilter>,
) -> ApiResult<Vec<GameView>> {
    let revision_id = current_revision(&state).await;

    if let Err(e) = filter.validate() {
        return error(e, revision_id);
    }

    match load_views(&state, user.identity(), &filter).await {
        Ok(games) => success(games, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/games/:id - Get a single game.
pub async fn get_game(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<GameView> {
    let revision_id = current_revision(&state).await;

    match load_view(&state, user.identity(), &id).await {
        Ok(game) => success(game, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/games - Create a new game owned by the caller.
pub async fn create_game(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateGameRequest>,
) -> ApiResult<CatalogRefresh> {
    let revision_id = current_revision(&state).await;

    let Some(identity) = user.identity() else {
        return error(
            AppError::Unauthenticated("Please log in to create a game".to_string()),
            revision_id,
        );
    };

    let new_game = match request.validate() {
        Ok(new_game) => new_game,
        Err(e) => return error(e, revision_id),
    };

    let game = match state.repo.create_game(&identity.email, &new_game).await {
        Ok(game) => game,
        Err(e) => return error(e, revision_id),
    };
    tracing::info!(game_id = %game.id, creator = %identity.email, "Game created");

    let notice = format!("{} created", game.title);
    match refreshed(&state, Some(identity), notice, Some(game.id)).await {
        Ok(refresh) => success(refresh, current_revision(&state).await),
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/games/:id - Edit a game's non-roster fields.
pub async fn update_game(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateGameRequest>,
) -> ApiResult<CatalogRefresh> {
    let revision_id = current_revision(&state).await;

    let result = async {
        let game = load_game(&state, &id).await?;
        let identity = ensure_creator(&game, user.identity(), GuardedAction::Edit)?;
        let request = request.validate()?;
        let updated = state.repo.update_game(&id, &request).await?;
        tracing::info!(game_id = %id, actor = %identity.email, "Game updated");
        refreshed(
            &state,
            Some(identity),
            format!("{} updated", updated.title),
            Some(id.clone()),
        )
        .await
    }
    .await;

    match result {
        Ok(refresh) => success(refresh, current_revision(&state).await),
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/games/:id - Delete a game and its roster.
pub async fn delete_game(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<CatalogRefresh> {
    let revision_id = current_revision(&state).await;

    let result = async {
        let game = load_game(&state, &id).await?;
        let identity = ensure_creator(&game, user.identity(), GuardedAction::Delete)?;
        state.repo.delete_game(&id).await?;
        tracing::info!(game_id = %id, actor = %identity.email, "Game deleted");
        refreshed(&state, Some(identity), "Game deleted".to_string(), None).await
    }
    .await;

    match result {
        Ok(refresh) => success(refresh, current_revision(&state).await),
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/games/:id/notes - Replace a game's notes.
pub async fn update_notes(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateNotesRequest>,
) -> ApiResult<GameView> {
    let revision_id = current_revision(&state).await;

    let result = async {
        let game = load_game(&state, &id).await?;
        let identity = ensure_creator(&game, user.identity(), GuardedAction::UpdateNotes)?;
        state.repo.update_notes(&id, request.notes.trim()).await?;
        tracing::info!(game_id = %id, actor = %identity.email, "Notes updated");
        load_view(&state, Some(identity), &id).await
    }
    .await;

    match result {
        Ok(game) => success(game, current_revision(&state).await),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/games/:id/join - Add the caller to the roster.
pub async fn join_game(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<CatalogRefresh> {
    let revision_id = current_revision(&state).await;

    let result = async {
        let change = roster::join(
            &state.repo,
            &id,
            user.identity(),
            &state.config.classifier(),
            state.config.local_now(),
        )
        .await?;
        refreshed(&state, user.identity(), change.notice, Some(id.clone())).await
    }
    .await;

    match result {
        Ok(refresh) => success(refresh, current_revision(&state).await),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/games/:id/leave - Remove the caller from the roster.
pub async fn leave_game(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<CatalogRefresh> {
    let revision_id = current_revision(&state).await;

    let result = async {
        let change = roster::leave(&state.repo, &id, user.identity()).await?;
        refreshed(&state, user.identity(), change.notice, Some(id.clone())).await
    }
    .await;

    match result {
        Ok(refresh) => success(refresh, current_revision(&state).await),
        Err(e) => error(e, revision_id),
    }
}
