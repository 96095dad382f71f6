//! Roster controller: join and leave a game.
//!
//! Membership is keyed by the identity uid. Both operations are idempotent;
//! repeating one is a no-op that issues no write. Joining is only open while
//! a game is upcoming; leaving is always allowed.

use chrono::NaiveDateTime;

use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{GameStatus, Identity, RosterEntry};
use crate::status::StatusClassifier;

/// Outcome of a roster action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterChange {
    /// Confirmation shown to the user
    pub notice: String,
    /// A roster slot was added or removed
    pub changed: bool,
}

fn signed_in<'a>(identity: Option<&'a Identity>, verb: &str) -> Result<&'a Identity, AppError> {
    identity.ok_or_else(|| AppError::Unauthenticated(format!("Please log in to {} a game", verb)))
}

/// Add the caller to the game's roster.
pub async fn join(
    repo: &Repository,
    game_id: &str,
    identity: Option<&Identity>,
    classifier: &StatusClassifier,
    now: NaiveDateTime,
) -> Result<RosterChange, AppError> {
    let identity = signed_in(identity, "join")?;

    let game = repo
        .get_game(game_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Game {} not found", game_id)))?;

    let status = classifier.classify(&game, now);
    if status != GameStatus::Upcoming {
        tracing::debug!(game_id = %game_id, ?status, "Join rejected, game not upcoming");
        return Err(AppError::Validation(
            "Game is no longer open for joining".to_string(),
        ));
    }

    if game.has_player(&identity.uid) {
        return Ok(RosterChange {
            notice: "You have already joined this game".to_string(),
            changed: false,
        });
    }

    let entry = RosterEntry {
        player_id: identity.uid.clone(),
        name: identity.roster_name(),
    };
    let changed = repo.add_player(game_id, &entry).await?;
    if changed {
        tracing::info!(game_id = %game_id, uid = %identity.uid, "Player joined game");
    }

    Ok(RosterChange {
        notice: format!("{} joined the game", entry.name),
        changed,
    })
}

/// Remove the caller's own slot from the game's roster.
pub async fn leave(
    repo: &Repository,
    game_id: &str,
    identity: Option<&Identity>,
) -> Result<RosterChange, AppError> {
    let identity = signed_in(identity, "leave")?;

    if repo.get_game(game_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Game {} not found", game_id)));
    }

    let changed = repo.remove_player(game_id, &identity.uid).await?;
    if !changed {
        return Ok(RosterChange {
            notice: "You are not on this game's roster".to_string(),
            changed,
        });
    }

    tracing::info!(game_id = %game_id, uid = %identity.uid, "Player left game");
    Ok(RosterChange {
        notice: format!("{} left the game", identity.roster_name()),
        changed,
    })
}
