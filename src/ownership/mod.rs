//! Creator-only guard for game edits, deletes and notes updates.
//!
//! Roster membership is not covered here: any signed-in identity may add or
//! remove its own roster slot.

use crate::errors::AppError;
use crate::models::{Game, Identity};

/// Operations only the creator of a game may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardedAction {
    Edit,
    Delete,
    UpdateNotes,
}

impl GuardedAction {
    fn verb(&self) -> &'static str {
        match self {
            GuardedAction::Edit => "edit this game",
            GuardedAction::Delete => "delete this game",
            GuardedAction::UpdateNotes => "update the notes",
        }
    }
}

/// True when `identity` created `game`.
pub fn can_mutate(game: &Game, identity: Option<&Identity>) -> bool {
    identity.is_some_and(|id| id.email == game.creator)
}

/// Reject the action unless `identity` created `game`.
pub fn ensure_creator<'a>(
    game: &Game,
    identity: Option<&'a Identity>,
    action: GuardedAction,
) -> Result<&'a Identity, AppError> {
    let Some(identity) = identity else {
        return Err(AppError::Unauthenticated(format!(
            "Please log in to {}",
            action.verb()
        )));
    };
    if !can_mutate(game, Some(identity)) {
        tracing::warn!(
            game_id = %game.id,
            uid = %identity.uid,
            ?action,
            "Rejected non-creator mutation"
        );
        return Err(AppError::Forbidden(format!(
            "Only the creator can {}",
            action.verb()
        )));
    }
    Ok(identity)
}
