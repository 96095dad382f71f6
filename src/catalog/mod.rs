//! Game catalog: the date-ordered list of games, its filtered view and the
//! per-viewer fields derived for each game.

use std::collections::HashMap;

use chrono::{FixedOffset, NaiveDateTime};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{local_part, Game, GameView, Identity};
use crate::ownership::can_mutate;
use crate::share;
use crate::status::{parse_date, StatusClassifier};

/// Transient filter taken from the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameFilter {
    /// Skill level, compared case-insensitively
    #[serde(default)]
    pub skill: Option<String>,
    /// Keep games on or after this `YYYY-MM-DD` date
    #[serde(default)]
    pub date: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl GameFilter {
    /// Reject a date filter that is not a calendar date.
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(date) = non_empty(&self.date) {
            if parse_date(date).is_none() {
                return Err(AppError::Validation(format!(
                    "Invalid date filter '{}', expected YYYY-MM-DD",
                    date
                )));
            }
        }
        Ok(())
    }

    pub fn matches(&self, game: &Game) -> bool {
        let skill_ok = match non_empty(&self.skill) {
            None => true,
            Some(skill) => game.skill.trim().eq_ignore_ascii_case(skill),
        };
        let date_ok = match non_empty(&self.date).map(parse_date) {
            None => true,
            Some(None) => false,
            Some(Some(from)) => parse_date(&game.date).is_some_and(|d| d >= from),
        };
        skill_ok && date_ok
    }
}

/// Sort games by date ascending; games without a usable date sort as
/// 1970-01-01. Ties keep their order.
pub fn sort_by_date(games: &mut [Game]) {
    games.sort_by_key(|game| parse_date(&game.date).unwrap_or_default());
}

/// Games matching `filter`, in their original relative order.
pub fn filter_games(games: &[Game], filter: &GameFilter) -> Vec<Game> {
    games.iter().filter(|g| filter.matches(g)).cloned().collect()
}

/// Creator display name: profile name, else email local part.
pub fn creator_name(creator: &str, names: &HashMap<String, String>) -> String {
    if creator.trim().is_empty() {
        return "Unknown Creator".to_string();
    }
    names
        .get(creator)
        .cloned()
        .unwrap_or_else(|| local_part(creator).to_string())
}

/// Everything needed to derive a [`GameView`].
pub struct ViewContext<'a> {
    pub now: NaiveDateTime,
    pub offset: FixedOffset,
    pub classifier: StatusClassifier,
    pub viewer: Option<&'a Identity>,
    /// Display names keyed by email
    pub creator_names: &'a HashMap<String, String>,
}

impl ViewContext<'_> {
    pub fn view(&self, game: &Game) -> GameView {
        GameView {
            id: game.id.clone(),
            title: game.title.clone(),
            date: game.date.clone(),
            time: game.time.clone(),
            skill: game.skill.clone(),
            notes: game.notes.clone(),
            creator: game.creator.clone(),
            creator_name: creator_name(&game.creator, self.creator_names),
            players: game.player_names(),
            player_ids: game.roster.iter().map(|e| e.player_id.clone()).collect(),
            status: self.classifier.classify(game, self.now),
            calendar_link: share::calendar_link(game, self.offset),
            ics_link: share::ics_link(game, self.offset),
            share_text: share::share_text(game),
            joined: self.viewer.is_some_and(|id| game.has_player(&id.uid)),
            can_edit: can_mutate(game, self.viewer),
            updated_at: game.updated_at.clone(),
            version: game.version,
        }
    }
}

/// The full, date-ordered set of known games.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    games: Vec<Game>,
}

impl Catalog {
    pub fn new(mut games: Vec<Game>) -> Self {
        sort_by_date(&mut games);
        Self { games }
    }

    /// Views of the games matching `filter`, in date order.
    pub fn views(&self, ctx: &ViewContext<'_>, filter: &GameFilter) -> Vec<GameView> {
        filter_games(&self.games, filter)
            .iter()
            .map(|g| ctx.view(g))
            .collect()
    }
}
