//! Game model and the request bodies that create or change a game.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::status::{normalize_time, parse_date};

/// Temporal state of a game relative to the current wall-clock time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum GameStatus {
    Upcoming,
    InProgress,
    Completed,
}

impl GameStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upcoming" => Some(GameStatus::Upcoming),
            "in-progress" | "in_progress" => Some(GameStatus::InProgress),
            "completed" => Some(GameStatus::Completed),
            _ => None,
        }
    }
}

/// One roster slot. `player_id` is the identity uid and is unique per game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub player_id: String,
    pub name: String,
}

/// A scheduled pickup game as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,
    pub title: String,
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    /// 24h start time, `HH:MM`
    pub time: String,
    pub skill: String,
    pub notes: String,
    /// Email of the identity that created the game
    pub creator: String,
    /// Players in join order
    pub roster: Vec<RosterEntry>,
    pub created_at: String,
    pub updated_at: String,
    /// Internal version for optimistic concurrency control
    #[serde(default)]
    pub version: i64,
}

impl Game {
    pub fn has_player(&self, player_id: &str) -> bool {
        self.roster.iter().any(|entry| entry.player_id == player_id)
    }

    pub fn player_names(&self) -> Vec<String> {
        self.roster.iter().map(|entry| entry.name.clone()).collect()
    }
}

/// A game as served to clients, with the fields derived for the current viewer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub id: String,
    pub title: String,
    pub date: String,
    pub time: String,
    pub skill: String,
    pub notes: String,
    pub creator: String,
    pub creator_name: String,
    pub players: Vec<String>,
    pub player_ids: Vec<String>,
    pub status: GameStatus,
    pub calendar_link: String,
    pub ics_link: String,
    pub share_text: String,
    /// The viewer holds a roster slot
    pub joined: bool,
    /// The viewer is the creator
    pub can_edit: bool,
    pub updated_at: String,
    pub version: i64,
}

/// Request body for creating a new game.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub skill: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Validated fields of a game about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGame {
    pub title: String,
    pub date: String,
    pub time: String,
    pub skill: String,
    pub notes: String,
}

fn required(value: &str, field: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

fn checked_date(raw: &str) -> Result<String, AppError> {
    let date = required(raw, "Date")?;
    parse_date(&date)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .ok_or_else(|| AppError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", date)))
}

fn checked_time(raw: &str) -> Result<String, AppError> {
    let time = required(raw, "Time")?;
    normalize_time(&time)
        .ok_or_else(|| AppError::Validation(format!("Invalid time '{}', expected HH:MM", time)))
}

impl CreateGameRequest {
    pub fn validate(&self) -> Result<NewGame, AppError> {
        Ok(NewGame {
            title: required(&self.title, "Title")?,
            date: checked_date(&self.date)?,
            time: checked_time(&self.time)?,
            skill: required(&self.skill, "Skill level")?,
            notes: self.notes.as_deref().map(str::trim).unwrap_or_default().to_string(),
        })
    }
}

/// Request body for editing a game. The creator is never editable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGameRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub skill: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Expected version for optimistic concurrency control
    #[serde(default)]
    pub expected_version: Option<i64>,
}

impl UpdateGameRequest {
    /// Validate the supplied fields and return them in stored form.
    pub fn validate(self) -> Result<Self, AppError> {
        Ok(Self {
            title: self.title.as_deref().map(|t| required(t, "Title")).transpose()?,
            date: self.date.as_deref().map(checked_date).transpose()?,
            time: self.time.as_deref().map(checked_time).transpose()?,
            skill: self.skill.as_deref().map(|s| required(s, "Skill level")).transpose()?,
            notes: self.notes.map(|n| n.trim().to_string()),
            expected_version: self.expected_version,
        })
    }
}

/// Request body for the notes editor on the game detail view.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNotesRequest {
    pub notes: String,
}

/// Response body for writes: the confirmation notice plus the re-fetched catalog.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRefresh {
    pub notice: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
    pub games: Vec<GameView>,
}
