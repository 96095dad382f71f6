//! Game status classification.
//!
//! A game occupies a two-hour window starting at its scheduled date and time.
//! Before the window it is upcoming, inside it in progress, after it completed.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::{Game, GameStatus};

/// Length of the window in which a started game counts as in progress.
pub const GAME_WINDOW_MINUTES: i64 = 120;

/// Parse a `H:MM` / `HH:MM` 24h time.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let (hour, minute) = raw.trim().split_once(':')?;
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if hour.len() > 2 || minute.len() != 2 || !all_digits(hour) || !all_digits(minute) {
        return None;
    }
    NaiveTime::from_hms_opt(hour.parse().ok()?, minute.parse().ok()?, 0)
}

/// Canonical zero-padded `HH:MM` form of a valid time.
pub fn normalize_time(raw: &str) -> Option<String> {
    parse_time(raw).map(|t| t.format("%H:%M").to_string())
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Combine a game's date and time into its local start instant.
pub fn parse_start(date: &str, time: &str) -> Option<NaiveDateTime> {
    Some(parse_date(date)?.and_time(parse_time(time)?))
}

/// Classifies games against a clock reading.
#[derive(Debug, Clone, Copy)]
pub struct StatusClassifier {
    unscheduled: GameStatus,
}

impl Default for StatusClassifier {
    fn default() -> Self {
        Self {
            unscheduled: GameStatus::Upcoming,
        }
    }
}

impl StatusClassifier {
    /// `unscheduled` is reported for games whose date/time does not parse.
    pub fn new(unscheduled: GameStatus) -> Self {
        Self { unscheduled }
    }

    pub fn classify(&self, game: &Game, now: NaiveDateTime) -> GameStatus {
        match parse_start(&game.date, &game.time) {
            Some(start) => classify_start(start, now),
            None => {
                tracing::debug!(
                    game_id = %game.id,
                    date = %game.date,
                    time = %game.time,
                    "Unparsable schedule, using fallback status"
                );
                self.unscheduled
            }
        }
    }
}

fn classify_start(start: NaiveDateTime, now: NaiveDateTime) -> GameStatus {
    if now < start {
        GameStatus::Upcoming
    } else if now < start + Duration::minutes(GAME_WINDOW_MINUTES) {
        GameStatus::InProgress
    } else {
        GameStatus::Completed
    }
}
