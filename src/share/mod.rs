//! Share and export adapters.
//!
//! Pure functions of game data: web-calendar links, ICS calendar files,
//! social-share text and intents. Anything built from a game whose schedule
//! does not parse degrades to [`INVALID_LINK`] instead of failing.

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

use crate::models::Game;
use crate::status::parse_start;

/// Sentinel returned in place of a link that cannot be built.
pub const INVALID_LINK: &str = "#";

pub const EVENT_DETAILS: &str = "Pickup Basketball Game";
pub const EVENT_LOCATION: &str = "Miami Beach";
pub const UNTITLED_GAME: &str = "Untitled Game";

const EVENT_LENGTH_MINUTES: i64 = 60;

/// Characters `encodeURIComponent` leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn encode(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

fn title_or_default(game: &Game) -> &str {
    let title = game.title.trim();
    if title.is_empty() {
        UNTITLED_GAME
    } else {
        title
    }
}

/// The one-hour calendar event window in UTC, if the schedule parses.
pub fn event_window(game: &Game, offset: FixedOffset) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let local = parse_start(&game.date, &game.time)?;
    let start = offset.from_local_datetime(&local).single()?.with_timezone(&Utc);
    Some((start, start + Duration::minutes(EVENT_LENGTH_MINUTES)))
}

fn calendar_stamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%dT%H%M%SZ").to_string()
}

/// When the game record was last written, for the ICS `DTSTAMP`.
fn last_modified(game: &Game) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&game.updated_at)
        .or_else(|_| DateTime::parse_from_rfc3339(&game.created_at))
        .map(|at| at.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Google Calendar "add event" link for the game.
pub fn calendar_link(game: &Game, offset: FixedOffset) -> String {
    let Some((start, end)) = event_window(game, offset) else {
        tracing::debug!(game_id = %game.id, "Invalid date or time for calendar link");
        return INVALID_LINK.to_string();
    };
    format!(
        "https://www.google.com/calendar/render?action=TEMPLATE&text={}&dates={}/{}&details={}&location={}",
        encode(title_or_default(game)),
        calendar_stamp(start),
        calendar_stamp(end),
        encode(EVENT_DETAILS),
        encode(EVENT_LOCATION),
    )
}

fn escape_ics_text(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}

/// Minimal iCalendar file for the game.
pub fn ics_payload(game: &Game, offset: FixedOffset) -> Option<String> {
    let (start, end) = event_window(game, offset)?;
    let lines = [
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//Pickup Hoops//Games//EN".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}@pickup-hoops", game.id),
        format!("DTSTAMP:{}", calendar_stamp(last_modified(game))),
        format!("SUMMARY:{}", escape_ics_text(title_or_default(game))),
        format!("DTSTART:{}", calendar_stamp(start)),
        format!("DTEND:{}", calendar_stamp(end)),
        format!("DESCRIPTION:{}", EVENT_DETAILS),
        format!("LOCATION:{}", EVENT_LOCATION),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ];
    Some(lines.join("\r\n") + "\r\n")
}

/// Download path of the game's calendar file.
pub fn ics_link(game: &Game, offset: FixedOffset) -> String {
    match event_window(game, offset) {
        Some(_) => format!("/api/games/{}/ics", encode(&game.id)),
        None => INVALID_LINK.to_string(),
    }
}

/// Attachment filename for the calendar file.
pub fn ics_filename(game: &Game) -> String {
    let stem: String = title_or_default(game)
        .chars()
        .map(|c| if c.is_control() || matches!(c, '"' | '/' | '\\') { '_' } else { c })
        .collect();
    format!("{}.ics", stem)
}

/// Social-share text.
pub fn share_text(game: &Game) -> String {
    format!(
        "Check out {} at {} ({}) on Miami Pickup Basketball!",
        game.title, game.time, game.skill
    )
}

/// `sms:` link pre-filled with a reminder.
pub fn sms_link(game: &Game) -> String {
    let body = format!("Reminder: {} on {} at {}", game.title, game.date, game.time);
    format!("sms:?body={}", encode(&body))
}

/// Platforms a game can be shared to.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SharePlatform {
    X,
    TikTok,
    Instagram,
}

impl SharePlatform {
    pub const ALL: [SharePlatform; 3] =
        [SharePlatform::X, SharePlatform::TikTok, SharePlatform::Instagram];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "x" | "twitter" => Some(SharePlatform::X),
            "tiktok" => Some(SharePlatform::TikTok),
            "instagram" => Some(SharePlatform::Instagram),
            _ => None,
        }
    }
}

/// What a client does to share a game on one platform.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharePayload {
    pub platform: SharePlatform,
    pub text: String,
    /// Site or intent to open
    pub url: String,
    /// The platform has no text intent; copy `text` before opening `url`
    pub copy_to_clipboard: bool,
}

/// Share intent for one platform.
pub fn share_intent(game: &Game, platform: SharePlatform) -> SharePayload {
    let text = share_text(game);
    match platform {
        SharePlatform::X => SharePayload {
            platform,
            url: format!("https://twitter.com/intent/tweet?text={}", encode(&text)),
            text,
            copy_to_clipboard: false,
        },
        SharePlatform::TikTok => SharePayload {
            platform,
            text,
            url: "https://www.tiktok.com".to_string(),
            copy_to_clipboard: true,
        },
        SharePlatform::Instagram => SharePayload {
            platform,
            text,
            url: "https://www.instagram.com".to_string(),
            copy_to_clipboard: true,
        },
    }
}

/// Every share and export link for a game.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLinks {
    pub calendar_link: String,
    pub ics_link: String,
    pub sms_link: String,
    pub share_text: String,
    pub intents: Vec<SharePayload>,
}

pub fn share_links(game: &Game, offset: FixedOffset) -> ShareLinks {
    ShareLinks {
        calendar_link: calendar_link(game, offset),
        ics_link: ics_link(game, offset),
        sms_link: sms_link(game),
        share_text: share_text(game),
        intents: SharePlatform::ALL
            .iter()
            .map(|platform| share_intent(game, *platform))
            .collect(),
    }
}
