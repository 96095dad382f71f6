//! Database repository for games, users and sessions.
//!
//! Roster changes are single set-add / set-remove statements run in a
//! transaction with the version and revision bumps, never read-modify-write.

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::errors::{AppError, AuthErrorKind};
use crate::models::{
    local_part, Game, Identity, NewGame, Profile, RevisionInfo, RosterEntry, SaveProfileRequest,
    UpdateGameRequest,
};

const GAME_COLUMNS: &str =
    "id, title, date, time, skill, notes, creator, created_at, updated_at, version";

// Current display name wins over the name captured when the player joined.
const ROSTER_QUERY: &str = r#"
    SELECT gp.game_id, gp.player_id,
           COALESCE(NULLIF(TRIM(u.display_name), ''), gp.player_name) AS name
    FROM game_players gp
    LEFT JOIN users u ON u.uid = gp.player_id
"#;

const USER_COLUMNS: &str =
    "uid, email, display_name, player_name, phone, avatar_url, updated_at, version";

/// Timestamp format used for every stored text timestamp.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Get revision info.
    pub async fn get_revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }

    // ==================== GAME OPERATIONS ====================

    /// List all games in creation order, rosters in join order.
    pub async fn list_games(&self) -> Result<Vec<Game>, AppError> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query(&format!(
            "SELECT {} FROM games ORDER BY created_at, rowid",
            GAME_COLUMNS
        ))
        .fetch_all(&mut *tx)
        .await?;

        let roster_rows = sqlx::query(&format!("{} ORDER BY gp.seq", ROSTER_QUERY))
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        let mut rosters: HashMap<String, Vec<RosterEntry>> = HashMap::new();
        for row in &roster_rows {
            rosters
                .entry(row.get("game_id"))
                .or_default()
                .push(roster_entry_from_row(row));
        }

        Ok(rows
            .iter()
            .map(|row| {
                let mut game = game_from_row(row);
                game.roster = rosters.remove(&game.id).unwrap_or_default();
                game
            })
            .collect())
    }

    /// Get a game by ID.
    pub async fn get_game(&self, id: &str) -> Result<Option<Game>, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!("SELECT {} FROM games WHERE id = ?", GAME_COLUMNS))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let roster_rows = sqlx::query(&format!(
            "{} WHERE gp.game_id = ? ORDER BY gp.seq",
            ROSTER_QUERY
        ))
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut game = game_from_row(&row);
        game.roster = roster_rows.iter().map(roster_entry_from_row).collect();
        Ok(Some(game))
    }

    /// Create a new game with an empty roster.
    pub async fn create_game(&self, creator: &str, new_game: &NewGame) -> Result<Game, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = timestamp(Utc::now());

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO games (id, title, date, time, skill, notes, creator, created_at, updated_at, version) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 1)",
        )
        .bind(&id)
        .bind(&new_game.title)
        .bind(&new_game.date)
        .bind(&new_game.time)
        .bind(&new_game.skill)
        .bind(&new_game.notes)
        .bind(creator)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;
        bump_revision(&mut tx, &now).await?;
        tx.commit().await?;

        Ok(Game {
            id,
            title: new_game.title.clone(),
            date: new_game.date.clone(),
            time: new_game.time.clone(),
            skill: new_game.skill.clone(),
            notes: new_game.notes.clone(),
            creator: creator.to_string(),
            roster: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
            version: 1,
        })
    }

    /// Update the non-roster fields of a game with optimistic concurrency control.
    ///
    /// The creator column is never written.
    pub async fn update_game(
        &self,
        id: &str,
        request: &UpdateGameRequest,
    ) -> Result<Game, AppError> {
        let existing = self
            .get_game(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Game {} not found", id)))?;

        if let Some(expected) = request.expected_version {
            if existing.version != expected {
                return Err(AppError::Conflict {
                    message: format!(
                        "Version mismatch: expected {}, current {}",
                        expected, existing.version
                    ),
                    current_version: existing.version,
                });
            }
        }

        let now = timestamp(Utc::now());
        let new_version = existing.version + 1;

        let title = request.title.clone().unwrap_or(existing.title.clone());
        let date = request.date.clone().unwrap_or(existing.date.clone());
        let time = request.time.clone().unwrap_or(existing.time.clone());
        let skill = request.skill.clone().unwrap_or(existing.skill.clone());
        let notes = request.notes.clone().unwrap_or(existing.notes.clone());

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE games SET title = ?, date = ?, time = ?, skill = ?, notes = ?, updated_at = ?, version = ? WHERE id = ? AND version = ?",
        )
        .bind(&title)
        .bind(&date)
        .bind(&time)
        .bind(&skill)
        .bind(&notes)
        .bind(&now)
        .bind(new_version)
        .bind(id)
        .bind(existing.version)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Roster change or edit landed between read and write
            drop(tx);
            let current = self.get_game(id).await?;
            return Err(AppError::Conflict {
                message: "Concurrent modification detected".to_string(),
                current_version: current.map(|g| g.version).unwrap_or(0),
            });
        }

        bump_revision(&mut tx, &now).await?;
        tx.commit().await?;

        Ok(Game {
            id: id.to_string(),
            title,
            date,
            time,
            skill,
            notes,
            creator: existing.creator,
            roster: existing.roster,
            created_at: existing.created_at,
            updated_at: now,
            version: new_version,
        })
    }

    /// Replace a game's notes.
    pub async fn update_notes(&self, id: &str, notes: &str) -> Result<(), AppError> {
        let now = timestamp(Utc::now());
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE games SET notes = ?, updated_at = ?, version = version + 1 WHERE id = ?",
        )
        .bind(notes)
        .bind(&now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Game {} not found", id)));
        }

        bump_revision(&mut tx, &now).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Delete a game and its roster.
    pub async fn delete_game(&self, id: &str) -> Result<(), AppError> {
        let now = timestamp(Utc::now());
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM game_players WHERE game_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM games WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Game {} not found", id)));
        }

        bump_revision(&mut tx, &now).await?;
        tx.commit().await?;
        Ok(())
    }

    // ==================== ROSTER OPERATIONS ====================

    /// Append `entry` to the roster unless its player already holds a slot.
    ///
    /// Returns whether a slot was added.
    pub async fn add_player(&self, game_id: &str, entry: &RosterEntry) -> Result<bool, AppError> {
        let now = timestamp(Utc::now());
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"INSERT OR IGNORE INTO game_players (game_id, player_id, player_name, joined_at)
               SELECT ?, ?, ?, ? WHERE EXISTS (SELECT 1 FROM games WHERE id = ?)"#,
        )
        .bind(game_id)
        .bind(&entry.player_id)
        .bind(&entry.name)
        .bind(&now)
        .bind(game_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM games WHERE id = ?")
                .bind(game_id)
                .fetch_optional(&mut *tx)
                .await?
                .is_some();
            if !exists {
                return Err(AppError::NotFound(format!("Game {} not found", game_id)));
            }
            return Ok(false);
        }

        touch_game(&mut tx, game_id, &now).await?;
        bump_revision(&mut tx, &now).await?;
        tx.commit().await?;
        Ok(true)
    }

    /// Remove the player's own slot. Returns whether a slot was removed.
    pub async fn remove_player(&self, game_id: &str, player_id: &str) -> Result<bool, AppError> {
        let now = timestamp(Utc::now());
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM game_players WHERE game_id = ? AND player_id = ?")
            .bind(game_id)
            .bind(player_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        touch_game(&mut tx, game_id, &now).await?;
        bump_revision(&mut tx, &now).await?;
        tx.commit().await?;
        Ok(true)
    }

    // ==================== USER OPERATIONS ====================

    /// Create an account. Fails with `EmailInUse` if the email is taken.
    pub async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        display_name: Option<&str>,
    ) -> Result<Identity, AppError> {
        let uid = uuid::Uuid::new_v4().to_string();
        let now = timestamp(Utc::now());

        let result = sqlx::query(
            "INSERT INTO users (uid, email, password_hash, display_name, created_at, updated_at, version) VALUES (?, ?, ?, ?, ?, ?, 1)",
        )
        .bind(&uid)
        .bind(email)
        .bind(password_hash)
        .bind(display_name)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(AppError::Auth(AuthErrorKind::EmailInUse));
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Identity {
            uid,
            email: email.to_string(),
            display_name: display_name.map(str::to_string),
            player_name: None,
        })
    }

    /// Look up an account and its password hash by email.
    pub async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<(Identity, String)>, AppError> {
        let row = sqlx::query(
            "SELECT uid, email, display_name, player_name, password_hash FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| (identity_from_row(&row), row.get("password_hash"))))
    }

    /// Display names keyed by email, for resolving game creators.
    pub async fn creator_names(&self) -> Result<HashMap<String, String>, AppError> {
        let rows = sqlx::query("SELECT email, display_name FROM users")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let email: String = row.get("email");
                let display_name: Option<String> = row.get("display_name");
                let name = display_name_or_local_part(display_name, &email);
                (email, name)
            })
            .collect())
    }

    /// Get a user's profile.
    pub async fn get_profile(&self, uid: &str) -> Result<Option<Profile>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE uid = ?", USER_COLUMNS))
            .bind(uid)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(profile_from_row))
    }

    /// Merge the supplied fields into the user's profile.
    pub async fn save_profile(
        &self,
        uid: &str,
        request: &SaveProfileRequest,
    ) -> Result<Profile, AppError> {
        let now = timestamp(Utc::now());
        let result = sqlx::query(
            r#"UPDATE users SET
                display_name = COALESCE(?, display_name),
                player_name = COALESCE(?, player_name),
                phone = COALESCE(?, phone),
                updated_at = ?,
                version = version + 1
            WHERE uid = ?"#,
        )
        .bind(&request.display_name)
        .bind(&request.player_name)
        .bind(&request.phone)
        .bind(&now)
        .bind(uid)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Profile {} not found", uid)));
        }

        self.increment_revision().await?;
        self.get_profile(uid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", uid)))
    }

    /// Record the public URL of the user's uploaded avatar.
    pub async fn set_avatar_url(&self, uid: &str, avatar_url: &str) -> Result<Profile, AppError> {
        let now = timestamp(Utc::now());
        let result = sqlx::query(
            "UPDATE users SET avatar_url = ?, updated_at = ?, version = version + 1 WHERE uid = ?",
        )
        .bind(avatar_url)
        .bind(&now)
        .bind(uid)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Profile {} not found", uid)));
        }

        self.increment_revision().await?;
        self.get_profile(uid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", uid)))
    }

    // ==================== SESSION OPERATIONS ====================

    /// Store a session token for `uid`. Times are unix seconds.
    pub async fn insert_session(
        &self,
        token: &str,
        uid: &str,
        created_at: i64,
        expires_at: i64,
    ) -> Result<(), AppError> {
        sqlx::query("INSERT INTO sessions (token, uid, created_at, expires_at) VALUES (?, ?, ?, ?)")
            .bind(token)
            .bind(uid)
            .bind(created_at)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// The identity behind a session token that has not expired at `now`.
    pub async fn identity_for_session(
        &self,
        token: &str,
        now: i64,
    ) -> Result<Option<Identity>, AppError> {
        let row = sqlx::query(
            r#"SELECT u.uid, u.email, u.display_name, u.player_name
               FROM sessions s JOIN users u ON u.uid = s.uid
               WHERE s.token = ? AND s.expires_at > ?"#,
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(identity_from_row))
    }

    /// Delete a session. Returns the uid it belonged to, if any.
    pub async fn delete_session(&self, token: &str) -> Result<Option<String>, AppError> {
        let row = sqlx::query("DELETE FROM sessions WHERE token = ? RETURNING uid")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| row.get("uid")))
    }

    /// Drop sessions that expired before `now`.
    pub async fn purge_expired_sessions(&self, now: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn increment_revision(&self) -> Result<(), AppError> {
        let mut conn = self.pool.acquire().await?;
        bump_revision(&mut conn, &timestamp(Utc::now())).await?;
        Ok(())
    }
}

async fn bump_revision(conn: &mut SqliteConnection, now: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
        .bind(now)
        .execute(conn)
        .await?;
    Ok(())
}

async fn touch_game(conn: &mut SqliteConnection, id: &str, now: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE games SET updated_at = ?, version = version + 1 WHERE id = ?")
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

// Helper functions for row conversion

fn display_name_or_local_part(display_name: Option<String>, email: &str) -> String {
    display_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| local_part(email).to_string())
}

fn game_from_row(row: &sqlx::sqlite::SqliteRow) -> Game {
    Game {
        id: row.get("id"),
        title: row.get("title"),
        date: row.get("date"),
        time: row.get("time"),
        skill: row.get("skill"),
        notes: row.get("notes"),
        creator: row.get("creator"),
        roster: Vec::new(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        version: row.get("version"),
    }
}

fn roster_entry_from_row(row: &sqlx::sqlite::SqliteRow) -> RosterEntry {
    RosterEntry {
        player_id: row.get("player_id"),
        name: row.get("name"),
    }
}

fn identity_from_row(row: &sqlx::sqlite::SqliteRow) -> Identity {
    Identity {
        uid: row.get("uid"),
        email: row.get("email"),
        display_name: row.get("display_name"),
        player_name: row.get("player_name"),
    }
}

fn profile_from_row(row: &sqlx::sqlite::SqliteRow) -> Profile {
    let email: String = row.get("email");
    Profile {
        uid: row.get("uid"),
        display_name: display_name_or_local_part(row.get("display_name"), &email),
        email,
        player_name: row.get("player_name"),
        phone: row.get("phone"),
        avatar_url: row.get("avatar_url"),
        updated_at: row.get("updated_at"),
    }
}
