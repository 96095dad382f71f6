//! Session manager: accounts, session tokens and auth-state notifications.

use std::sync::Arc;

use chrono::{Duration, Utc};
use scrypt::Params;
use tokio::sync::broadcast;

use super::password::{
    hash_password, normalize_email, validate_email, validate_password, verify_password,
};
use crate::db::{timestamp, Repository};
use crate::errors::{AppError, AuthErrorKind};
use crate::models::{Identity, SessionGrant, SignInRequest, SignUpRequest};

const EVENT_CAPACITY: usize = 64;

/// Auth-state change published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn { uid: String, email: String },
    SignedOut { uid: String },
}

/// Resolves and issues sessions on behalf of the account provider.
pub struct SessionManager {
    repo: Arc<Repository>,
    events: broadcast::Sender<AuthEvent>,
    ttl: Duration,
    hash_params: Params,
}

impl SessionManager {
    pub fn new(repo: Arc<Repository>, ttl: Duration, hash_params: Params) -> Self {
        let (events, _receiver) = broadcast::channel(EVENT_CAPACITY);
        Self {
            repo,
            events,
            ttl,
            hash_params,
        }
    }

    /// Receive every auth event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// Create an account and sign it in.
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<SessionGrant, AppError> {
        let email = normalize_email(&request.email);
        validate_email(&email)?;
        validate_password(&request.password)?;

        let display_name = request
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());

        let password = request.password.clone();
        let params = self.hash_params;
        let hash = tokio::task::spawn_blocking(move || hash_password(&password, params))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))??;

        let identity = self.repo.create_user(&email, &hash, display_name).await?;
        tracing::info!(uid = %identity.uid, "Account created");
        self.open_session(identity).await
    }

    /// Check credentials and issue a session.
    pub async fn sign_in(&self, request: &SignInRequest) -> Result<SessionGrant, AppError> {
        let email = normalize_email(&request.email);
        validate_email(&email)?;
        if request.password.is_empty() {
            return Err(AppError::Validation("Password is required".to_string()));
        }

        let (identity, hash) = self
            .repo
            .find_credentials(&email)
            .await?
            .ok_or(AppError::Auth(AuthErrorKind::UserNotFound))?;

        let password = request.password.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&hash, &password))
            .await
            .map_err(|e| AppError::Internal(format!("Password check task failed: {}", e)))??;
        if !matches {
            tracing::warn!(uid = %identity.uid, "Sign-in with wrong password");
            return Err(AppError::Auth(AuthErrorKind::WrongPassword));
        }

        let purged = self
            .repo
            .purge_expired_sessions(Utc::now().timestamp())
            .await?;
        if purged > 0 {
            tracing::debug!("Purged {} expired sessions", purged);
        }

        self.open_session(identity).await
    }

    /// End a session. Returns whether the token was live.
    pub async fn sign_out(&self, token: &str) -> Result<bool, AppError> {
        match self.repo.delete_session(token).await? {
            Some(uid) => {
                self.publish(AuthEvent::SignedOut { uid });
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// The identity behind a session token, if the session is live.
    pub async fn current(&self, token: &str) -> Result<Option<Identity>, AppError> {
        self.repo
            .identity_for_session(token, Utc::now().timestamp())
            .await
    }

    async fn open_session(&self, identity: Identity) -> Result<SessionGrant, AppError> {
        let token = uuid::Uuid::new_v4().to_string();
        let created_at = Utc::now();
        let expires_at = created_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::Internal("Session expiry out of range".to_string()))?;

        self.repo
            .insert_session(
                &token,
                &identity.uid,
                created_at.timestamp(),
                expires_at.timestamp(),
            )
            .await?;

        self.publish(AuthEvent::SignedIn {
            uid: identity.uid.clone(),
            email: identity.email.clone(),
        });

        Ok(SessionGrant {
            token,
            expires_at: timestamp(expires_at),
            identity,
        })
    }

    fn publish(&self, event: AuthEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

/// Log every auth event until the manager is dropped.
pub async fn log_auth_events(mut receiver: broadcast::Receiver<AuthEvent>) {
    loop {
        match receiver.recv().await {
            Ok(AuthEvent::SignedIn { uid, email }) => {
                tracing::info!(uid = %uid, email = %email, "Signed in");
            }
            Ok(AuthEvent::SignedOut { uid }) => {
                tracing::info!(uid = %uid, "Signed out");
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("Auth event log lagged, skipped {} events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
