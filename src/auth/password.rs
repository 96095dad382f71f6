//! Credential checks and password hashing.

use scrypt::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Params, Scrypt,
};

use crate::errors::{AppError, AuthErrorKind};

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Trim and lower-case an email before any lookup.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Reject an empty or malformed email address.
pub fn validate_email(email: &str) -> Result<(), AppError> {
    if email.is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(AppError::Auth(AuthErrorKind::InvalidEmail));
    };
    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@');
    if local.is_empty() || !domain_ok || email.chars().any(char::is_whitespace) {
        return Err(AppError::Auth(AuthErrorKind::InvalidEmail));
    }
    Ok(())
}

/// Reject an empty or too-short password.
pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.is_empty() {
        return Err(AppError::Validation("Password is required".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Auth(AuthErrorKind::WeakPassword));
    }
    Ok(())
}

/// Hash a password using scrypt
pub fn hash_password(plain: &str, params: Params) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Scrypt
        .hash_password_customized(plain.as_bytes(), None, None, params, &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?
        .to_string();
    Ok(hash)
}

/// Verify a password against a stored hash.
///
/// A stored hash that does not parse is a generic auth failure, not a wrong
/// password.
pub fn verify_password(hash: &str, plain: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| {
        tracing::error!("Stored password hash is unreadable: {}", e);
        AppError::Auth(AuthErrorKind::Generic(
            "Unable to verify credentials".to_string(),
        ))
    })?;
    Ok(Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok())
}
