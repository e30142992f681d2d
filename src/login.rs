//! Admin gate and browser session ids.
//!
//! The admin password unlocks editing of filled names and the export links
//! on this page only. It is not an authorization mechanism: the `cuzlers`
//! backend accepts the same PATCH requests from anyone, so real access
//! control has to live there.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::error::AppError;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "hatim_session";

/// Holds the Argon2 hash of the configured admin password.
#[derive(Debug, Clone)]
pub struct AdminGate {
    password_hash: String,
}

impl AdminGate {
    /// Hash the configured password once at startup.
    ///
    /// # Errors
    /// * Returns an error if the password hashing fails
    pub fn new(password: &str) -> Result<Self, AppError> {
        Ok(AdminGate {
            password_hash: hash_password(password)?,
        })
    }

    /// True only for the exact configured password.
    pub fn verify(&self, password: &str) -> bool {
        match PasswordHash::new(&self.password_hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                log::error!("stored admin password hash is invalid: {}", e);
                false
            }
        }
    }
}

fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::PasswordHash(e.to_string()))
}

/// Create a new random session id
pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Expiry time of a session started now.
///
/// Saturates at the latest representable time instead of overflowing.
pub fn session_expiry(hours: u32) -> DateTime<Utc> {
    let now = Utc::now();
    Duration::try_hours(i64::from(hours))
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

pub fn is_expired(expires_at: DateTime<Utc>) -> bool {
    expires_at <= Utc::now()
}

pub fn session_cookie(session_id: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_accepts_exact_password_only() {
        let gate = AdminGate::new("LONDRA").unwrap();
        assert!(gate.verify("LONDRA"));
        assert!(!gate.verify("londra"));
        assert!(!gate.verify("LONDRA "));
        assert!(!gate.verify(""));
    }

    #[test]
    fn gate_does_not_keep_plaintext() {
        let gate = AdminGate::new("LONDRA").unwrap();
        assert!(!gate.password_hash.contains("LONDRA"));
        assert!(gate.password_hash.starts_with("$argon2"));
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(new_session_id(), new_session_id());
    }

    #[test]
    fn expiry_is_in_the_future() {
        assert!(!is_expired(session_expiry(1)));
        assert!(is_expired(session_expiry(0)));
    }

    #[test]
    fn huge_lifetime_saturates_instead_of_panicking() {
        let expiry = session_expiry(u32::MAX);
        assert_eq!(expiry, DateTime::<Utc>::MAX_UTC);
        assert!(!is_expired(expiry));
    }

    #[test]
    fn cookie_is_http_only_for_whole_site() {
        let cookie = session_cookie("abc".to_string());
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
    }
}
