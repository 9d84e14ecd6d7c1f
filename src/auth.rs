//! Password hashing and the cookie session built on top of the user and
//! session stores.

use std::str::FromStr;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::error::{BlogError, BlogResult};
use crate::store::{SessionStore, User, UserStore};

pub const AUTH_COOKIE: &str = "authCookieName";

pub const SESSION_LIFETIME: Duration = Duration::days(1);

/// Hashes `password` into a PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> BlogResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Checks `password` against a stored PHC string. A mismatch is `Ok(false)`;
/// only a corrupt stored hash is an error.
pub fn verify_password(password: &str, stored: &str) -> BlogResult<bool> {
    let parsed = PasswordHash::new(stored)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Reads the session token from the jar, ignoring empty or malformed values.
pub fn session_token(cookie_jar: &CookieJar) -> Option<Uuid> {
    cookie_jar
        .get(AUTH_COOKIE)
        .map(|c| c.value_trimmed())
        .filter(|v| !v.is_empty())
        .and_then(|v| Uuid::from_str(v).ok())
}

#[derive(Clone)]
pub struct Auth {
    users: UserStore,
    sessions: SessionStore,
}

impl Auth {
    pub fn new(users: UserStore, sessions: SessionStore) -> Self {
        Self { users, sessions }
    }

    /// Checks the credentials and opens a session, returning the cookie that
    /// carries it.
    pub async fn login(&self, email: &str, password: &str) -> BlogResult<Cookie<'static>> {
        let user = self.users.find_by_credentials(email, password).await?;
        let expires = OffsetDateTime::now_utc() + SESSION_LIFETIME;
        let token = self.sessions.create(user.id, expires).await?;

        tracing::info!(user_id = user.id, "user logged in");
        Ok(auth_cookie(token.to_string(), expires))
    }

    pub async fn validate(&self, cookie_jar: &CookieJar) -> BlogResult<User> {
        let token = session_token(cookie_jar).ok_or(BlogError::Unauthenticated)?;
        let user_id = self
            .sessions
            .resolve(token)
            .await?
            .ok_or(BlogError::Unauthenticated)?;

        match self.users.find_by_id(user_id).await {
            Ok(user) => Ok(user),
            Err(BlogError::NotFound) => {
                tracing::warn!(user_id, "session points at a missing user");
                self.sessions.revoke(token).await?;
                Err(BlogError::Unauthenticated)
            }
            Err(e) => Err(e),
        }
    }

    /// Drops the server-side session, if any, and returns an expired cookie
    /// that overwrites the client's copy.
    pub async fn logout(&self, cookie_jar: &CookieJar) -> BlogResult<Cookie<'static>> {
        if let Some(token) = session_token(cookie_jar) {
            self.sessions.revoke(token).await?;
        }
        Ok(expired_cookie())
    }

    pub async fn purge_expired(&self) -> BlogResult<u64> {
        self.sessions.purge_expired().await
    }
}

fn auth_cookie(value: String, expires: OffsetDateTime) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, value))
        .path("/")
        .expires(expires)
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub fn expired_cookie() -> Cookie<'static> {
    auth_cookie(String::new(), OffsetDateTime::now_utc() - SESSION_LIFETIME)
}
