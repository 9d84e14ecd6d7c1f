use std::sync::LazyLock;

use serde::Serialize;
use sqlx::FromRow;
use sqlx::sqlite::SqlitePool;

use crate::auth::{hash_password, verify_password};
use crate::error::{BlogError, BlogResult};

/// Verified against when the email is unknown, so both failure paths cost one
/// argon2 run.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("escape-blog dummy password").ok());

#[derive(Clone, Debug, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Resolves a login attempt. An unknown email and a wrong password are
    /// reported identically and take the same work. The email is matched
    /// exactly as given.
    pub async fn find_by_credentials(&self, email: &str, password: &str) -> BlogResult<User> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash FROM user WHERE email = ? LIMIT 1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let Some(user) = user else {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                let _ = verify_password(password, dummy);
            }
            tracing::debug!("login attempt for unknown email");
            return Err(BlogError::InvalidCredentials);
        };

        if verify_password(password, &user.password_hash)? {
            Ok(user)
        } else {
            tracing::debug!(user_id = user.id, "login attempt with wrong password");
            Err(BlogError::InvalidCredentials)
        }
    }

    pub async fn find_by_id(&self, id: i64) -> BlogResult<User> {
        sqlx::query_as::<_, User>("SELECT id, email, password_hash FROM user WHERE id = ? LIMIT 1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(BlogError::NotFound)
    }

    pub async fn find_by_email(&self, email: &str) -> BlogResult<Option<User>> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash FROM user WHERE email = ? LIMIT 1",
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?)
    }

    pub async fn create(&self, email: &str, password: &str) -> BlogResult<User> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(BlogError::validation("email address is malformed"));
        }
        if password.is_empty() {
            return Err(BlogError::validation("password cannot be empty"));
        }

        let password_hash = hash_password(password)?;

        let id = match sqlx::query("INSERT INTO user (email, password_hash) VALUES (?, ?)")
            .bind(email)
            .bind(&password_hash)
            .execute(&self.pool)
            .await
        {
            Ok(done) => done.last_insert_rowid(),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(BlogError::validation("user already exists"));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(user_id = id, "created user");
        Ok(User {
            id,
            email: email.to_string(),
            password_hash,
        })
    }
}
