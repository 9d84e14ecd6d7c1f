use sqlx::sqlite::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::BlogResult;

/// Server side of the login cookie: opaque tokens mapped to user ids.
#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: i64, expires_at: OffsetDateTime) -> BlogResult<Uuid> {
        let token = Uuid::new_v4();
        sqlx::query("INSERT INTO user_token (token, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(token)
            .bind(user_id)
            .bind(expires_at.unix_timestamp())
            .execute(&self.pool)
            .await?;
        Ok(token)
    }

    /// Returns the user id behind a live token. Expired tokens are removed.
    pub async fn resolve(&self, token: Uuid) -> BlogResult<Option<i64>> {
        let row: Option<(i64, i64)> =
            sqlx::query_as("SELECT user_id, expires_at FROM user_token WHERE token = ? LIMIT 1")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;

        let Some((user_id, expires_at)) = row else {
            return Ok(None);
        };

        if expires_at <= OffsetDateTime::now_utc().unix_timestamp() {
            tracing::debug!(user_id, "session token expired");
            self.revoke(token).await?;
            return Ok(None);
        }

        Ok(Some(user_id))
    }

    pub async fn revoke(&self, token: Uuid) -> BlogResult<()> {
        sqlx::query("DELETE FROM user_token WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn purge_expired(&self) -> BlogResult<u64> {
        let done = sqlx::query("DELETE FROM user_token WHERE expires_at <= ?")
            .bind(OffsetDateTime::now_utc().unix_timestamp())
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected())
    }
}
