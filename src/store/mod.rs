//! Database access. Each store is a cheap handle around the shared pool and is
//! injected through `AppState`.

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::error::BlogResult;

pub mod posts;
pub mod sessions;
pub mod users;

pub use posts::{NewPost, Post, PostCard, PostStore};
pub use sessions::SessionStore;
pub use users::{User, UserStore};

pub async fn connect(db_url: &str, max_connections: u32) -> BlogResult<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(db_url)
        .await?;
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> BlogResult<()> {
    sqlx::migrate!().run(pool).await?;
    Ok(())
}
