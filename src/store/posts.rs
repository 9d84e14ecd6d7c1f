use serde::Serialize;
use sqlx::sqlite::{Sqlite, SqliteConnection, SqlitePool};
use sqlx::{FromRow, Transaction};

use crate::assets::validate_file_name;
use crate::error::{BlogError, BlogResult};

/// A listing entry on the index page.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PostCard {
    pub id: i64,
    pub theme: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    #[sqlx(rename = "author_url")]
    pub author_image: String,
    pub publish_date: String,
    #[sqlx(rename = "image_small_url")]
    pub background: String,
    /// Link to the post page, derived from `id` after the row is read.
    #[sqlx(skip)]
    pub url: String,
}

/// A full post as shown on its own page.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub theme: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    #[sqlx(rename = "author_url")]
    pub author_image: String,
    pub publish_date: String,
    #[sqlx(rename = "image_url")]
    pub hero_image: String,
    #[sqlx(rename = "image_small_url")]
    pub hero_image_small: String,
    pub content: String,
    pub featured: bool,
}

/// Fields of a post about to be inserted. The three image fields are bare
/// file names inside the asset directory; the store turns them into paths.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub theme: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub author_image: String,
    pub publish_date: String,
    pub hero_image: String,
    pub hero_image_small: String,
    pub content: String,
    pub featured: bool,
}

pub fn post_url(id: i64) -> String {
    format!("/post/{id}")
}

#[derive(Clone)]
pub struct PostStore {
    pool: SqlitePool,
    asset_prefix: String,
}

impl PostStore {
    /// `asset_prefix` is prepended to every image file name, e.g. `/static/sources`.
    pub fn new(pool: SqlitePool, asset_prefix: impl Into<String>) -> Self {
        Self {
            pool,
            asset_prefix: asset_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn list_featured(&self) -> BlogResult<Vec<PostCard>> {
        self.list(true).await
    }

    pub async fn list_recent(&self) -> BlogResult<Vec<PostCard>> {
        self.list(false).await
    }

    async fn list(&self, featured: bool) -> BlogResult<Vec<PostCard>> {
        let mut cards = sqlx::query_as::<_, PostCard>(
            "SELECT id, theme, title, subtitle, author, author_url, publish_date, image_small_url
             FROM post WHERE featured = ? ORDER BY id DESC",
        )
        .bind(featured)
        .fetch_all(&self.pool)
        .await?;

        for card in &mut cards {
            card.url = post_url(card.id);
        }

        tracing::debug!(featured, count = cards.len(), "listed posts");
        Ok(cards)
    }

    pub async fn get_by_id(&self, id: i64) -> BlogResult<Post> {
        sqlx::query_as::<_, Post>(
            "SELECT id, theme, title, subtitle, author, author_url, publish_date,
                    image_url, image_small_url, content, featured
             FROM post WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(BlogError::NotFound)
    }

    pub async fn create(&self, post: &NewPost) -> BlogResult<i64> {
        let mut conn = self.pool.acquire().await?;
        self.insert(&mut conn, post).await
    }

    /// Starts a transaction for callers that insert alongside other work.
    pub async fn begin(&self) -> BlogResult<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    /// Inserts `post` on an existing connection, typically a transaction.
    pub async fn insert(&self, conn: &mut SqliteConnection, post: &NewPost) -> BlogResult<i64> {
        let author_url = self.asset_path(&post.author_image)?;
        let image_url = self.asset_path(&post.hero_image)?;
        let image_small_url = self.asset_path(&post.hero_image_small)?;

        let id = sqlx::query(
            "INSERT INTO post
                (theme, title, subtitle, author, author_url, publish_date,
                 image_url, image_small_url, content, featured)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&post.theme)
        .bind(&post.title)
        .bind(&post.subtitle)
        .bind(&post.author)
        .bind(author_url)
        .bind(&post.publish_date)
        .bind(image_url)
        .bind(image_small_url)
        .bind(&post.content)
        .bind(post.featured)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

        tracing::debug!(id, title = %post.title, "inserted post");
        Ok(id)
    }

    fn asset_path(&self, file_name: &str) -> BlogResult<String> {
        Ok(format!("{}/{}", self.asset_prefix, validate_file_name(file_name)?))
    }
}
