// SQLite-backed post store.
//
// Tables:
// - posts: Board posts with their moderation flags
//
// Requires the `members` table (see SqliteMemberStore::migrate) for the
// author foreign key.

use crate::core::moderation::{
    ModerationError, ModerationFlags, NewPost, Post, PostEdit, PostFilter, PostId, PostStore,
};
use crate::core::members::MemberId;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

pub struct SqlitePostStore {
    pool: Pool<Sqlite>,
}

impl SqlitePostStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Run database migrations to create required tables.
    pub async fn migrate(&self) -> Result<(), ModerationError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                author_id INTEGER REFERENCES members(id) ON DELETE SET NULL,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                is_flagged BOOLEAN NOT NULL DEFAULT 0,
                is_moderated BOOLEAN NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_posts_flagged_created
                ON posts(is_flagged, created_at);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        Ok(())
    }
}

/// SQL predicate for each listing.
fn filter_clause(filter: PostFilter) -> &'static str {
    match filter {
        PostFilter::Visible => "is_flagged = 0",
        PostFilter::Pending => "is_flagged = 1",
    }
}

/// Fixed-width timestamps so text ordering matches time ordering.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn row_to_post(row: &SqliteRow) -> Result<Post, ModerationError> {
    let created_at_str: String = row.get("created_at");
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            ModerationError::StorageError(format!(
                "Bad created_at {:?}: {}",
                created_at_str, e
            ))
        })?;

    Ok(Post {
        id: PostId(row.get("id")),
        author: row.get::<Option<i64>, _>("author_id").map(MemberId),
        title: row.get("title"),
        content: row.get("content"),
        is_flagged: row.get("is_flagged"),
        is_moderated: row.get("is_moderated"),
        created_at,
    })
}

#[async_trait]
impl PostStore for SqlitePostStore {
    async fn insert_post(&self, post: NewPost) -> Result<Post, ModerationError> {
        let result = sqlx::query(
            r#"
            INSERT INTO posts (author_id, title, content, is_flagged, is_moderated, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(post.author.map(|id| id.0))
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.flags.is_flagged)
        .bind(post.flags.is_moderated)
        .bind(format_timestamp(post.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        Ok(Post {
            id: PostId(result.last_insert_rowid()),
            author: post.author,
            title: post.title,
            content: post.content,
            is_flagged: post.flags.is_flagged,
            is_moderated: post.flags.is_moderated,
            created_at: post.created_at,
        })
    }

    async fn get_post(&self, id: PostId) -> Result<Option<Post>, ModerationError> {
        let row = sqlx::query("SELECT * FROM posts WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        row.as_ref().map(row_to_post).transpose()
    }

    async fn set_flags(
        &self,
        id: PostId,
        flags: ModerationFlags,
    ) -> Result<Option<Post>, ModerationError> {
        // One UPDATE for both columns: either both change or neither does
        let result = sqlx::query("UPDATE posts SET is_flagged = ?, is_moderated = ? WHERE id = ?")
            .bind(flags.is_flagged)
            .bind(flags.is_moderated)
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_post(id).await
    }

    async fn update_post(
        &self,
        id: PostId,
        edit: PostEdit,
    ) -> Result<Option<Post>, ModerationError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = ?, content = ?, is_flagged = ?, is_moderated = ?
            WHERE id = ?
            "#,
        )
        .bind(&edit.title)
        .bind(&edit.content)
        .bind(edit.flags.is_flagged)
        .bind(edit.flags.is_moderated)
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_post(id).await
    }

    async fn delete_post(&self, id: PostId) -> Result<bool, ModerationError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, ModerationError> {
        let sql = format!(
            "SELECT * FROM posts WHERE {} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            filter_clause(filter)
        );
        let rows = sqlx::query(&sql)
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        rows.iter().map(row_to_post).collect()
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<u64, ModerationError> {
        let sql = format!(
            "SELECT COUNT(*) AS total FROM posts WHERE {}",
            filter_clause(filter)
        );
        let row = sqlx::query(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        Ok(row.get::<i64, _>("total") as u64)
    }
}
