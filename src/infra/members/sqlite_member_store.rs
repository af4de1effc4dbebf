use crate::core::members::{Member, MemberError, MemberId, MemberStore, NewMember};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

pub struct SqliteMemberStore {
    pool: Pool<Sqlite>,
}

impl SqliteMemberStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), MemberError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS members (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                is_staff BOOLEAN NOT NULL DEFAULT 0,
                is_moderator BOOLEAN NOT NULL DEFAULT 0,
                is_trusted BOOLEAN NOT NULL DEFAULT 0,
                date_joined TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| MemberError::StorageError(e.to_string()))?;
        Ok(())
    }
}

fn row_to_member(row: &SqliteRow) -> Result<Member, MemberError> {
    let joined_str: String = row.get("date_joined");
    let date_joined = DateTime::parse_from_rfc3339(&joined_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            MemberError::StorageError(format!("Bad date_joined {:?}: {}", joined_str, e))
        })?;

    Ok(Member {
        id: MemberId(row.get("id")),
        username: row.get("username"),
        email: row.get("email"),
        is_staff: row.get("is_staff"),
        is_moderator: row.get("is_moderator"),
        is_trusted: row.get("is_trusted"),
        date_joined,
    })
}

#[async_trait]
impl MemberStore for SqliteMemberStore {
    async fn save_member(&self, member: NewMember) -> Result<Member, MemberError> {
        sqlx::query(
            r#"
            INSERT INTO members (username, email, is_staff, is_moderator, is_trusted, date_joined)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(username) DO UPDATE SET
                email = excluded.email,
                is_staff = excluded.is_staff,
                is_moderator = excluded.is_moderator,
                is_trusted = excluded.is_trusted
            "#,
        )
        .bind(&member.username)
        .bind(&member.email)
        .bind(member.is_staff)
        .bind(member.is_moderator)
        .bind(member.is_trusted)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| MemberError::StorageError(e.to_string()))?;

        // Get the stored row (existing members keep their id and join date)
        self.find_by_username(&member.username)
            .await?
            .ok_or_else(|| MemberError::UnknownMember(member.username.clone()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Member>, MemberError> {
        let row = sqlx::query("SELECT * FROM members WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| MemberError::StorageError(e.to_string()))?;

        row.as_ref().map(row_to_member).transpose()
    }

    async fn get_member(&self, id: MemberId) -> Result<Option<Member>, MemberError> {
        let row = sqlx::query("SELECT * FROM members WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| MemberError::StorageError(e.to_string()))?;

        row.as_ref().map(row_to_member).transpose()
    }
}
