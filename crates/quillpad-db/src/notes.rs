//! Note repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use quillpad_core::{
    CreateNoteRequest, Error, Note, NoteRepository, NoteSummary, Result,
};

/// PostgreSQL implementation of NoteRepository.
///
/// Ownership checks are compiled into the SQL predicates: every owned
/// accessor filters on `id AND owner_id` in one statement, so a missing
/// note and a foreign note produce the same empty result.
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Parse a note row into a Note struct.
    fn parse_note_row(row: sqlx::postgres::PgRow) -> Note {
        Note {
            id: row.get("id"),
            owner_id: row.get("owner_id"),
            name: row.get("name"),
            image_url: row.get("image_url"),
            editor_state: row.get("editor_state"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn insert(&self, req: CreateNoteRequest) -> Result<i64> {
        let now = Utc::now();

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO note (owner_id, name, image_url, created_at, updated_at)
             VALUES ($1, $2, NULL, $3, $3)
             RETURNING id",
        )
        .bind(req.owner_id)
        .bind(&req.name)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(id)
    }

    async fn fetch_owned(&self, id: i64, owner_id: Uuid) -> Result<Option<Note>> {
        let row = sqlx::query(
            "SELECT id, owner_id, name, image_url, editor_state, created_at, updated_at
             FROM note
             WHERE id = $1 AND owner_id = $2",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(Self::parse_note_row))
    }

    async fn fetch(&self, id: i64) -> Result<Option<Note>> {
        let row = sqlx::query(
            "SELECT id, owner_id, name, image_url, editor_state, created_at, updated_at
             FROM note
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(Self::parse_note_row))
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<NoteSummary>> {
        let rows = sqlx::query(
            "SELECT id, name, image_url, created_at
             FROM note
             WHERE owner_id = $1
             ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| NoteSummary {
                id: row.get("id"),
                name: row.get("name"),
                image_url: row.get("image_url"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    async fn update_editor_state(
        &self,
        id: i64,
        owner_id: Uuid,
        editor_state: &JsonValue,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE note
             SET editor_state = $1, updated_at = $2
             WHERE id = $3 AND owner_id = $4",
        )
        .bind(editor_state)
        .bind(Utc::now())
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_image_url(&self, id: i64, url: &str) -> Result<bool> {
        // The IS NULL guard makes the transition at-most-once: a retry after
        // a lost ack, or a concurrent duplicate job, affects zero rows.
        let result = sqlx::query(
            "UPDATE note
             SET image_url = $1, updated_at = $2
             WHERE id = $3 AND image_url IS NULL",
        )
        .bind(url)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_owned(&self, id: i64, owner_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM note WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }
}
