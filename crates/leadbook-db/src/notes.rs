//! Lead note repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};

use leadbook_core::{
    Error, LeadNote, NewNote, NoteKind, NoteListPage, NoteListQuery, NoteRepository, NoteUpdate,
    Result,
};

use crate::escape_like;

/// PostgreSQL implementation of NoteRepository.
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Build the WHERE clause for a note list query. The ILIKE placeholder is
/// only emitted when a search pattern exists; `$1` is always the lead id.
fn build_where_clause(has_search: bool) -> &'static str {
    if has_search {
        "WHERE lead_id = $1 AND text ILIKE $2 ESCAPE '\\'"
    } else {
        "WHERE lead_id = $1"
    }
}

/// Build the order clause from the whitelisted field and direction enums.
/// A trailing id tiebreaker keeps pagination stable when timestamps collide.
fn build_order_clause(query: &NoteListQuery) -> String {
    format!(
        "ORDER BY {} {}, id DESC",
        query.order_by.as_sql(),
        query.order_dir.as_sql()
    )
}

/// Map a database row to a LeadNote.
fn map_row_to_note(row: sqlx::postgres::PgRow) -> LeadNote {
    let kind_str: String = row.get("kind");
    LeadNote {
        id: row.get("id"),
        lead_id: row.get("lead_id"),
        text: row.get("text"),
        kind: NoteKind::parse(&kind_str).unwrap_or_default(),
        date_time: row.get("date_time"),
        created_by: row.get("created_by"),
        checked_out: row.get("checked_out"),
        checked_out_by: row.get("checked_out_by"),
    }
}

const NOTE_COLUMNS: &str =
    "id, lead_id, text, kind, date_time, created_by, checked_out, checked_out_by";

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn get(&self, id: i64) -> Result<Option<LeadNote>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM lead_note WHERE id = $1",
            NOTE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(map_row_to_note))
    }

    async fn list(&self, query: &NoteListQuery) -> Result<NoteListPage> {
        let pattern = if query.search.is_empty() {
            None
        } else {
            Some(format!("%{}%", escape_like(&query.search)))
        };
        let where_clause = build_where_clause(pattern.is_some());

        let count_sql = format!("SELECT COUNT(*) AS total FROM lead_note {}", where_clause);
        let mut count_q = sqlx::query(&count_sql).bind(query.lead_id);
        if let Some(p) = &pattern {
            count_q = count_q.bind(p);
        }
        let total: i64 = count_q
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?
            .get("total");

        // Limit and offset come after the optional search placeholder.
        let next_param = if pattern.is_some() { 3 } else { 2 };
        let page_sql = format!(
            "SELECT {} FROM lead_note {} {} LIMIT ${} OFFSET ${}",
            NOTE_COLUMNS,
            where_clause,
            build_order_clause(query),
            next_param,
            next_param + 1
        );
        let mut page_q = sqlx::query(&page_sql).bind(query.lead_id);
        if let Some(p) = &pattern {
            page_q = page_q.bind(p);
        }
        let rows = page_q
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(NoteListPage {
            notes: rows.into_iter().map(map_row_to_note).collect(),
            total,
        })
    }

    async fn create(&self, req: &NewNote) -> Result<LeadNote> {
        let date_time = req.date_time.unwrap_or_else(Utc::now);
        let row = sqlx::query(&format!(
            "INSERT INTO lead_note (lead_id, text, kind, date_time, created_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            NOTE_COLUMNS
        ))
        .bind(req.lead_id)
        .bind(&req.text)
        .bind(req.kind.as_str())
        .bind(date_time)
        .bind(req.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(map_row_to_note(row))
    }

    async fn update(&self, id: i64, update: &NoteUpdate) -> Result<LeadNote> {
        let existing = self.get(id).await?.ok_or(Error::NoteNotFound(id))?;

        let text = update.text.as_deref().unwrap_or(&existing.text);
        let kind = update.kind.unwrap_or(existing.kind);
        let date_time: DateTime<Utc> = update.date_time.unwrap_or(existing.date_time);

        let row = sqlx::query(&format!(
            "UPDATE lead_note SET text = $1, kind = $2, date_time = $3
             WHERE id = $4
             RETURNING {}",
            NOTE_COLUMNS
        ))
        .bind(text)
        .bind(kind.as_str())
        .bind(date_time)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(map_row_to_note(row))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM lead_note WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(id));
        }
        Ok(())
    }

    async fn count_for_lead(&self, lead_id: i64) -> Result<i64> {
        let total: i64 = sqlx::query("SELECT COUNT(*) AS total FROM lead_note WHERE lead_id = $1")
            .bind(lead_id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?
            .get("total");
        Ok(total)
    }

    async fn check_out(&self, id: i64, user_id: i64) -> Result<()> {
        let result = sqlx::query(
            "UPDATE lead_note SET checked_out = NOW(), checked_out_by = $1 WHERE id = $2",
        )
        .bind(user_id)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(id));
        }
        Ok(())
    }

    async fn check_in(&self, id: i64) -> Result<()> {
        let result = sqlx::query(
            "UPDATE lead_note SET checked_out = NULL, checked_out_by = NULL WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(id));
        }
        Ok(())
    }
}
