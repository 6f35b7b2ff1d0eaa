//! Lead repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};

use leadbook_core::{Error, Lead, LeadRepository, LeadSummary, Result};

/// PostgreSQL implementation of LeadRepository.
pub struct PgLeadRepository {
    pool: Pool<Postgres>,
}

impl PgLeadRepository {
    /// Create a new PgLeadRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_row_to_lead(row: sqlx::postgres::PgRow) -> Lead {
    Lead {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        owner_id: row.get("owner_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl LeadRepository for PgLeadRepository {
    async fn get(&self, id: i64) -> Result<Option<Lead>> {
        let row = sqlx::query(
            "SELECT id, name, email, owner_id, created_at, updated_at FROM lead WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(map_row_to_lead))
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<LeadSummary>> {
        let rows = sqlx::query(
            "SELECT l.id, l.name, l.email, l.owner_id, COUNT(n.id) AS note_count
             FROM lead l
             LEFT JOIN lead_note n ON n.lead_id = l.id
             GROUP BY l.id
             ORDER BY l.id DESC
             LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| LeadSummary {
                id: row.get("id"),
                name: row.get("name"),
                email: row.get("email"),
                owner_id: row.get("owner_id"),
                note_count: row.get("note_count"),
            })
            .collect())
    }
}
