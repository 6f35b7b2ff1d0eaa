//! User repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};

use leadbook_core::{Error, Result, User, UserPermissions, UserRepository};

/// PostgreSQL implementation of UserRepository.
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, username, note_view_own, note_view_other, note_create, \
     note_edit_own, note_edit_other, note_delete_own, note_delete_other";

fn map_row_to_user(row: sqlx::postgres::PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        permissions: UserPermissions {
            note_view_own: row.get("note_view_own"),
            note_view_other: row.get("note_view_other"),
            note_create: row.get("note_create"),
            note_edit_own: row.get("note_edit_own"),
            note_edit_other: row.get("note_edit_other"),
            note_delete_own: row.get("note_delete_own"),
            note_delete_other: row.get("note_delete_other"),
        },
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM app_user WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(map_row_to_user))
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM app_user WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(map_row_to_user))
    }
}
