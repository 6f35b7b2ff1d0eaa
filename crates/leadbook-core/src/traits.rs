//! Core traits for leadbook abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// LEAD REPOSITORY
// =============================================================================

/// Repository for lead lookups.
#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// Fetch a lead by ID.
    async fn get(&self, id: i64) -> Result<Option<Lead>>;

    /// List leads for the index page, with note counts, newest first.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<LeadSummary>>;
}

// =============================================================================
// NOTE REPOSITORY
// =============================================================================

/// Repository for lead note CRUD operations.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Fetch a note by ID.
    async fn get(&self, id: i64) -> Result<Option<LeadNote>>;

    /// List one page of a lead's notes with the filtered total.
    async fn list(&self, query: &NoteListQuery) -> Result<NoteListPage>;

    /// Insert a new note.
    async fn create(&self, req: &NewNote) -> Result<LeadNote>;

    /// Apply an update to an existing note. `Error::NoteNotFound` when the
    /// id does not exist.
    async fn update(&self, id: i64, update: &NoteUpdate) -> Result<LeadNote>;

    /// Delete a note. `Error::NoteNotFound` when the id does not exist.
    async fn delete(&self, id: i64) -> Result<()>;

    /// Count all notes for a lead (unfiltered).
    async fn count_for_lead(&self, lead_id: i64) -> Result<i64>;

    /// Mark a note checked out by a user for editing.
    async fn check_out(&self, id: i64, user_id: i64) -> Result<()>;

    /// Release a note's checkout.
    async fn check_in(&self, id: i64) -> Result<()>;
}

// =============================================================================
// USER REPOSITORY
// =============================================================================

/// Repository for user lookups.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by ID.
    async fn get(&self, id: i64) -> Result<Option<User>>;

    /// Fetch a user by username.
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;
}
