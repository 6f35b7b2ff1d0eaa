//! In-memory repositories and fixture builders for handler tests.
//!
//! One [`InMemoryStore`] implements all three repository traits over shared
//! maps, so router-level tests exercise the real handlers without Postgres.
//! Kept always-compiled so the integration tests in `tests/` can use it.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use leadbook_core::{
    Error, Lead, LeadNote, LeadRepository, LeadSummary, NewNote, NoteKind, NoteListPage,
    NoteListQuery, NoteOrderField, NoteRepository, NoteUpdate, Result, SecurityService, SortDir,
    User, UserPermissions, UserRepository,
};

use crate::{AppState, SessionStore};

#[derive(Debug, Default)]
struct StoreInner {
    leads: BTreeMap<i64, Lead>,
    notes: BTreeMap<i64, LeadNote>,
    users: BTreeMap<i64, User>,
    next_note_id: i64,
}

/// Shared in-memory backing store implementing every repository trait.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<StoreInner>>,
}

#[async_trait]
impl LeadRepository for InMemoryStore {
    async fn get(&self, id: i64) -> Result<Option<Lead>> {
        Ok(self.inner.read().await.leads.get(&id).cloned())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<LeadSummary>> {
        let inner = self.inner.read().await;
        let mut summaries: Vec<LeadSummary> = inner
            .leads
            .values()
            .map(|l| LeadSummary {
                id: l.id,
                name: l.name.clone(),
                email: l.email.clone(),
                owner_id: l.owner_id,
                note_count: inner.notes.values().filter(|n| n.lead_id == l.id).count() as i64,
            })
            .collect();
        // Newest first, same as the SQL implementation.
        summaries.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(summaries
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }
}

#[async_trait]
impl NoteRepository for InMemoryStore {
    async fn get(&self, id: i64) -> Result<Option<LeadNote>> {
        Ok(self.inner.read().await.notes.get(&id).cloned())
    }

    async fn list(&self, query: &NoteListQuery) -> Result<NoteListPage> {
        let inner = self.inner.read().await;
        let needle = query.search.to_lowercase();
        let mut notes: Vec<LeadNote> = inner
            .notes
            .values()
            .filter(|n| n.lead_id == query.lead_id)
            .filter(|n| needle.is_empty() || n.text.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        let total = notes.len() as i64;

        notes.sort_by(|a, b| {
            let ord = match query.order_by {
                NoteOrderField::DateTime => a.date_time.cmp(&b.date_time),
                NoteOrderField::Id => a.id.cmp(&b.id),
                NoteOrderField::Kind => a.kind.as_str().cmp(b.kind.as_str()),
            };
            let ord = match query.order_dir {
                SortDir::Asc => ord,
                SortDir::Desc => ord.reverse(),
            };
            // Stable id DESC tiebreaker, matching the SQL ORDER BY.
            ord.then(b.id.cmp(&a.id))
        });

        let notes = notes
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .collect();
        Ok(NoteListPage { notes, total })
    }

    async fn create(&self, req: &NewNote) -> Result<LeadNote> {
        let mut inner = self.inner.write().await;
        inner.next_note_id += 1;
        let note = LeadNote {
            id: inner.next_note_id,
            lead_id: req.lead_id,
            text: req.text.clone(),
            kind: req.kind,
            date_time: req.date_time.unwrap_or_else(Utc::now),
            created_by: req.created_by,
            checked_out: None,
            checked_out_by: None,
        };
        inner.notes.insert(note.id, note.clone());
        Ok(note)
    }

    async fn update(&self, id: i64, update: &NoteUpdate) -> Result<LeadNote> {
        let mut inner = self.inner.write().await;
        let note = inner.notes.get_mut(&id).ok_or(Error::NoteNotFound(id))?;
        if let Some(text) = &update.text {
            note.text = text.clone();
        }
        if let Some(kind) = update.kind {
            note.kind = kind;
        }
        if let Some(date_time) = update.date_time {
            note.date_time = date_time;
        }
        Ok(note.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner
            .notes
            .remove(&id)
            .map(|_| ())
            .ok_or(Error::NoteNotFound(id))
    }

    async fn count_for_lead(&self, lead_id: i64) -> Result<i64> {
        let inner = self.inner.read().await;
        Ok(inner.notes.values().filter(|n| n.lead_id == lead_id).count() as i64)
    }

    async fn check_out(&self, id: i64, user_id: i64) -> Result<()> {
        let mut inner = self.inner.write().await;
        let note = inner.notes.get_mut(&id).ok_or(Error::NoteNotFound(id))?;
        note.checked_out = Some(Utc::now());
        note.checked_out_by = Some(user_id);
        Ok(())
    }

    async fn check_in(&self, id: i64) -> Result<()> {
        let mut inner = self.inner.write().await;
        let note = inner.notes.get_mut(&id).ok_or(Error::NoteNotFound(id))?;
        note.checked_out = None;
        note.checked_out_by = None;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn get(&self, id: i64) -> Result<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .inner
            .read()
            .await
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

/// App state plus direct store access for seeding.
pub struct TestApp {
    pub store: InMemoryStore,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let store = InMemoryStore::default();
        let state = AppState {
            leads: Arc::new(store.clone()),
            notes: Arc::new(store.clone()),
            users: Arc::new(store.clone()),
            sessions: SessionStore::new(),
            security: SecurityService::new(),
            rate_limiter: None,
        };
        Self { store, state }
    }

    /// Router over this app's state.
    pub fn router(&self) -> axum::Router {
        crate::build_router(self.state.clone())
    }

    pub async fn add_user(&self, user: User) -> User {
        let mut inner = self.store.inner.write().await;
        inner.users.insert(user.id, user.clone());
        user
    }

    pub async fn add_lead(&self, lead: Lead) -> Lead {
        let mut inner = self.store.inner.write().await;
        inner.leads.insert(lead.id, lead.clone());
        lead
    }

    pub async fn add_note(&self, note: LeadNote) -> LeadNote {
        let mut inner = self.store.inner.write().await;
        inner.next_note_id = inner.next_note_id.max(note.id);
        inner.notes.insert(note.id, note.clone());
        note
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// User fixture with explicit permissions.
pub fn user_with(id: i64, username: &str, permissions: UserPermissions) -> User {
    User {
        id,
        username: username.to_string(),
        permissions,
    }
}

/// Lead fixture.
pub fn lead(id: i64, owner_id: Option<i64>) -> Lead {
    let now = Utc::now();
    Lead {
        id,
        name: Some(format!("Lead {}", id)),
        email: Some(format!("lead{}@example.test", id)),
        owner_id,
        created_at: now,
        updated_at: now,
    }
}

/// Note fixture attached to a lead.
pub fn note(id: i64, lead_id: i64, text: &str) -> LeadNote {
    LeadNote {
        id,
        lead_id,
        text: text.to_string(),
        kind: NoteKind::General,
        date_time: Utc::now(),
        created_by: Some(1),
        checked_out: None,
        checked_out_by: None,
    }
}
