//! Per-user session state.
//!
//! List preferences (page size, search filter, sort) and one-shot flash
//! messages persist across requests so a user returns to the view they
//! left. State is typed end to end; handlers go through the accessors
//! below instead of poking at loose keys.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use leadbook_core::{defaults, NoteOrderField, SortDir};

/// Note list view preferences for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteListState {
    pub limit: i64,
    pub search: String,
    pub order_by: NoteOrderField,
    pub order_dir: SortDir,
}

impl Default for NoteListState {
    fn default() -> Self {
        Self {
            limit: defaults::NOTE_PAGE_LIMIT,
            search: String::new(),
            order_by: NoteOrderField::default(),
            order_dir: SortDir::default(),
        }
    }
}

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Error,
    Notice,
}

/// One-shot message rendered and discarded by the next full page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub text: String,
}

impl FlashMessage {
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            text: text.into(),
        }
    }

    pub fn notice(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Notice,
            text: text.into(),
        }
    }
}

/// Everything the server remembers for one user between requests.
#[derive(Debug, Clone, Default)]
pub struct UserSession {
    pub note_list: NoteListState,
    pub lead_page: i64,
    pub flashes: Vec<FlashMessage>,
}

/// Shared in-memory session store keyed by user id.
///
/// A user with no entry behaves exactly like `UserSession::default()`.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<i64, UserSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current note list preferences, defaults when absent.
    pub async fn note_list(&self, user_id: i64) -> NoteListState {
        self.inner
            .read()
            .await
            .get(&user_id)
            .map(|s| s.note_list.clone())
            .unwrap_or_default()
    }

    pub async fn set_note_limit(&self, user_id: i64, limit: i64) {
        let mut inner = self.inner.write().await;
        inner.entry(user_id).or_default().note_list.limit = limit;
    }

    pub async fn set_note_search(&self, user_id: i64, search: String) {
        let mut inner = self.inner.write().await;
        inner.entry(user_id).or_default().note_list.search = search;
    }

    pub async fn set_note_order(&self, user_id: i64, order_by: NoteOrderField, order_dir: SortDir) {
        let mut inner = self.inner.write().await;
        let list = &mut inner.entry(user_id).or_default().note_list;
        list.order_by = order_by;
        list.order_dir = order_dir;
    }

    /// Last lead index page the user viewed (0 when never set).
    pub async fn lead_page(&self, user_id: i64) -> i64 {
        self.inner
            .read()
            .await
            .get(&user_id)
            .map(|s| s.lead_page)
            .unwrap_or_default()
    }

    pub async fn set_lead_page(&self, user_id: i64, page: i64) {
        let mut inner = self.inner.write().await;
        inner.entry(user_id).or_default().lead_page = page;
    }

    /// Queue a flash for the user's next full page load.
    pub async fn push_flash(&self, user_id: i64, flash: FlashMessage) {
        let mut inner = self.inner.write().await;
        inner.entry(user_id).or_default().flashes.push(flash);
    }

    /// Drain all pending flashes for rendering.
    pub async fn take_flashes(&self, user_id: i64) -> Vec<FlashMessage> {
        let mut inner = self.inner.write().await;
        match inner.get_mut(&user_id) {
            Some(session) => std::mem::take(&mut session.flashes),
            None => Vec::new(),
        }
    }
}
