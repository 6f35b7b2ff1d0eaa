//! Core data models for leadbook.
//!
//! These types are shared across all leadbook crates and represent the
//! core domain entities: leads, the notes attached to them, and users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::defaults;

// =============================================================================
// LEAD TYPES
// =============================================================================

/// A lead (CRM contact record).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    /// User the lead is assigned to. Unassigned leads have no owner and are
    /// governed by the "other" permission flags.
    pub owner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    /// Human-readable label: name, then email, then a numbered placeholder.
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            if !name.is_empty() {
                return name.clone();
            }
        }
        if let Some(email) = &self.email {
            if !email.is_empty() {
                return email.clone();
            }
        }
        format!("Lead #{}", self.id)
    }
}

/// Lead summary row for the index page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadSummary {
    pub id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub owner_id: Option<i64>,
    pub note_count: i64,
}

// =============================================================================
// NOTE TYPES
// =============================================================================

/// Kind of touchpoint a note records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    #[default]
    General,
    Email,
    Call,
    Meeting,
}

impl NoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteKind::General => "general",
            NoteKind::Email => "email",
            NoteKind::Call => "call",
            NoteKind::Meeting => "meeting",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "general" => Some(NoteKind::General),
            "email" => Some(NoteKind::Email),
            "call" => Some(NoteKind::Call),
            "meeting" => Some(NoteKind::Meeting),
            _ => None,
        }
    }

    /// All kinds, in the order forms render them.
    pub fn all() -> [NoteKind; 4] {
        [
            NoteKind::General,
            NoteKind::Email,
            NoteKind::Call,
            NoteKind::Meeting,
        ]
    }
}

impl std::fmt::Display for NoteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A note attached to a lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadNote {
    pub id: i64,
    pub lead_id: i64,
    pub text: String,
    pub kind: NoteKind,
    /// When the recorded touchpoint happened (user-supplied, defaults to
    /// creation time).
    pub date_time: DateTime<Utc>,
    pub created_by: Option<i64>,
    /// Checkout timestamp while a user holds the note open for editing.
    pub checked_out: Option<DateTime<Utc>>,
    pub checked_out_by: Option<i64>,
}

impl LeadNote {
    /// Whether another user currently holds this note checked out.
    pub fn is_locked_for(&self, user_id: i64) -> bool {
        self.checked_out.is_some() && self.checked_out_by != Some(user_id)
    }
}

/// Request to create a note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNote {
    pub lead_id: i64,
    pub text: String,
    #[serde(default)]
    pub kind: NoteKind,
    /// Touchpoint time; `None` means "now".
    pub date_time: Option<DateTime<Utc>>,
    pub created_by: Option<i64>,
}

/// Fields updatable on an existing note. `lead_id` is immutable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteUpdate {
    pub text: Option<String>,
    pub kind: Option<NoteKind>,
    pub date_time: Option<DateTime<Utc>>,
}

// =============================================================================
// NOTE LIST QUERY
// =============================================================================

/// Column a note list may be ordered by. The repository maps these to SQL
/// through `as_sql`, so arbitrary client strings never reach an ORDER BY.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteOrderField {
    #[default]
    DateTime,
    Id,
    Kind,
}

impl NoteOrderField {
    pub fn as_sql(&self) -> &'static str {
        match self {
            NoteOrderField::DateTime => "date_time",
            NoteOrderField::Id => "id",
            NoteOrderField::Kind => "kind",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "date_time" => Some(NoteOrderField::DateTime),
            "id" => Some(NoteOrderField::Id),
            "kind" => Some(NoteOrderField::Kind),
            _ => None,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDir {
    Asc,
    Desc,
}

impl Default for SortDir {
    fn default() -> Self {
        SortDir::Desc
    }
}

impl SortDir {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ASC" => Some(SortDir::Asc),
            "DESC" => Some(SortDir::Desc),
            _ => None,
        }
    }
}

/// Query parameters for a note list page.
#[derive(Debug, Clone)]
pub struct NoteListQuery {
    pub lead_id: i64,
    /// Case-insensitive substring filter on the note text; empty means no
    /// filter.
    pub search: String,
    pub order_by: NoteOrderField,
    pub order_dir: SortDir,
    pub limit: i64,
    pub offset: i64,
}

impl NoteListQuery {
    /// Default query for a lead: newest first, first page.
    pub fn for_lead(lead_id: i64) -> Self {
        Self {
            lead_id,
            search: String::new(),
            order_by: NoteOrderField::default(),
            order_dir: SortDir::default(),
            limit: defaults::NOTE_PAGE_LIMIT,
            offset: defaults::PAGE_OFFSET,
        }
    }
}

/// One page of notes plus the filtered total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteListPage {
    pub notes: Vec<LeadNote>,
    /// Count over the whole filtered set, not the page.
    pub total: i64,
}

// =============================================================================
// USER TYPES
// =============================================================================

/// Per-entity permission flags for lead notes, split into own/other variants
/// keyed on lead ownership.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPermissions {
    pub note_view_own: bool,
    pub note_view_other: bool,
    pub note_create: bool,
    pub note_edit_own: bool,
    pub note_edit_other: bool,
    pub note_delete_own: bool,
    pub note_delete_other: bool,
}

impl UserPermissions {
    /// Every flag granted.
    pub fn admin() -> Self {
        Self {
            note_view_own: true,
            note_view_other: true,
            note_create: true,
            note_edit_own: true,
            note_edit_other: true,
            note_delete_own: true,
            note_delete_other: true,
        }
    }

    /// No flags granted.
    pub fn none() -> Self {
        Self::default()
    }
}

/// An application user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub permissions: UserPermissions,
}
