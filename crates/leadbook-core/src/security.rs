//! Permission checks for lead note operations.
//!
//! Permissions come in own/other pairs: which flag applies depends on
//! whether the viewer owns the lead in question. Unowned leads fall under
//! the "other" flag.

use crate::models::UserPermissions;

/// Action a user attempts against a lead's notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadAction {
    View,
    Create,
    Edit,
    Delete,
}

impl LeadAction {
    /// The (own, other) flag pair governing this action. `Create` has no
    /// ownership split; both selectors read the same flag.
    fn own_other(&self, p: &UserPermissions) -> (bool, bool) {
        match self {
            LeadAction::View => (p.note_view_own, p.note_view_other),
            LeadAction::Create => (p.note_create, p.note_create),
            LeadAction::Edit => (p.note_edit_own, p.note_edit_other),
            LeadAction::Delete => (p.note_delete_own, p.note_delete_other),
        }
    }
}

impl std::fmt::Display for LeadAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LeadAction::View => "view",
            LeadAction::Create => "create",
            LeadAction::Edit => "edit",
            LeadAction::Delete => "delete",
        };
        write!(f, "{}", s)
    }
}

/// Stateless permission checker.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityService;

impl SecurityService {
    pub fn new() -> Self {
        Self
    }

    /// Decide whether a viewer may perform `action` on notes of a lead owned
    /// by `owner_id`. The own flag applies only when the viewer is the
    /// owner; a different owner or no owner at all reads the other flag.
    pub fn has_entity_access(
        &self,
        permissions: &UserPermissions,
        viewer_id: i64,
        action: LeadAction,
        owner_id: Option<i64>,
    ) -> bool {
        let (own, other) = action.own_other(permissions);
        if owner_id == Some(viewer_id) {
            own
        } else {
            other
        }
    }
}

/// Per-request snapshot of the note permissions a rendered page needs.
/// Captured once against a specific lead so fragments do not re-evaluate
/// flags per row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotePermissions {
    pub can_view: bool,
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl NotePermissions {
    /// Evaluate all four actions for one viewer against one lead owner.
    pub fn for_lead(
        security: &SecurityService,
        permissions: &UserPermissions,
        viewer_id: i64,
        owner_id: Option<i64>,
    ) -> Self {
        let check =
            |action| security.has_entity_access(permissions, viewer_id, action, owner_id);
        Self {
            can_view: check(LeadAction::View),
            can_create: check(LeadAction::Create),
            can_edit: check(LeadAction::Edit),
            can_delete: check(LeadAction::Delete),
        }
    }
}
