//! Note sub-actions addressed by name in the URL.
//!
//! The action segment of `/leads/:lead_id/notes/:note_id/:action` is parsed
//! into [`NoteAction`] once at the route boundary and dispatched with a
//! `match`. Unknown names are access failures, never 404s.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteAction {
    List,
    New,
    Edit,
    Delete,
}

impl NoteAction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "list" => Some(NoteAction::List),
            "new" => Some(NoteAction::New),
            "edit" => Some(NoteAction::Edit),
            "delete" => Some(NoteAction::Delete),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NoteAction::List => "list",
            NoteAction::New => "new",
            NoteAction::Edit => "edit",
            NoteAction::Delete => "delete",
        }
    }
}
