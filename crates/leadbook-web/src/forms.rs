//! Note form deserialization and validation.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use leadbook_core::{defaults, NoteKind};

/// A validation failure tied to one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Body of the note create/edit form.
///
/// `date_time` arrives as the browser's `datetime-local` string and is
/// interpreted as UTC. The cancel button submits its own field; its
/// presence is what distinguishes "close without saving" from a save.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteFormData {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub date_time: String,
    pub cancel: Option<String>,
}

impl NoteFormData {
    /// Whether the submit came from the cancel button.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_some()
    }

    /// Parsed note kind, defaulting for blank or unknown input.
    pub fn parsed_kind(&self) -> NoteKind {
        NoteKind::parse(&self.kind).unwrap_or_default()
    }

    /// Parsed touchpoint time; `None` when the field was left blank.
    pub fn parsed_date_time(&self) -> Option<DateTime<Utc>> {
        if self.date_time.is_empty() {
            return None;
        }
        NaiveDateTime::parse_from_str(&self.date_time, "%Y-%m-%dT%H:%M")
            .or_else(|_| NaiveDateTime::parse_from_str(&self.date_time, "%Y-%m-%dT%H:%M:%S"))
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// Validate the form, returning one error per failing field.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.text.trim().is_empty() {
            errors.push(FieldError::new("text", "A note is required."));
        } else if self.text.chars().count() > defaults::NOTE_TEXT_MAX_LENGTH {
            errors.push(FieldError::new(
                "text",
                format!(
                    "A note may not exceed {} characters.",
                    defaults::NOTE_TEXT_MAX_LENGTH
                ),
            ));
        }

        if !self.kind.is_empty() && NoteKind::parse(&self.kind).is_none() {
            errors.push(FieldError::new("kind", "Unknown note type."));
        }

        if !self.date_time.is_empty() && self.parsed_date_time().is_none() {
            errors.push(FieldError::new("date_time", "Invalid date."));
        }

        errors
    }
}
