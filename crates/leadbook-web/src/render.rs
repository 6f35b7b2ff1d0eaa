//! HTML rendering.
//!
//! Pages and modal fragments are assembled by hand. Every user-supplied
//! value passes through [`escape`] at the point of interpolation, and
//! attribute values are always double-quoted.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use leadbook_core::{Lead, LeadNote, LeadSummary, NotePermissions};

use crate::forms::{FieldError, NoteFormData};
use crate::session::{FlashLevel, FlashMessage};

/// Escape the five HTML metacharacters.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Full-page shell.
pub fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{} - Leadbook</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        body
    )
}

/// Standalone error page.
pub fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        "<main class=\"error\">\n<h1>{}</h1>\n<p>{}</p>\n\
         <p><a href=\"/leads\">Back to leads</a></p>\n</main>",
        status.as_u16(),
        escape(message)
    );
    page(&status.as_u16().to_string(), &body)
}

/// Error page wrapped as a response.
pub fn html_error_response(status: StatusCode, message: &str) -> Response {
    (status, Html(error_page(status, message))).into_response()
}

/// One note as a list row with its action controls.
pub fn note_row(note: &LeadNote, perms: &NotePermissions) -> String {
    let mut actions = String::new();
    if perms.can_edit {
        actions.push_str(&format!(
            "<a class=\"note-edit\" href=\"/leads/{}/notes/{}/edit\">Edit</a>",
            note.lead_id, note.id
        ));
    }
    if perms.can_delete {
        actions.push_str(&format!(
            "<form class=\"note-delete\" method=\"post\" \
             action=\"/leads/{}/notes/{}/delete\">\
             <button type=\"submit\">Delete</button></form>",
            note.lead_id, note.id
        ));
    }

    format!(
        "<li class=\"note-row note-{kind}\" id=\"note-{id}\">\
         <span class=\"note-kind\">{kind}</span>\
         <p class=\"note-text\">{text}</p>\
         <time class=\"note-time\" datetime=\"{iso}\">{shown}</time>\
         <span class=\"note-actions\">{actions}</span>\
         </li>",
        kind = note.kind.as_str(),
        id = note.id,
        text = escape(&note.text),
        iso = note.date_time.format("%Y-%m-%dT%H:%M:%SZ"),
        shown = note.date_time.format("%Y-%m-%d %H:%M"),
        actions = actions
    )
}

/// The note list itself (no toolbar). This is what `tmpl=list` refreshes.
pub fn note_list(notes: &[LeadNote], perms: &NotePermissions) -> String {
    if notes.is_empty() {
        return "<p class=\"notes-empty\">No notes yet.</p>".to_string();
    }
    let rows: String = notes.iter().map(|n| note_row(n, perms)).collect();
    format!("<ul class=\"note-list\" id=\"note-list\">{}</ul>", rows)
}

/// Toolbar (search box, count, add button) plus the note list. This is the
/// whole notes tab, what `tmpl=index` refreshes.
pub fn notes_tab(
    lead: &Lead,
    search: &str,
    notes: &[LeadNote],
    total: i64,
    perms: &NotePermissions,
) -> String {
    let add_button = if perms.can_create {
        format!(
            "<a class=\"note-add\" href=\"/leads/{}/notes/new\">Add note</a>",
            lead.id
        )
    } else {
        String::new()
    };

    format!(
        "<section class=\"notes-tab\" id=\"notes-tab\" data-note-count=\"{total}\">\
         <header class=\"notes-toolbar\">\
         <form class=\"note-search\" method=\"get\" action=\"/leads/{lead_id}/notes\">\
         <input type=\"search\" name=\"search\" value=\"{search}\" placeholder=\"Search notes\">\
         <button type=\"submit\">Search</button></form>\
         <span class=\"note-count\">{total}</span>\
         {add_button}\
         </header>\
         {list}\
         </section>",
        total = total,
        lead_id = lead.id,
        search = escape(search),
        add_button = add_button,
        list = note_list(notes, perms)
    )
}

/// Full page for a lead's notes tab.
pub fn notes_page(lead: &Lead, tab: &str) -> String {
    let body = format!(
        "<main class=\"lead-detail\">\n<h1>{}</h1>\n{}\n</main>",
        escape(&lead.display_name()),
        tab
    );
    page(&lead.display_name(), &body)
}

/// Modal create/edit form fragment.
///
/// `note_id` is `None` for the create form. `values` carries whatever the
/// user last submitted so a failed validation re-renders their input.
pub fn note_form(
    lead_id: i64,
    note_id: Option<i64>,
    values: &NoteFormData,
    errors: &[FieldError],
) -> String {
    let action = match note_id {
        Some(id) => format!("/leads/{}/notes/{}/edit", lead_id, id),
        None => format!("/leads/{}/notes/new", lead_id),
    };
    let title = if note_id.is_some() {
        "Edit note"
    } else {
        "Add note"
    };

    let mut error_block = String::new();
    if !errors.is_empty() {
        let items: String = errors
            .iter()
            .map(|e| format!("<li data-field=\"{}\">{}</li>", e.field, escape(&e.message)))
            .collect();
        error_block = format!("<ul class=\"form-errors\">{}</ul>", items);
    }

    let kind_options: String = leadbook_core::NoteKind::all()
        .iter()
        .map(|kind| {
            let selected = if values.parsed_kind() == *kind {
                " selected"
            } else {
                ""
            };
            format!(
                "<option value=\"{0}\"{1}>{0}</option>",
                kind.as_str(),
                selected
            )
        })
        .collect();

    format!(
        "<div class=\"modal-form\" id=\"note-form\">\
         <h2>{title}</h2>\
         {error_block}\
         <form method=\"post\" action=\"{action}\">\
         <textarea name=\"text\" required>{text}</textarea>\
         <select name=\"kind\">{kind_options}</select>\
         <input type=\"datetime-local\" name=\"date_time\" value=\"{date_time}\">\
         <button type=\"submit\" name=\"save\" value=\"1\">Save</button>\
         <button type=\"submit\" name=\"cancel\" value=\"1\" formnovalidate>Cancel</button>\
         </form>\
         </div>",
        title = title,
        error_block = error_block,
        action = action,
        text = escape(&values.text),
        kind_options = kind_options,
        date_time = escape(&values.date_time),
    )
}

/// Lead index page with the flash block.
pub fn lead_index(leads: &[LeadSummary], flashes: &[FlashMessage]) -> String {
    let flash_block: String = flashes
        .iter()
        .map(|f| {
            let class = match f.level {
                FlashLevel::Error => "flash-error",
                FlashLevel::Notice => "flash-notice",
            };
            format!("<div class=\"flash {}\">{}</div>", class, escape(&f.text))
        })
        .collect();

    let rows: String = leads
        .iter()
        .map(|l| {
            let name = l
                .name
                .as_deref()
                .filter(|n| !n.is_empty())
                .map(escape)
                .unwrap_or_else(|| format!("Lead #{}", l.id));
            let email = l.email.as_deref().map(escape).unwrap_or_default();
            format!(
                "<tr><td><a href=\"/leads/{}/notes\">{}</a></td>\
                 <td>{}</td><td class=\"note-count\">{}</td></tr>",
                l.id, name, email, l.note_count
            )
        })
        .collect();

    let body = format!(
        "<main class=\"lead-index\">\n{}\n<h1>Leads</h1>\n\
         <table class=\"lead-table\">\
         <thead><tr><th>Name</th><th>Email</th><th>Notes</th></tr></thead>\
         <tbody>{}</tbody></table>\n</main>",
        flash_block, rows
    );
    page("Leads", &body)
}
