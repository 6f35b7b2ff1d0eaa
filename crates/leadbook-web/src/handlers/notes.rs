//! Note HTTP handlers.
//!
//! The notes tab is modal-driven: browser navigation gets full pages, ajax
//! requests get HTML fragments or small JSON "close signals" that tell the
//! client to dismiss the dialog and patch the DOM. Every operation clears
//! the lead view guard before anything else; create and edit rights are
//! checked inline past the guard.

use axum::extract::{Path, Query, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use leadbook_core::{
    LeadAction, NewNote, NoteListQuery, NoteOrderField, NotePermissions, NoteUpdate, SortDir,
};

use crate::actions::NoteAction;
use crate::error::WebError;
use crate::extract::{ListTmpl, RequestKind, Viewer};
use crate::forms::NoteFormData;
use crate::guard::check_lead_access;
use crate::render;
use crate::AppState;

use super::page_offset;

/// Payload marker the modal client dispatches on.
const PAYLOAD_CONTENT: &str = "leadNote";

/// Wire format for the datetime-local form field.
const FORM_DATETIME: &str = "%Y-%m-%dT%H:%M";

/// JSON response with an explicit `Content-Length`. The modal client does
/// not accept chunked close signals.
fn json_response(body: serde_json::Value) -> Response {
    let bytes = body.to_string();
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_LENGTH, bytes.len().to_string()),
        ],
        bytes,
    )
        .into_response()
}

/// Query parameters accepted by the note list.
#[derive(Debug, Default, Deserialize)]
pub struct NoteListParams {
    pub page: Option<i64>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub orderby: Option<String>,
    pub orderdir: Option<String>,
}

/// `GET /leads/:lead_id/notes`
///
/// # Returns
/// - 200 OK with a full page, or for ajax requests a JSON envelope
///   `{ "mauticContent": "leadNote", "noteCount": <lead total>, "html":
///   <fragment> }`
/// - 403 Forbidden when the lead id is zero or the viewer lacks view access
/// - 303 See Other to `/leads` when the lead does not exist
pub async fn list(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    kind: RequestKind,
    Path(lead_id): Path<i64>,
    Query(params): Query<NoteListParams>,
) -> Result<Response, WebError> {
    list_flow(&state, &viewer, kind, lead_id, params).await
}

async fn list_flow(
    state: &AppState,
    viewer: &leadbook_core::User,
    kind: RequestKind,
    lead_id: i64,
    params: NoteListParams,
) -> Result<Response, WebError> {
    // Lead id zero is what an unset route segment parses to in the legacy
    // UI; reject before loading anything.
    if lead_id == 0 {
        return Err(WebError::AccessDenied);
    }

    let lead = check_lead_access(state, viewer, lead_id, LeadAction::View).await?;

    let stored = state.sessions.note_list(viewer.id).await;

    let limit = params.limit.filter(|l| *l > 0).unwrap_or(stored.limit);
    state.sessions.set_note_limit(viewer.id, limit).await;

    // Search comes from the request when present (empty clears), otherwise
    // from the session, so a follow-up request keeps the active filter.
    let search = match params.search {
        Some(s) => {
            state.sessions.set_note_search(viewer.id, s.clone()).await;
            s
        }
        None => stored.search,
    };

    let requested_order = (
        params.orderby.as_deref().and_then(NoteOrderField::parse),
        params.orderdir.as_deref().and_then(SortDir::parse),
    );
    let (order_by, order_dir) = match requested_order {
        (Some(field), Some(dir)) => {
            state.sessions.set_note_order(viewer.id, field, dir).await;
            (field, dir)
        }
        _ => (stored.order_by, stored.order_dir),
    };

    let page = params.page.unwrap_or(1);
    let offset = page_offset(page, limit);

    let result = state
        .notes
        .list(&NoteListQuery {
            lead_id,
            search: search.clone(),
            order_by,
            order_dir,
            limit,
            offset,
        })
        .await?;

    let perms = NotePermissions::for_lead(
        &state.security,
        &viewer.permissions,
        viewer.id,
        lead.owner_id,
    );

    if kind.is_ajax {
        let html = match kind.tmpl {
            ListTmpl::List => render::note_list(&result.notes, &perms),
            ListTmpl::Index => render::notes_tab(&lead, &search, &result.notes, result.total, &perms),
        };
        // The badge tracks the lead's whole tally; searching narrows the
        // fragment but never moves the badge.
        let badge = state.notes.count_for_lead(lead.id).await?;
        return Ok(json_response(json!({
            "mauticContent": PAYLOAD_CONTENT,
            "noteCount": badge,
            "html": html,
        })));
    }

    let tab = render::notes_tab(&lead, &search, &result.notes, result.total, &perms);
    Ok(Html(render::notes_page(&lead, &tab)).into_response())
}

/// `GET|POST /leads/:lead_id/notes/new`
///
/// # Returns
/// - 200 OK with the modal form fragment (GET, or POST with validation
///   errors)
/// - 200 OK with a JSON close signal on cancel or successful create
/// - 403 Forbidden when the viewer lacks view access to the lead or the
///   create flag
pub async fn note_new(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(lead_id): Path<i64>,
    method: Method,
    form: Option<Form<NoteFormData>>,
) -> Result<Response, WebError> {
    new_flow(&state, &viewer, lead_id, method, form.map(|Form(d)| d)).await
}

async fn new_flow(
    state: &AppState,
    viewer: &leadbook_core::User,
    lead_id: i64,
    method: Method,
    data: Option<NoteFormData>,
) -> Result<Response, WebError> {
    // View access admits the viewer to the lead; creating additionally
    // needs the create flag.
    let lead = check_lead_access(state, viewer, lead_id, LeadAction::View).await?;
    if !state.security.has_entity_access(
        &viewer.permissions,
        viewer.id,
        LeadAction::Create,
        lead.owner_id,
    ) {
        return Err(WebError::AccessDenied);
    }

    if method != Method::POST {
        // Blank form; the touchpoint time prefills to now.
        let values = NoteFormData {
            date_time: Utc::now().format(FORM_DATETIME).to_string(),
            ..NoteFormData::default()
        };
        return Ok(Html(render::note_form(lead.id, None, &values, &[])).into_response());
    }

    let data = data.unwrap_or_default();
    if data.is_cancelled() {
        return Ok(json_response(json!({
            "closeModal": 1,
            "mauticContent": PAYLOAD_CONTENT,
        })));
    }

    let errors = data.validate();
    if !errors.is_empty() {
        return Ok(Html(render::note_form(lead.id, None, &data, &errors)).into_response());
    }

    let note = state
        .notes
        .create(&NewNote {
            lead_id: lead.id,
            text: data.text.trim().to_string(),
            kind: data.parsed_kind(),
            date_time: data.parsed_date_time(),
            created_by: Some(viewer.id),
        })
        .await?;

    tracing::info!(
        subsystem = "web",
        component = "notes",
        lead_id = lead.id,
        note_id = note.id,
        "note created"
    );

    let perms = NotePermissions::for_lead(
        &state.security,
        &viewer.permissions,
        viewer.id,
        lead.owner_id,
    );
    Ok(json_response(json!({
        "closeModal": 1,
        "mauticContent": PAYLOAD_CONTENT,
        "noteHtml": render::note_row(&note, &perms),
        "noteId": note.id,
        "upNoteCount": 1,
    })))
}

async fn edit_flow(
    state: &AppState,
    viewer: &leadbook_core::User,
    lead_id: i64,
    note_id: i64,
    method: Method,
    data: Option<NoteFormData>,
) -> Result<Response, WebError> {
    let lead = check_lead_access(state, viewer, lead_id, LeadAction::View).await?;

    // Unknown note ids fold into the access failure; the client cannot
    // probe which ids exist.
    let Some(note) = state.notes.get(note_id).await? else {
        return Err(WebError::AccessDenied);
    };
    if note.lead_id != lead.id {
        return Err(WebError::AccessDenied);
    }
    if !state.security.has_entity_access(
        &viewer.permissions,
        viewer.id,
        LeadAction::Edit,
        lead.owner_id,
    ) {
        return Err(WebError::AccessDenied);
    }

    if method != Method::POST {
        let values = NoteFormData {
            text: note.text.clone(),
            kind: note.kind.as_str().to_string(),
            date_time: note.date_time.format(FORM_DATETIME).to_string(),
            cancel: None,
        };
        return Ok(Html(render::note_form(lead.id, Some(note.id), &values, &[])).into_response());
    }

    let data = data.unwrap_or_default();
    if data.is_cancelled() {
        return Ok(json_response(json!({
            "closeModal": 1,
            "mauticContent": PAYLOAD_CONTENT,
        })));
    }

    let errors = data.validate();
    if !errors.is_empty() {
        return Ok(
            Html(render::note_form(lead.id, Some(note.id), &data, &errors)).into_response(),
        );
    }

    let updated = state
        .notes
        .update(
            note.id,
            &NoteUpdate {
                text: Some(data.text.trim().to_string()),
                kind: Some(data.parsed_kind()),
                date_time: data.parsed_date_time(),
            },
        )
        .await?;

    let perms = NotePermissions::for_lead(
        &state.security,
        &viewer.permissions,
        viewer.id,
        lead.owner_id,
    );
    // No count delta; editing does not change the badge.
    Ok(json_response(json!({
        "closeModal": 1,
        "mauticContent": PAYLOAD_CONTENT,
        "noteHtml": render::note_row(&updated, &perms),
        "noteId": updated.id,
    })))
}

async fn delete_flow(
    state: &AppState,
    viewer: &leadbook_core::User,
    lead_id: i64,
    note_id: i64,
    method: Method,
) -> Result<Response, WebError> {
    let lead = check_lead_access(state, viewer, lead_id, LeadAction::View).await?;

    let Some(note) = state.notes.get(note_id).await? else {
        return Err(WebError::AccessDenied);
    };
    if note.lead_id != lead.id {
        return Err(WebError::AccessDenied);
    }
    // Removal rides the edit permission; the delete flags gate only the
    // rendered control.
    if !state.security.has_entity_access(
        &viewer.permissions,
        viewer.id,
        LeadAction::Edit,
        lead.owner_id,
    ) {
        return Err(WebError::AccessDenied);
    }
    if note.is_locked_for(viewer.id) {
        tracing::debug!(
            subsystem = "web",
            component = "notes",
            note_id = note.id,
            checked_out_by = ?note.checked_out_by,
            "delete refused, note checked out"
        );
        return Err(WebError::AccessDenied);
    }
    // Delete only answers to a state-changing verb.
    if method != Method::POST {
        return Err(WebError::AccessDenied);
    }

    state.notes.delete(note.id).await?;

    tracing::info!(
        subsystem = "web",
        component = "notes",
        lead_id = lead.id,
        note_id = note.id,
        "note deleted"
    );

    // deleteId mirrors the route segment, which the client treats as an
    // opaque string; the count delta is numeric.
    Ok(json_response(json!({
        "deleteId": note.id.to_string(),
        "downNoteCount": 1,
        "mauticContent": PAYLOAD_CONTENT,
    })))
}

/// `GET|POST /leads/:lead_id/notes/:note_id/:action`
///
/// Name-dispatched note operations. The action segment resolves through
/// [`NoteAction`]; an unknown name is an access failure. `list` treats the
/// trailing id as the page number and `new` ignores it, matching how the
/// dispatched routes behaved historically.
pub async fn note_action(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    kind: RequestKind,
    Path((lead_id, note_id, action)): Path<(i64, i64, String)>,
    method: Method,
    form: Option<Form<NoteFormData>>,
) -> Result<Response, WebError> {
    let data = form.map(|Form(d)| d);
    match NoteAction::from_name(&action) {
        Some(NoteAction::List) => {
            let params = NoteListParams {
                page: Some(note_id),
                ..NoteListParams::default()
            };
            list_flow(&state, &viewer, kind, lead_id, params).await
        }
        Some(NoteAction::New) => new_flow(&state, &viewer, lead_id, method, data).await,
        Some(NoteAction::Edit) => {
            edit_flow(&state, &viewer, lead_id, note_id, method, data).await
        }
        Some(NoteAction::Delete) => delete_flow(&state, &viewer, lead_id, note_id, method).await,
        None => Err(WebError::AccessDenied),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_math_floors_at_zero() {
        assert_eq!(page_offset(1, 30), 0);
        assert_eq!(page_offset(3, 10), 20);
        assert_eq!(page_offset(0, 30), 0);
        assert_eq!(page_offset(-5, 30), 0);
    }

    #[test]
    fn offset_math_saturates_on_extreme_pages() {
        assert_eq!(page_offset(i64::MAX, 30), i64::MAX);
        assert_eq!(page_offset(i64::MAX, i64::MAX), i64::MAX);
        assert_eq!(page_offset(i64::MIN, 30), 0);
    }

    #[test]
    fn json_response_sets_explicit_length() {
        let resp = json_response(json!({ "closeModal": 1 }));
        let length = resp
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap();
        assert_eq!(length, json!({ "closeModal": 1 }).to_string().len());
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
