//! Lead index handler.
//!
//! This is the page the access guard redirects to when a lead id does not
//! resolve; the queued flash renders here.

use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;

use leadbook_core::defaults;

use crate::error::WebError;
use crate::extract::Viewer;
use crate::render;
use crate::AppState;

use super::page_offset;

#[derive(Debug, Default, Deserialize)]
pub struct LeadIndexParams {
    pub page: Option<i64>,
}

/// `GET /leads`
///
/// Full page listing leads with their note counts. The page number sticks
/// in the session so a later visit without a `page` param resumes where the
/// viewer left off. Flash messages render once and drain.
pub async fn index(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Query(params): Query<LeadIndexParams>,
) -> Result<Response, WebError> {
    let page = match params.page {
        Some(p) if p > 0 => {
            state.sessions.set_lead_page(viewer.id, p).await;
            p
        }
        _ => state.sessions.lead_page(viewer.id).await.max(1),
    };

    let limit = defaults::LEAD_PAGE_LIMIT;
    let offset = page_offset(page, limit);
    let leads = state.leads.list(limit, offset).await?;

    let flashes = state.sessions.take_flashes(viewer.id).await;
    Ok(Html(render::lead_index(&leads, &flashes)).into_response())
}
