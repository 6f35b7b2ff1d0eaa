//! Lead access guard.
//!
//! Every note operation funnels through [`check_lead_access`] before it
//! touches the repository. The guard either hands back the lead or an error
//! the response layer already knows how to render, so a handler cannot
//! forget the check and cannot observe a half-authorized state.

use leadbook_core::{Lead, LeadAction};

use crate::error::WebError;
use crate::session::FlashMessage;
use crate::AppState;

/// Resolve `lead_id` and verify the viewer may perform `action` on its
/// notes.
///
/// A lead that does not exist queues a flash on the viewer's session and
/// yields [`WebError::LeadNotFound`], which renders as a redirect to the
/// lead index where the flash is shown. A lead the viewer may not touch is
/// a hard 403.
pub async fn check_lead_access(
    state: &AppState,
    viewer: &leadbook_core::User,
    lead_id: i64,
    action: LeadAction,
) -> Result<Lead, WebError> {
    let Some(lead) = state.leads.get(lead_id).await? else {
        state
            .sessions
            .push_flash(
                viewer.id,
                FlashMessage::error(format!("Lead {} could not be found.", lead_id)),
            )
            .await;
        return Err(WebError::LeadNotFound { lead_id });
    };

    if !state
        .security
        .has_entity_access(&viewer.permissions, viewer.id, action, lead.owner_id)
    {
        tracing::debug!(
            subsystem = "web",
            component = "guard",
            viewer_id = viewer.id,
            lead_id = lead_id,
            action = %action,
            "access denied"
        );
        return Err(WebError::AccessDenied);
    }

    Ok(lead)
}
