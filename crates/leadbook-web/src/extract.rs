//! Request extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use leadbook_core::User;

use crate::error::WebError;
use crate::AppState;

/// Header naming the acting user. Populated by the fronting proxy after it
/// authenticates the request; the app itself never sees credentials.
pub const AUTH_USER_HEADER: &str = "x-auth-user";

/// Extractor for the authenticated user.
///
/// Resolves the `x-auth-user` header to a full [`User`] record, permissions
/// included. Handlers that take a `Viewer` cannot run unauthenticated.
#[derive(Debug, Clone)]
pub struct Viewer(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for Viewer {
    type Rejection = WebError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let username = parts
            .headers
            .get(AUTH_USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let Some(username) = username else {
            return Err(WebError::Unauthorized(
                "Authentication required".to_string(),
            ));
        };

        match state.users.get_by_username(username).await? {
            Some(user) => Ok(Viewer(user)),
            None => Err(WebError::Unauthorized("Unknown user".to_string())),
        }
    }
}

/// Which fragment an ajax list refresh wants back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListTmpl {
    /// Toolbar plus list, the whole tab.
    #[default]
    Index,
    /// Just the list rows.
    List,
}

/// How the client asked: browser navigation or ajax, and which template.
///
/// Never rejects. A missing or unrecognized `tmpl` falls back to `Index`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestKind {
    pub is_ajax: bool,
    pub tmpl: ListTmpl,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequestKind
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let is_ajax = parts
            .headers
            .get("x-requested-with")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("XMLHttpRequest"));

        let tmpl = parts
            .uri
            .query()
            .and_then(|q| q.split('&').find_map(|pair| pair.strip_prefix("tmpl=")))
            .map(|v| match v {
                "list" => ListTmpl::List,
                _ => ListTmpl::Index,
            })
            .unwrap_or_default();

        Ok(RequestKind { is_ajax, tmpl })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn kind_for(req: Request<()>) -> RequestKind {
        let (mut parts, _) = req.into_parts();
        RequestKind::from_request_parts(&mut parts, &())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn plain_navigation_is_not_ajax() {
        let req = Request::builder()
            .uri("/leads/5/notes")
            .body(())
            .unwrap();
        let kind = kind_for(req).await;
        assert!(!kind.is_ajax);
        assert_eq!(kind.tmpl, ListTmpl::Index);
    }

    #[tokio::test]
    async fn xhr_header_marks_ajax() {
        let req = Request::builder()
            .uri("/leads/5/notes")
            .header("x-requested-with", "XMLHttpRequest")
            .body(())
            .unwrap();
        assert!(kind_for(req).await.is_ajax);

        let req = Request::builder()
            .uri("/leads/5/notes")
            .header("x-requested-with", "fetch")
            .body(())
            .unwrap();
        assert!(!kind_for(req).await.is_ajax);
    }

    #[tokio::test]
    async fn tmpl_param_selects_list_fragment() {
        let req = Request::builder()
            .uri("/leads/5/notes?search=x&tmpl=list")
            .body(())
            .unwrap();
        assert_eq!(kind_for(req).await.tmpl, ListTmpl::List);

        let req = Request::builder()
            .uri("/leads/5/notes?tmpl=bogus")
            .body(())
            .unwrap();
        assert_eq!(kind_for(req).await.tmpl, ListTmpl::Index);
    }
}
