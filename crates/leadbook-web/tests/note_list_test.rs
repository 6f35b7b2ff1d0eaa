//! Router-level tests for the note list and lead index.
//!
//! Each test builds the real router over in-memory repositories and drives
//! it with actual HTTP requests via `tower::ServiceExt`. This validates
//! routing, the access guard, session persistence, and response shaping in
//! one pass.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt; // for `.oneshot()`

use leadbook_core::UserPermissions;
use leadbook_web::test_support::{lead, note, user_with, TestApp};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// App with an admin "alice" (id 1) and lead 5 owned by her.
async fn seeded_app() -> TestApp {
    let app = TestApp::new();
    app.add_user(user_with(1, "alice", UserPermissions::admin()))
        .await;
    app.add_lead(lead(5, Some(1))).await;
    app
}

fn get_page(uri: &str, user: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("x-auth-user", user)
        .body(Body::empty())
        .unwrap()
}

/// GET flagged as ajax, the way the notes tab refreshes itself.
fn get_ajax(uri: &str, user: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("x-auth-user", user)
        .header("x-requested-with", "XMLHttpRequest")
        .body(Body::empty())
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&bytes).to_string()
}

// ---------------------------------------------------------------------------
// Health and authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let app = TestApp::new();
    let resp = app
        .router()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn list_requires_authentication() {
    let app = seeded_app().await;
    let resp = app
        .router()
        .oneshot(
            Request::builder()
                .uri("/leads/5/notes")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .router()
        .oneshot(get_page("/leads/5/notes", "nobody"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Access guard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn lead_zero_is_denied_up_front() {
    let app = seeded_app().await;
    let resp = app
        .router()
        .oneshot(get_page("/leads/0/notes", "alice"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn viewer_without_permission_is_denied() {
    let app = seeded_app().await;
    app.add_user(user_with(2, "bob", UserPermissions::none()))
        .await;

    let resp = app
        .router()
        .oneshot(get_page("/leads/5/notes", "bob"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn own_permission_does_not_extend_to_other_leads() {
    let app = seeded_app().await;
    let own_only = UserPermissions {
        note_view_own: true,
        ..UserPermissions::none()
    };
    app.add_user(user_with(2, "bob", own_only)).await;
    // Lead 5 is owned by alice; lead 6 by bob.
    app.add_lead(lead(6, Some(2))).await;

    let resp = app
        .router()
        .oneshot(get_page("/leads/6/notes", "bob"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .router()
        .oneshot(get_page("/leads/5/notes", "bob"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn missing_lead_redirects_and_flashes_once() {
    let app = seeded_app().await;

    let resp = app
        .router()
        .oneshot(get_page("/leads/99/notes", "alice"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/leads");

    // The flash renders on the index page, then drains.
    let resp = app
        .router()
        .oneshot(get_page("/leads", "alice"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("Lead 99 could not be found."));

    let resp = app
        .router()
        .oneshot(get_page("/leads", "alice"))
        .await
        .unwrap();
    let html = body_string(resp).await;
    assert!(!html.contains("Lead 99 could not be found."));
}

// ---------------------------------------------------------------------------
// List shaping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ajax_list_returns_count_and_fragment() {
    let app = seeded_app().await;
    app.add_note(note(1, 5, "first call")).await;
    app.add_note(note(2, 5, "second call")).await;

    let resp = app
        .router()
        .oneshot(get_ajax("/leads/5/notes", "alice"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["mauticContent"], "leadNote");
    assert_eq!(body["noteCount"], 2);
    let html = body["html"].as_str().unwrap();
    // Default template is the whole tab, toolbar included.
    assert!(html.contains("notes-toolbar"));
    assert!(html.contains("first call"));
}

#[tokio::test]
async fn tmpl_list_returns_bare_list_fragment() {
    let app = seeded_app().await;
    app.add_note(note(1, 5, "only note")).await;

    let resp = app
        .router()
        .oneshot(get_ajax("/leads/5/notes?tmpl=list", "alice"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    let html = body["html"].as_str().unwrap();
    assert!(html.contains("only note"));
    assert!(!html.contains("notes-toolbar"));
}

#[tokio::test]
async fn browser_navigation_gets_a_full_page() {
    let app = seeded_app().await;
    app.add_note(note(1, 5, "a note")).await;

    let resp = app
        .router()
        .oneshot(get_page("/leads/5/notes", "alice"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("a note"));
}

#[tokio::test]
async fn note_count_is_the_badge_total_not_page_length() {
    let app = seeded_app().await;
    for i in 1..=5 {
        app.add_note(note(i, 5, &format!("note {}", i))).await;
    }

    let resp = app
        .router()
        .oneshot(get_ajax("/leads/5/notes?limit=2", "alice"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["noteCount"], 5);
}

#[tokio::test]
async fn note_count_badge_ignores_the_search_filter() {
    let app = seeded_app().await;
    app.add_note(note(1, 5, "meeting with acme")).await;
    app.add_note(note(2, 5, "call with globex")).await;
    app.add_note(note(3, 5, "acme follow-up")).await;

    let resp = app
        .router()
        .oneshot(get_ajax("/leads/5/notes?search=globex", "alice"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    // The fragment narrows to the match; the badge stays at the lead total.
    assert_eq!(body["noteCount"], 3);
    let html = body["html"].as_str().unwrap();
    assert!(html.contains("globex"));
    assert!(!html.contains("acme"));
}

// ---------------------------------------------------------------------------
// Pagination and ordering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn page_translates_to_offset() {
    let app = seeded_app().await;
    for i in 1..=5 {
        app.add_note(note(i, 5, &format!("note {}", i))).await;
    }

    let resp = app
        .router()
        .oneshot(get_ajax(
            "/leads/5/notes?limit=2&page=3&orderby=id&orderdir=asc",
            "alice",
        ))
        .await
        .unwrap();
    let body = body_json(resp).await;
    let html = body["html"].as_str().unwrap();
    // Offset (3-1)*2 = 4 skips notes 1-4.
    assert!(html.contains("note 5"));
    assert!(!html.contains("note 4"));
}

#[tokio::test]
async fn huge_page_number_is_an_empty_page_not_an_error() {
    let app = seeded_app().await;
    app.add_note(note(1, 5, "only note")).await;

    let resp = app
        .router()
        .oneshot(get_ajax("/leads/5/notes?page=9223372036854775807", "alice"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert!(body["html"].as_str().unwrap().contains("No notes yet"));
}

#[tokio::test]
async fn page_zero_clamps_to_offset_zero() {
    let app = seeded_app().await;
    for i in 1..=3 {
        app.add_note(note(i, 5, &format!("note {}", i))).await;
    }

    let resp = app
        .router()
        .oneshot(get_ajax(
            "/leads/5/notes?page=0&orderby=id&orderdir=asc",
            "alice",
        ))
        .await
        .unwrap();
    let body = body_json(resp).await;
    let html = body["html"].as_str().unwrap();
    assert!(html.contains("note 1"));
}

#[tokio::test]
async fn default_order_is_newest_first() {
    let app = seeded_app().await;
    let mut old = note(1, 5, "older note");
    old.date_time = old.date_time - chrono::Duration::hours(2);
    app.add_note(old).await;
    app.add_note(note(2, 5, "newer note")).await;

    let resp = app
        .router()
        .oneshot(get_ajax("/leads/5/notes?tmpl=list", "alice"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    let html = body["html"].as_str().unwrap();
    let newer = html.find("newer note").unwrap();
    let older = html.find("older note").unwrap();
    assert!(newer < older);
}

// ---------------------------------------------------------------------------
// Session persistence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_round_trips_through_session() {
    let app = seeded_app().await;
    app.add_note(note(1, 5, "meeting with acme")).await;
    app.add_note(note(2, 5, "call with globex")).await;

    let resp = app
        .router()
        .oneshot(get_ajax("/leads/5/notes?search=acme", "alice"))
        .await
        .unwrap();
    let html = body_json(resp).await["html"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(!html.contains("globex"));

    // Follow-up request without a search param reuses the stored filter.
    let resp = app
        .router()
        .oneshot(get_ajax("/leads/5/notes", "alice"))
        .await
        .unwrap();
    let html = body_json(resp).await["html"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(!html.contains("globex"));
    assert!(html.contains("value=\"acme\""));

    // Submitting an empty search clears it.
    let resp = app
        .router()
        .oneshot(get_ajax("/leads/5/notes?search=", "alice"))
        .await
        .unwrap();
    let html = body_json(resp).await["html"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(html.contains("globex"));
}

#[tokio::test]
async fn list_limit_sticks_in_session() {
    let app = seeded_app().await;
    for i in 1..=4 {
        app.add_note(note(i, 5, &format!("note {}", i))).await;
    }

    let resp = app
        .router()
        .oneshot(get_ajax("/leads/5/notes?tmpl=list&limit=2", "alice"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    let rows = body["html"].as_str().unwrap().matches("<li").count();
    assert_eq!(rows, 2);

    let resp = app
        .router()
        .oneshot(get_ajax("/leads/5/notes?tmpl=list", "alice"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    let rows = body["html"].as_str().unwrap().matches("<li").count();
    assert_eq!(rows, 2);
}

#[tokio::test]
async fn sessions_are_per_user() {
    let app = seeded_app().await;
    app.add_user(user_with(2, "bob", UserPermissions::admin()))
        .await;
    app.add_note(note(1, 5, "meeting with acme")).await;
    app.add_note(note(2, 5, "call with globex")).await;

    let resp = app
        .router()
        .oneshot(get_ajax("/leads/5/notes?search=acme", "alice"))
        .await
        .unwrap();
    let html = body_json(resp).await["html"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(!html.contains("globex"));

    // Bob's session has no filter.
    let resp = app
        .router()
        .oneshot(get_ajax("/leads/5/notes", "bob"))
        .await
        .unwrap();
    let html = body_json(resp).await["html"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(html.contains("globex"));
}

// ---------------------------------------------------------------------------
// Lead index
// ---------------------------------------------------------------------------

#[tokio::test]
async fn lead_index_lists_leads_with_note_counts() {
    let app = seeded_app().await;
    app.add_note(note(1, 5, "one")).await;
    app.add_note(note(2, 5, "two")).await;

    let resp = app
        .router()
        .oneshot(get_page("/leads", "alice"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("Lead 5"));
    assert!(html.contains("/leads/5/notes"));
    assert!(html.contains("<td class=\"note-count\">2</td>"));
}

#[tokio::test]
async fn lead_index_survives_a_huge_page_number() {
    let app = seeded_app().await;

    let resp = app
        .router()
        .oneshot(get_page("/leads?page=9223372036854775807", "alice"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
