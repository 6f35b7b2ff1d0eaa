//! # leadbook-web
//!
//! HTTP service for leadbook: lead pages and the modal-driven note tab.
//!
//! The crate is organized around one [`AppState`] shared by all handlers:
//! repository trait objects, the in-memory session store, the permission
//! checker, and an optional global rate limiter. [`build_router`] wires the
//! routes and the middleware stack; `main` only does configuration, database
//! setup, and serving.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use governor::RateLimiter;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use leadbook_core::{defaults, LeadRepository, NoteRepository, SecurityService, UserRepository};

pub mod actions;
pub mod error;
pub mod extract;
pub mod forms;
pub mod guard;
pub mod handlers;
pub mod render;
pub mod session;

// Always compiled so router-level integration tests (in tests/) can build an
// AppState without Postgres.
pub mod test_support;

pub use error::WebError;
pub use session::SessionStore;

/// Global rate limiter type (direct quota, no keyed bucketing; the service
/// sits behind one proxy).
pub type GlobalRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub leads: Arc<dyn LeadRepository>,
    pub notes: Arc<dyn NoteRepository>,
    pub users: Arc<dyn UserRepository>,
    pub sessions: SessionStore,
    pub security: SecurityService,
    /// Global rate limiter (None if rate limiting is disabled).
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
}

impl AppState {
    /// Assemble state over the live database repositories.
    pub fn from_database(
        db: leadbook_db::Database,
        rate_limiter: Option<Arc<GlobalRateLimiter>>,
    ) -> Self {
        Self {
            leads: Arc::new(db.leads),
            notes: Arc::new(db.notes),
            users: Arc::new(db.users),
            sessions: SessionStore::new(),
            security: SecurityService::new(),
            rate_limiter,
        }
    }
}

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically across log
/// streams.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    // If rate limiting is disabled, pass through
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            tracing::warn!("Rate limit exceeded");
            return Err((
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({
                    "error": "rate_limit_exceeded",
                    "error_description": "Too many requests. Please wait before retrying."
                })),
            ));
        }
    }
    Ok(next.run(request).await)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Build the application router over `state`.
///
/// Canonical edit and delete URLs (`/notes/:id/edit`, `/notes/:id/delete`)
/// flow through the `:action` dispatcher, which resolves the name once and
/// rejects anything it does not recognize.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/leads", get(handlers::leads::index))
        .route("/leads/:lead_id/notes", get(handlers::notes::list))
        .route(
            "/leads/:lead_id/notes/new",
            get(handlers::notes::note_new).post(handlers::notes::note_new),
        )
        .route(
            "/leads/:lead_id/notes/:note_id/:action",
            get(handlers::notes::note_action).post(handlers::notes::note_action),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(RequestBodyLimitLayer::new(defaults::MAX_BODY_SIZE_BYTES))
        .with_state(state)
}
