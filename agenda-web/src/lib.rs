//! agenda-web library - contact manager web service
//!
//! Server-rendered pages for listing, searching, creating, editing and
//! deleting contacts behind a session login.

use axum::extract::DefaultBodyLimit;
use axum::{middleware, Router};
use sqlx::SqlitePool;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

pub mod api;
pub mod error;
pub mod photos;
pub mod session;
pub mod views;

pub use error::{WebError, WebResult};
pub use photos::PhotoStore;

/// Room for the text fields sent alongside a photo
const FORM_FIELDS_ALLOWANCE: usize = 64 * 1024;

/// Request-independent settings taken from the bootstrap config
#[derive(Debug, Clone)]
pub struct WebSettings {
    pub max_upload_bytes: usize,
    pub session_timeout_minutes: i64,
    pub secure_cookies: bool,
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            max_upload_bytes: 5 * 1024 * 1024,
            session_timeout_minutes: 60,
            secure_cookies: false,
        }
    }
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Uploaded photo storage
    pub photos: PhotoStore,
    /// Server-side session data, keyed by the session cookie
    pub sessions: MemoryStore,
    pub settings: WebSettings,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, photos: PhotoStore, settings: WebSettings) -> Self {
        Self {
            db,
            photos,
            sessions: MemoryStore::default(),
            settings,
        }
    }
}

/// Build application router
///
/// Contact pages sit behind the login gate; login, health, static assets
/// and uploaded photos are public.
pub fn build_router(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(state.sessions.clone())
        .with_secure(state.settings.secure_cookies)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            state.settings.session_timeout_minutes,
        )));

    let body_limit = state.settings.max_upload_bytes + FORM_FIELDS_ALLOWANCE;

    // Protected routes (require an authenticated session)
    let protected = api::contact_routes()
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_login,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .merge(api::auth_routes())
        .merge(api::ui_routes())
        .merge(api::health_routes())
        .nest_service("/uploads", ServeDir::new(state.photos.dir()));

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
