//! Per-request session access
//!
//! [`AppSession`] wraps the cookie-keyed `tower_sessions::Session` with the
//! two things pages care about: who is logged in, and a one-shot flash
//! message. A flash is removed from the store the moment it is read, so it
//! renders at most once.

use agenda_common::db;
use axum::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{debug, info, warn};

use crate::error::WebResult;
use crate::AppState;

const USER_KEY: &str = "user";
const FLASH_KEY: &str = "flash";

/// Logged-in contact, as stored in the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub contact_id: i64,
    /// Display name shown in the greeting
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
    Info,
}

impl FlashLevel {
    pub fn css_class(self) -> &'static str {
        match self {
            FlashLevel::Success => "alert-success",
            FlashLevel::Error => "alert-error",
            FlashLevel::Info => "alert-info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

/// Everything the page layout needs from the session
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub user: Option<SessionUser>,
    pub flash: Option<Flash>,
}

/// Typed view over the request's session
#[derive(Debug, Clone)]
pub struct AppSession(Session);

#[async_trait]
impl<S> FromRequestParts<S> for AppSession
where
    S: Send + Sync,
{
    type Rejection = <Session as FromRequestParts<S>>::Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Session::from_request_parts(parts, state).await.map(AppSession)
    }
}

impl AppSession {
    pub async fn user(&self) -> WebResult<Option<SessionUser>> {
        Ok(self.0.get::<SessionUser>(USER_KEY).await?)
    }

    pub async fn is_logged_in(&self) -> WebResult<bool> {
        Ok(self.user().await?.is_some())
    }

    /// Store the user under a fresh session id
    pub async fn login(&self, user: SessionUser) -> WebResult<()> {
        self.0.cycle_id().await?;
        self.0.insert(USER_KEY, user).await?;
        Ok(())
    }

    /// Replace the stored user without touching the session id
    pub async fn set_user(&self, user: SessionUser) -> WebResult<()> {
        self.0.insert(USER_KEY, user).await?;
        Ok(())
    }

    /// Drop the user and rotate the session id
    ///
    /// The session itself survives so a flash can still be queued.
    pub async fn logout(&self) -> WebResult<()> {
        self.0.remove::<SessionUser>(USER_KEY).await?;
        self.0.cycle_id().await?;
        Ok(())
    }

    /// Queue a message for the next rendered page
    pub async fn set_flash(&self, level: FlashLevel, message: impl Into<String>) -> WebResult<()> {
        let flash = Flash {
            level,
            message: message.into(),
        };
        debug!("Flash queued: {:?}", flash);
        self.0.insert(FLASH_KEY, flash).await?;
        Ok(())
    }

    /// Read and clear the pending flash message
    pub async fn take_flash(&self) -> WebResult<Option<Flash>> {
        Ok(self.0.remove::<Flash>(FLASH_KEY).await?)
    }

    /// User and pending flash for rendering a page; consumes the flash
    pub async fn page_context(&self) -> WebResult<PageContext> {
        Ok(PageContext {
            user: self.user().await?,
            flash: self.take_flash().await?,
        })
    }

    /// Queue a flash and redirect (303) to `to`
    pub async fn redirect_with_flash(
        &self,
        level: FlashLevel,
        message: impl Into<String>,
        to: &str,
    ) -> WebResult<Redirect> {
        self.set_flash(level, message).await?;
        Ok(Redirect::to(to))
    }
}

/// Session user whose contact can still log in
///
/// A session whose contact was deleted (or lost its password) is logged
/// out. A renamed contact gets its greeting name refreshed.
async fn current_user(state: &AppState, session: &AppSession) -> WebResult<Option<SessionUser>> {
    let Some(user) = session.user().await? else {
        return Ok(None);
    };

    match db::get_contact(&state.db, user.contact_id).await? {
        Some(contact) if contact.can_login() => {
            if contact.name != user.name {
                let refreshed = SessionUser {
                    contact_id: contact.id,
                    name: contact.name,
                };
                session.set_user(refreshed.clone()).await?;
                return Ok(Some(refreshed));
            }
            Ok(Some(user))
        }
        _ => {
            info!("Contact {} can no longer log in, ending session", user.contact_id);
            session.logout().await?;
            Ok(None)
        }
    }
}

/// Login gate for protected routes
///
/// Requests without a valid logged-in contact are redirected to `/login`
/// with a flash.
pub async fn require_login(
    State(state): State<AppState>,
    session: AppSession,
    request: Request,
    next: Next,
) -> Response {
    match current_user(&state, &session).await {
        Ok(Some(_)) => next.run(request).await,
        Ok(None) => {
            debug!("Unauthenticated request to {}", request.uri().path());
            match session
                .redirect_with_flash(FlashLevel::Info, "Faça login para continuar.", "/login")
                .await
            {
                Ok(redirect) => redirect.into_response(),
                Err(e) => {
                    warn!("Could not queue login flash: {}", e);
                    Redirect::to("/login").into_response()
                }
            }
        }
        Err(e) => e.into_response(),
    }
}
