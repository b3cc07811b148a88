//! Login and logoff
//!
//! Any contact with a password can log in with its email. Every failure
//! produces the same flash so the form does not reveal which emails exist.

use agenda_common::db::{self, Contact};
use agenda_common::password::verify_password;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::WebResult;
use crate::session::{AppSession, FlashLevel, SessionUser};
use crate::views;
use crate::AppState;

const LOGIN_FAILED: &str = "Email ou senha inválidos.";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub senha: String,
}

/// GET /login
///
/// Already logged-in users go straight to the list.
pub async fn login_page(session: AppSession) -> WebResult<Response> {
    if session.is_logged_in().await? {
        return Ok(Redirect::to("/contacts").into_response());
    }
    let ctx = session.page_context().await?;
    Ok(views::login_page(&ctx).into_response())
}

/// Contact matching the credentials, if any
async fn authenticate(state: &AppState, form: &LoginForm) -> WebResult<Option<Contact>> {
    let Some(contact) = db::find_contact_by_email(&state.db, &form.email).await? else {
        return Ok(None);
    };
    let verified = match contact.password_hash.as_deref() {
        Some(hash) => verify_password(&form.senha, hash)?,
        None => false,
    };
    Ok(verified.then_some(contact))
}

/// POST /login
pub async fn login_submit(
    State(state): State<AppState>,
    session: AppSession,
    Form(form): Form<LoginForm>,
) -> WebResult<Redirect> {
    match authenticate(&state, &form).await {
        Ok(Some(contact)) => {
            session
                .login(SessionUser {
                    contact_id: contact.id,
                    name: contact.name.clone(),
                })
                .await?;
            info!("Contact {} logged in", contact.id);
            session
                .redirect_with_flash(
                    FlashLevel::Success,
                    format!("Olá {}, bem-vindo de volta!", contact.name),
                    "/contacts",
                )
                .await
        }
        Ok(None) => {
            warn!("Failed login for {:?}", form.email.trim());
            session
                .redirect_with_flash(FlashLevel::Error, LOGIN_FAILED, "/login")
                .await
        }
        Err(e) => {
            e.log();
            session
                .redirect_with_flash(FlashLevel::Error, e.user_message(), "/login")
                .await
        }
    }
}

/// GET|POST /logout
pub async fn logout(session: AppSession) -> WebResult<Redirect> {
    if let Some(user) = session.user().await? {
        info!("Contact {} logged out", user.contact_id);
    }
    session.logout().await?;
    session
        .redirect_with_flash(FlashLevel::Info, "Sessão encerrada.", "/login")
        .await
}

/// Build login/logoff routes (public)
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login_submit))
        .route("/logout", get(logout).post(logout))
}
