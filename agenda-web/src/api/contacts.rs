//! Contact pages and form handlers
//!
//! Every route here sits behind the login gate. Form submissions never
//! render directly: they queue a flash message and redirect (303), so a
//! browser refresh cannot resubmit.

use agenda_common::db::{self, Contact, ContactUpdate, NewContact};
use agenda_common::password::hash_password;
use agenda_common::validation::validate_password;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing::info;

use super::form::ContactSubmission;
use crate::error::{WebError, WebResult};
use crate::session::{AppSession, FlashLevel};
use crate::views::{self, ContactFormMode, ListMode};
use crate::AppState;

const LIST_PATH: &str = "/contacts";
const NEW_PATH: &str = "/contacts/new";

/// `?q=` on the list and search pages
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn edit_path(id: i64) -> String {
    format!("/contacts/{}/edit", id)
}

fn hash_if_present(raw: &str) -> WebResult<Option<String>> {
    match validate_password(raw)? {
        Some(plain) => Ok(Some(hash_password(&plain)?)),
        None => Ok(None),
    }
}

async fn render_list(
    state: &AppState,
    session: &AppSession,
    params: SearchParams,
    mode: ListMode,
) -> WebResult<Html<String>> {
    let query = params.q.unwrap_or_default();
    let contacts = db::search_contacts(&state.db, Some(&query)).await?;
    let ctx = session.page_context().await?;
    Ok(views::contact_list_page(&ctx, &contacts, &query, mode))
}

/// GET /contacts
pub async fn list_contacts(
    State(state): State<AppState>,
    session: AppSession,
    Query(params): Query<SearchParams>,
) -> WebResult<Html<String>> {
    render_list(&state, &session, params, ListMode::All).await
}

/// GET /contacts/search
pub async fn search_contacts(
    State(state): State<AppState>,
    session: AppSession,
    Query(params): Query<SearchParams>,
) -> WebResult<Html<String>> {
    render_list(&state, &session, params, ListMode::Search).await
}

/// GET /contacts/new
pub async fn new_contact_form(session: AppSession) -> WebResult<Html<String>> {
    let ctx = session.page_context().await?;
    Ok(views::contact_form_page(&ctx, ContactFormMode::Create))
}

/// Validate, store the photo and insert
///
/// The stored photo is removed again if the insert fails.
async fn insert_submission(state: &AppState, submission: ContactSubmission) -> WebResult<i64> {
    let details = submission.fields.validate(today())?;
    let password_hash = hash_if_present(&submission.password)?;

    let photo = match &submission.photo {
        Some(bytes) => Some(state.photos.save(bytes).await?),
        None => None,
    };

    let contact = NewContact {
        details,
        photo: photo.clone(),
        password_hash,
    };

    match db::insert_contact(&state.db, &contact).await {
        Ok(id) => Ok(id),
        Err(e) => {
            if let Some(path) = &photo {
                state.photos.remove_quietly(path).await;
            }
            Err(e.into())
        }
    }
}

/// POST /contacts
pub async fn create_contact(
    State(state): State<AppState>,
    session: AppSession,
    multipart: Multipart,
) -> WebResult<Redirect> {
    let result = match ContactSubmission::from_multipart(multipart).await {
        Ok(submission) => insert_submission(&state, submission).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(id) => {
            info!("Created contact {}", id);
            session
                .redirect_with_flash(FlashLevel::Success, "Contato cadastrado com sucesso.", LIST_PATH)
                .await
        }
        Err(e) => {
            e.log();
            session
                .redirect_with_flash(FlashLevel::Error, e.user_message(), NEW_PATH)
                .await
        }
    }
}

/// GET /contacts/:id/edit
pub async fn edit_contact_form(
    State(state): State<AppState>,
    session: AppSession,
    Path(id): Path<i64>,
) -> WebResult<Response> {
    let Some(contact) = db::get_contact(&state.db, id).await? else {
        return not_found(&session, id).await;
    };

    let ctx = session.page_context().await?;
    Ok(views::contact_form_page(&ctx, ContactFormMode::Edit(&contact)).into_response())
}

async fn not_found(session: &AppSession, id: i64) -> WebResult<Response> {
    let err = WebError::NotFound(format!("contact {}", id));
    err.log();
    let redirect = session
        .redirect_with_flash(FlashLevel::Error, err.user_message(), LIST_PATH)
        .await?;
    Ok(redirect.into_response())
}

/// Validate, store a new photo if one was sent and update the row
///
/// The previous photo is only deleted once the row points at the new one.
async fn apply_update(
    state: &AppState,
    existing: &Contact,
    submission: ContactSubmission,
) -> WebResult<()> {
    let details = submission.fields.validate(today())?;
    let password_hash = hash_if_present(&submission.password)?;

    let photo = match &submission.photo {
        Some(bytes) => Some(state.photos.save(bytes).await?),
        None => None,
    };

    let update = ContactUpdate {
        details,
        photo: photo.clone(),
        password_hash,
    };

    let updated = match db::update_contact(&state.db, existing.id, &update).await {
        Ok(updated) => updated,
        Err(e) => {
            if let Some(path) = &photo {
                state.photos.remove_quietly(path).await;
            }
            return Err(e.into());
        }
    };

    if !updated {
        if let Some(path) = &photo {
            state.photos.remove_quietly(path).await;
        }
        return Err(WebError::NotFound(format!("contact {}", existing.id)));
    }

    if let (Some(_), Some(old)) = (&photo, &existing.photo) {
        state.photos.remove_quietly(old).await;
    }
    Ok(())
}

/// POST /contacts/:id
pub async fn update_contact(
    State(state): State<AppState>,
    session: AppSession,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> WebResult<Response> {
    let Some(existing) = db::get_contact(&state.db, id).await? else {
        return not_found(&session, id).await;
    };

    let result = match ContactSubmission::from_multipart(multipart).await {
        Ok(submission) => apply_update(&state, &existing, submission).await,
        Err(e) => Err(e),
    };

    let redirect = match result {
        Ok(()) => {
            info!("Updated contact {}", id);
            session
                .redirect_with_flash(FlashLevel::Success, "Contato atualizado com sucesso.", LIST_PATH)
                .await?
        }
        Err(e) => {
            e.log();
            session
                .redirect_with_flash(FlashLevel::Error, e.user_message(), &edit_path(id))
                .await?
        }
    };
    Ok(redirect.into_response())
}

/// POST /contacts/:id/delete
///
/// Deleting an id that does not exist still redirects to the list.
/// Deleting your own contact ends the session.
pub async fn delete_contact(
    State(state): State<AppState>,
    session: AppSession,
    Path(id): Path<i64>,
) -> WebResult<Redirect> {
    match db::delete_contact(&state.db, id).await? {
        Some(contact) => {
            if let Some(path) = &contact.photo {
                state.photos.remove_quietly(path).await;
            }
            info!("Deleted contact {} ({})", contact.id, contact.email);

            let own_account = session
                .user()
                .await?
                .is_some_and(|user| user.contact_id == contact.id);
            if own_account {
                session.logout().await?;
                return session
                    .redirect_with_flash(
                        FlashLevel::Info,
                        "Sua conta foi excluída. Sessão encerrada.",
                        "/login",
                    )
                    .await;
            }

            session
                .redirect_with_flash(FlashLevel::Success, "Contato excluído com sucesso.", LIST_PATH)
                .await
        }
        None => {
            info!("Delete of contact {} ignored: no such contact", id);
            Ok(Redirect::to(LIST_PATH))
        }
    }
}

/// Build contact routes (login required)
pub fn contact_routes() -> Router<AppState> {
    Router::new()
        .route("/contacts", get(list_contacts).post(create_contact))
        .route("/contacts/search", get(search_contacts))
        .route("/contacts/new", get(new_contact_form))
        .route("/contacts/:id", post(update_contact))
        .route("/contacts/:id/edit", get(edit_contact_form))
        .route("/contacts/:id/delete", post(delete_contact))
}
