//! Integration tests for the contact pages
//!
//! Tests cover:
//! - Login gate on protected pages
//! - Create, list, search, update and delete through the HTTP handlers
//! - Flash messages rendered exactly once
//! - Photo upload lifecycle on disk

mod helpers;

use agenda_common::db::{self, count_contacts, find_contact_by_email, get_contact};
use agenda_web::WebSettings;
use axum::http::StatusCode;
use helpers::*;

// =============================================================================
// Login gate
// =============================================================================

#[tokio::test]
async fn test_protected_pages_redirect_to_login() {
    let mut app = TestApp::new().await;

    for uri in ["/contacts", "/contacts/search?q=a", "/contacts/new", "/contacts/1/edit"] {
        let response = app.client.get(uri).await;
        assert_eq!(location(&response), "/login", "GET {}", uri);
    }

    let response = app.client.post_empty("/contacts/1/delete").await;
    assert_eq!(location(&response), "/login");
    assert_eq!(count_contacts(&app.db).await.unwrap(), 1);

    let page = app.client.get_page("/login").await;
    assert!(page.contains("Faça login para continuar."));
}

#[tokio::test]
async fn test_deleting_own_account_ends_session() {
    let mut app = TestApp::logged_in().await;

    let response = app
        .client
        .post_empty(&format!("/contacts/{}/delete", app.seed_id))
        .await;
    assert_eq!(location(&response), "/login");
    assert_eq!(count_contacts(&app.db).await.unwrap(), 0);

    let page = app.client.get_page("/login").await;
    assert!(page.contains("Sua conta foi excluída. Sessão encerrada."));
    assert!(!page.contains(SEED_NAME));

    let response = app.client.get("/contacts/new").await;
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_session_ends_when_contact_disappears() {
    let mut app = TestApp::logged_in().await;

    // removed outside this session
    db::delete_contact(&app.db, app.seed_id).await.unwrap();

    let response = app.client.get("/contacts/new").await;
    assert_eq!(location(&response), "/login");

    let page = app.client.get_page("/login").await;
    assert!(page.contains("Faça login para continuar."));
    assert!(!page.contains(r#"href="/logout""#));
}

#[tokio::test]
async fn test_session_ends_when_password_is_removed() {
    let mut app = TestApp::logged_in().await;

    sqlx::query("UPDATE contacts SET password_hash = NULL WHERE id = ?")
        .bind(app.seed_id)
        .execute(&app.db)
        .await
        .unwrap();

    let response = app.client.get("/contacts").await;
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_renaming_own_contact_updates_greeting() {
    let mut app = TestApp::logged_in().await;

    let fields = contact_fields("Ana Souza Lima", SEED_EMAIL);
    let response = app
        .client
        .post_multipart(&format!("/contacts/{}", app.seed_id), &fields, None)
        .await;
    assert_eq!(location(&response), "/contacts");

    let page = app.client.get_page("/contacts").await;
    assert!(page.contains("Olá Ana Souza Lima, bem-vindo de volta!"));

    // password was left blank, so it still works
    app.client.get("/logout").await;
    let response = app.client.login(SEED_EMAIL, SEED_PASSWORD).await;
    assert_eq!(location(&response), "/contacts");
}

#[tokio::test]
async fn test_root_redirects_to_list() {
    let mut app = TestApp::new().await;
    let response = app.client.get("/").await;
    assert_eq!(location(&response), "/contacts");
}

// =============================================================================
// Create and list
// =============================================================================

#[tokio::test]
async fn test_create_then_list_shows_contact_once() {
    let mut app = TestApp::logged_in().await;

    let fields = contact_fields("Bruno Lima", "bruno@example.com");
    let response = app.client.post_multipart("/contacts", &fields, None).await;
    assert_eq!(location(&response), "/contacts");

    let page = app.client.get_page("/contacts").await;
    assert_eq!(count(&page, "Nome: Bruno Lima"), 1);
    assert!(page.contains("Telefone: (11)98765-4321"));
    assert!(page.contains("Data/Nasc: 21/03/1990"));
    assert!(page.contains("Contato cadastrado com sucesso."));

    let stored = find_contact_by_email(&app.db, "bruno@example.com")
        .await
        .unwrap()
        .expect("contact should be stored");
    assert!(stored.photo.is_none());
    assert!(stored.password_hash.is_none());
}

#[tokio::test]
async fn test_flash_is_shown_exactly_once() {
    let mut app = TestApp::logged_in().await;

    let fields = contact_fields("Carla Dias", "carla@example.com");
    app.client.post_multipart("/contacts", &fields, None).await;

    let first = app.client.get_page("/contacts").await;
    assert!(first.contains(r#"<p class="alert alert-success">Contato cadastrado com sucesso.</p>"#));

    let second = app.client.get_page("/contacts").await;
    assert!(!second.contains("Contato cadastrado com sucesso."));
    assert!(!second.contains(r#"class="alert"#));
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let mut app = TestApp::logged_in().await;

    let fields = contact_fields("Outra Ana", "ANA@example.com");
    let response = app.client.post_multipart("/contacts", &fields, None).await;
    assert_eq!(location(&response), "/contacts/new");

    let page = app.client.get_page("/contacts/new").await;
    assert!(page.contains("Já existe um contato com este email."));
    assert_eq!(count_contacts(&app.db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_invalid_fields_are_rejected_with_flash() {
    let mut app = TestApp::logged_in().await;

    let mut fields = contact_fields("Davi Reis", "davi@example.com");
    fields.push(("cpf", "123.456.789-00"));
    let response = app.client.post_multipart("/contacts", &fields, None).await;
    assert_eq!(location(&response), "/contacts/new");
    let page = app.client.get_page("/contacts/new").await;
    assert!(page.contains("alert-error"));
    assert!(page.contains("CPF"));

    let fields = contact_fields("", "vazio@example.com");
    let response = app.client.post_multipart("/contacts", &fields, None).await;
    assert_eq!(location(&response), "/contacts/new");
    let page = app.client.get_page("/contacts/new").await;
    assert!(page.contains("alert-error"));

    assert_eq!(count_contacts(&app.db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_non_image_upload_is_rejected_and_nothing_stored() {
    let mut app = TestApp::logged_in().await;

    let fields = contact_fields("Eva Rocha", "eva@example.com");
    let response = app
        .client
        .post_multipart("/contacts", &fields, Some(&b"definitely not an image"[..]))
        .await;
    assert_eq!(location(&response), "/contacts/new");

    let page = app.client.get_page("/contacts/new").await;
    assert!(page.contains("A foto deve ser uma imagem JPEG, PNG, GIF ou WebP."));
    assert_eq!(std::fs::read_dir(&app.uploads).unwrap().count(), 0);
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let settings = WebSettings {
        max_upload_bytes: 1024,
        ..WebSettings::default()
    };
    let mut app = TestApp::logged_in_with(settings).await;

    // well past the cap plus the allowance for text fields
    let mut photo = PNG_BYTES.to_vec();
    photo.resize(256 * 1024, 0);

    let fields = contact_fields("Gil Prado", "gil@example.com");
    let response = app
        .client
        .post_multipart("/contacts", &fields, Some(photo.as_slice()))
        .await;
    assert_eq!(location(&response), "/contacts/new");

    let page = app.client.get_page("/contacts/new").await;
    assert!(page.contains("A foto excede o tamanho máximo permitido."));
    assert_eq!(count_contacts(&app.db).await.unwrap(), 1);
    assert_eq!(std::fs::read_dir(&app.uploads).unwrap().count(), 0);
}

#[tokio::test]
async fn test_failed_insert_removes_stored_photo() {
    let mut app = TestApp::logged_in().await;

    // duplicate email fails after the photo was written
    let fields = contact_fields("Ana Duplicada", SEED_EMAIL);
    let response = app
        .client
        .post_multipart("/contacts", &fields, Some(PNG_BYTES))
        .await;
    assert_eq!(location(&response), "/contacts/new");
    assert_eq!(std::fs::read_dir(&app.uploads).unwrap().count(), 0);
}

#[tokio::test]
async fn test_user_values_are_escaped() {
    let mut app = TestApp::logged_in().await;

    let fields = contact_fields("<script>alert(1)</script>", "xss@example.com");
    app.client.post_multipart("/contacts", &fields, None).await;

    let page = app.client.get_page("/contacts").await;
    assert!(page.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(!page.contains("<script>alert(1)</script>"));
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_search_hit_and_miss() {
    let mut app = TestApp::logged_in().await;
    let fields = contact_fields("Bruno Lima", "bruno@example.com");
    app.client.post_multipart("/contacts", &fields, None).await;
    app.client.get("/contacts").await;

    let page = app.client.get_page("/contacts/search?q=BRU").await;
    assert!(page.contains("Nome: Bruno Lima"));
    assert!(!page.contains(&format!("Nome: {}", SEED_NAME)));

    let page = app.client.get_page("/contacts?q=lim").await;
    assert!(page.contains("Nome: Bruno Lima"));

    let page = app.client.get_page("/contacts/search?q=zzz").await;
    assert!(!page.contains("Nome: "));
    assert!(page.contains("Nenhum contato encontrado"));
}

#[tokio::test]
async fn test_blank_search_lists_everything() {
    let mut app = TestApp::logged_in().await;
    let fields = contact_fields("Bruno Lima", "bruno@example.com");
    app.client.post_multipart("/contacts", &fields, None).await;
    app.client.get("/contacts").await;

    let page = app.client.get_page("/contacts/search?q=%20%20").await;
    assert_eq!(count(&page, "Nome: "), 2);

    // insertion order
    let first = page.find(&format!("Nome: {}", SEED_NAME)).unwrap();
    let second = page.find("Nome: Bruno Lima").unwrap();
    assert!(first < second);
}

// =============================================================================
// Update
// =============================================================================

async fn create_with_photo(app: &mut TestApp) -> (i64, String) {
    let fields = contact_fields("Fabio Melo", "fabio@example.com");
    let response = app
        .client
        .post_multipart("/contacts", &fields, Some(PNG_BYTES))
        .await;
    assert_eq!(location(&response), "/contacts");
    app.client.get("/contacts").await;

    let contact = find_contact_by_email(&app.db, "fabio@example.com")
        .await
        .unwrap()
        .unwrap();
    let photo = contact.photo.expect("photo should be stored");
    (contact.id, photo)
}

fn photo_file(app: &TestApp, public: &str) -> std::path::PathBuf {
    app.uploads.join(public.trim_start_matches("/uploads/"))
}

#[tokio::test]
async fn test_uploaded_photo_is_served() {
    let mut app = TestApp::logged_in().await;
    let (_, photo) = create_with_photo(&mut app).await;

    let response = app.client.get(&photo).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], PNG_BYTES);
}

#[tokio::test]
async fn test_update_without_upload_keeps_photo() {
    let mut app = TestApp::logged_in().await;
    let (id, photo) = create_with_photo(&mut app).await;

    let fields = contact_fields("Fabio Melo Junior", "fabio@example.com");
    let response = app
        .client
        .post_multipart(&format!("/contacts/{}", id), &fields, None)
        .await;
    assert_eq!(location(&response), "/contacts");

    let contact = get_contact(&app.db, id).await.unwrap().unwrap();
    assert_eq!(contact.name, "Fabio Melo Junior");
    assert_eq!(contact.photo.as_deref(), Some(photo.as_str()));
    assert!(photo_file(&app, &photo).exists());

    let page = app.client.get_page("/contacts").await;
    assert!(page.contains("Contato atualizado com sucesso."));
}

#[tokio::test]
async fn test_update_with_new_photo_replaces_old_file() {
    let mut app = TestApp::logged_in().await;
    let (id, old_photo) = create_with_photo(&mut app).await;

    let fields = contact_fields("Fabio Melo", "fabio@example.com");
    app.client
        .post_multipart(&format!("/contacts/{}", id), &fields, Some(PNG_BYTES))
        .await;

    let contact = get_contact(&app.db, id).await.unwrap().unwrap();
    let new_photo = contact.photo.unwrap();
    assert_ne!(new_photo, old_photo);
    assert!(photo_file(&app, &new_photo).exists());
    assert!(!photo_file(&app, &old_photo).exists());
}

#[tokio::test]
async fn test_failed_update_redirects_back_to_edit_form() {
    let mut app = TestApp::logged_in().await;
    let (id, photo) = create_with_photo(&mut app).await;

    let fields = contact_fields("Fabio Melo", SEED_EMAIL);
    let response = app
        .client
        .post_multipart(&format!("/contacts/{}", id), &fields, None)
        .await;
    let edit = format!("/contacts/{}/edit", id);
    assert_eq!(location(&response), edit);

    let page = app.client.get_page(&edit).await;
    assert!(page.contains("Já existe um contato com este email."));
    assert!(page.contains(r#"value="fabio@example.com""#));

    let contact = get_contact(&app.db, id).await.unwrap().unwrap();
    assert_eq!(contact.email, "fabio@example.com");
    assert_eq!(contact.photo.as_deref(), Some(photo.as_str()));
}

#[tokio::test]
async fn test_edit_missing_contact_redirects_with_flash() {
    let mut app = TestApp::logged_in().await;

    let response = app.client.get("/contacts/999/edit").await;
    assert_eq!(location(&response), "/contacts");

    let page = app.client.get_page("/contacts").await;
    assert!(page.contains("Contato não encontrado."));

    let fields = contact_fields("Ninguem", "ninguem@example.com");
    let response = app
        .client
        .post_multipart("/contacts/999", &fields, None)
        .await;
    assert_eq!(location(&response), "/contacts");
    assert_eq!(count_contacts(&app.db).await.unwrap(), 1);
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_removes_contact_and_photo() {
    let mut app = TestApp::logged_in().await;
    let (id, photo) = create_with_photo(&mut app).await;

    let response = app
        .client
        .post_empty(&format!("/contacts/{}/delete", id))
        .await;
    assert_eq!(location(&response), "/contacts");

    let page = app.client.get_page("/contacts").await;
    assert!(page.contains("Contato excluído com sucesso."));
    assert!(!page.contains("Nome: Fabio Melo"));
    assert!(get_contact(&app.db, id).await.unwrap().is_none());
    assert!(!photo_file(&app, &photo).exists());
}

#[tokio::test]
async fn test_delete_missing_contact_is_noop() {
    let mut app = TestApp::logged_in().await;

    let response = app.client.post_empty("/contacts/999/delete").await;
    assert_eq!(location(&response), "/contacts");

    let page = app.client.get_page("/contacts").await;
    assert!(!page.contains("alert-error"));
    assert_eq!(count_contacts(&app.db).await.unwrap(), 1);
}
