//! Test helpers: throwaway app instance and a cookie-carrying client

#![allow(dead_code)]

use agenda_common::db::{init_database, insert_contact, ContactDetails, NewContact};
use agenda_common::password::hash_password;
use agenda_web::{build_router, AppState, PhotoStore, WebSettings};
use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use sqlx::SqlitePool;
use std::path::PathBuf;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

pub const SEED_EMAIL: &str = "ana@example.com";
pub const SEED_PASSWORD: &str = "segredo123";
pub const SEED_NAME: &str = "Ana Souza";

const BOUNDARY: &str = "agenda-test-boundary";

/// Smallest PNG header `infer` recognizes
pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
];

/// App instance backed by a temp root folder
///
/// TempDir must be kept alive for the duration of the test.
pub struct TestApp {
    pub _dir: TempDir,
    pub db: SqlitePool,
    pub uploads: PathBuf,
    pub client: TestClient,
    pub seed_id: i64,
}

impl TestApp {
    /// Fresh database with one contact that can log in
    pub async fn new() -> Self {
        Self::with_settings(WebSettings::default()).await
    }

    pub async fn with_settings(settings: WebSettings) -> Self {
        let dir = TempDir::new().unwrap();
        let db = init_database(&dir.path().join("agenda.db")).await.unwrap();
        let uploads = dir.path().join("uploads");
        std::fs::create_dir_all(&uploads).unwrap();

        let seed_id = insert_contact(
            &db,
            &NewContact {
                details: ContactDetails {
                    name: SEED_NAME.to_string(),
                    email: SEED_EMAIL.to_string(),
                    phone: None,
                    birth_date: None,
                    cpf: None,
                },
                photo: None,
                password_hash: Some(hash_password(SEED_PASSWORD).unwrap()),
            },
        )
        .await
        .unwrap();

        let state = AppState::new(
            db.clone(),
            PhotoStore::new(uploads.clone()),
            settings,
        );

        Self {
            _dir: dir,
            db,
            uploads,
            client: TestClient::new(build_router(state)),
            seed_id,
        }
    }

    /// New app with the client already logged in as the seeded contact
    pub async fn logged_in() -> Self {
        Self::logged_in_with(WebSettings::default()).await
    }

    pub async fn logged_in_with(settings: WebSettings) -> Self {
        let mut app = Self::with_settings(settings).await;
        let response = app.client.login(SEED_EMAIL, SEED_PASSWORD).await;
        assert_eq!(location(&response), "/contacts");
        // consume the welcome flash
        app.client.get("/contacts").await;
        app
    }
}

/// Router wrapper that replays the session cookie like a browser would
pub struct TestClient {
    app: Router,
    pub cookie: Option<String>,
}

impl TestClient {
    pub fn new(app: Router) -> Self {
        Self { app, cookie: None }
    }

    pub async fn send(&mut self, mut request: Request<Body>) -> Response<Body> {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.app.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie
                .to_str()
                .unwrap()
                .split(';')
                .next()
                .unwrap()
                .trim()
                .to_string();
            let empty = pair.ends_with('=');
            self.cookie = if empty { None } else { Some(pair) };
        }
        response
    }

    pub async fn get(&mut self, uri: &str) -> Response<Body> {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// GET and return the body as text
    pub async fn get_page(&mut self, uri: &str) -> String {
        let response = self.get(uri).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {}", uri);
        body_text(response).await
    }

    pub async fn post_empty(&mut self, uri: &str) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn post_form(&mut self, uri: &str, body: &str) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_multipart(
        &mut self,
        uri: &str,
        fields: &[(&str, &str)],
        photo: Option<&[u8]>,
    ) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(fields, photo)))
            .unwrap();
        self.send(request).await
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Response<Body> {
        let body = format!(
            "email={}&senha={}",
            email.replace('@', "%40"),
            password
        );
        self.post_form("/login", &body).await
    }
}

/// Contact form body; an absent photo is sent as an empty file field
pub fn multipart_body(fields: &[(&str, &str)], photo: Option<&[u8]>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }

    let (file_name, content) = match photo {
        Some(bytes) => ("foto.png", bytes),
        None => ("", &[][..]),
    };
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"foto\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            BOUNDARY, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// Fields for a valid contact
pub fn contact_fields<'a>(name: &'a str, email: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("nome", name),
        ("email", email),
        ("senha", ""),
        ("telefone", "11987654321"),
        ("data", "1990-03-21"),
        ("cpf", ""),
    ]
}

pub fn location(response: &Response<Body>) -> String {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect without Location")
        .to_str()
        .unwrap()
        .to_string()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Number of non-overlapping occurrences of `needle`
pub fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}
