//! Static asset routes
//!
//! The stylesheet and script are compiled into the binary.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};

use crate::AppState;

const AGENDA_CSS: &str = include_str!("../../static/agenda.css");
const AGENDA_JS: &str = include_str!("../../static/agenda.js");

/// GET /
pub async fn root_redirect() -> Redirect {
    Redirect::to("/contacts")
}

/// GET /static/agenda.css
pub async fn serve_agenda_css() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        AGENDA_CSS,
    )
        .into_response()
}

/// GET /static/agenda.js
pub async fn serve_agenda_js() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        AGENDA_JS,
    )
        .into_response()
}

pub fn ui_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root_redirect))
        .route("/static/agenda.css", get(serve_agenda_css))
        .route("/static/agenda.js", get(serve_agenda_js))
}
