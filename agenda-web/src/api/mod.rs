//! HTTP handlers for agenda-web

pub mod auth;
pub mod contacts;
pub mod form;
pub mod health;
pub mod ui;

pub use auth::auth_routes;
pub use contacts::contact_routes;
pub use health::health_routes;
pub use ui::ui_routes;
