//! Database initialization, models and queries

pub mod contacts;
pub mod init;
pub mod models;

pub use contacts::*;
pub use init::*;
pub use models::*;
