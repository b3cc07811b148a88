//! # Agenda Common Library
//!
//! Shared code for the Agenda contact manager:
//! - Error type
//! - Bootstrap configuration and root folder resolution
//! - Database initialization and the contact repository
//! - Password hashing
//! - Contact field validation and normalization

pub mod config;
pub mod db;
pub mod error;
pub mod password;
pub mod validation;

pub use error::{Error, Result};
