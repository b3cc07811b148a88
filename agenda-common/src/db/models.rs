//! Database models

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One row of the `contacts` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub cpf: Option<String>,
    /// Public path of the stored photo (`/uploads/<file>`)
    pub photo: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Contact {
    /// Contacts without a password cannot log in
    pub fn can_login(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// Validated, user-editable contact fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub cpf: Option<String>,
}

/// Insert payload
#[derive(Debug, Clone)]
pub struct NewContact {
    pub details: ContactDetails,
    pub photo: Option<String>,
    pub password_hash: Option<String>,
}

/// Update payload
///
/// `None` for `photo` or `password_hash` keeps the stored value.
#[derive(Debug, Clone)]
pub struct ContactUpdate {
    pub details: ContactDetails,
    pub photo: Option<String>,
    pub password_hash: Option<String>,
}
