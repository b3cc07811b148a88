//! Contact repository
//!
//! Every statement is parameterized; user input never reaches SQL text.

use super::models::{Contact, ContactUpdate, NewContact};
use crate::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

const CONTACT_COLUMNS: &str = "id, name, email, phone, birth_date, cpf, photo, password_hash, created_at, updated_at";

fn contact_from_row(row: &SqliteRow) -> Result<Contact> {
    Ok(Contact {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        birth_date: row.try_get("birth_date")?,
        cpf: row.try_get("cpf")?,
        photo: row.try_get("photo")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// All contacts in insertion order
pub async fn list_contacts(pool: &SqlitePool) -> Result<Vec<Contact>> {
    let sql = format!("SELECT {} FROM contacts ORDER BY id", CONTACT_COLUMNS);
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    rows.iter().map(contact_from_row).collect()
}

/// Contacts whose name contains `term`, case-insensitively, in insertion order
///
/// A missing or blank term lists every contact.
pub async fn search_contacts(pool: &SqlitePool, term: Option<&str>) -> Result<Vec<Contact>> {
    let term = match term.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_lowercase(),
        _ => return list_contacts(pool).await,
    };

    // instr() matches literally, so '%' and '_' in the term need no escaping
    let sql = format!(
        "SELECT {} FROM contacts WHERE instr(name_folded, ?) > 0 ORDER BY id",
        CONTACT_COLUMNS
    );
    let rows = sqlx::query(&sql).bind(term).fetch_all(pool).await?;
    rows.iter().map(contact_from_row).collect()
}

pub async fn get_contact(pool: &SqlitePool, id: i64) -> Result<Option<Contact>> {
    let sql = format!("SELECT {} FROM contacts WHERE id = ?", CONTACT_COLUMNS);
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
    row.as_ref().map(contact_from_row).transpose()
}

/// Lookup used by login; `email` is compared case-insensitively
pub async fn find_contact_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Contact>> {
    let sql = format!("SELECT {} FROM contacts WHERE email = ?", CONTACT_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(email.trim().to_lowercase())
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(contact_from_row).transpose()
}

pub async fn count_contacts(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM contacts")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Insert a contact and return its new id
///
/// Duplicate email or CPF yields [`Error::Duplicate`].
pub async fn insert_contact(pool: &SqlitePool, contact: &NewContact) -> Result<i64> {
    let d = &contact.details;
    let result = sqlx::query(
        r#"
        INSERT INTO contacts (name, name_folded, email, phone, birth_date, cpf, photo, password_hash)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&d.name)
    .bind(d.name.to_lowercase())
    .bind(&d.email)
    .bind(&d.phone)
    .bind(d.birth_date)
    .bind(&d.cpf)
    .bind(&contact.photo)
    .bind(&contact.password_hash)
    .execute(pool)
    .await
    .map_err(Error::from_write)?;

    Ok(result.last_insert_rowid())
}

/// Update a contact in place
///
/// A `None` photo or password hash keeps the stored value. Returns false
/// when no contact has `id`.
pub async fn update_contact(pool: &SqlitePool, id: i64, update: &ContactUpdate) -> Result<bool> {
    let d = &update.details;
    let result = sqlx::query(
        r#"
        UPDATE contacts SET
            name = ?,
            name_folded = ?,
            email = ?,
            phone = ?,
            birth_date = ?,
            cpf = ?,
            photo = COALESCE(?, photo),
            password_hash = COALESCE(?, password_hash),
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(&d.name)
    .bind(d.name.to_lowercase())
    .bind(&d.email)
    .bind(&d.phone)
    .bind(d.birth_date)
    .bind(&d.cpf)
    .bind(&update.photo)
    .bind(&update.password_hash)
    .bind(id)
    .execute(pool)
    .await
    .map_err(Error::from_write)?;

    Ok(result.rows_affected() > 0)
}

/// Delete a contact, returning the removed row
///
/// `Ok(None)` when the id does not exist; deleting twice is not an error.
pub async fn delete_contact(pool: &SqlitePool, id: i64) -> Result<Option<Contact>> {
    let sql = format!("DELETE FROM contacts WHERE id = ? RETURNING {}", CONTACT_COLUMNS);
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
    row.as_ref().map(contact_from_row).transpose()
}
