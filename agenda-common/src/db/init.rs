//! Database initialization
//!
//! Opens (or creates) the SQLite file, applies connection pragmas and
//! creates the schema idempotently. Safe to call on every startup.

use super::{find_contact_by_email, insert_contact, ContactDetails, NewContact};
use crate::config::AdminConfig;
use crate::{password, validation, Result};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::{info, warn};

/// Schema version stamped into `schema_version`
///
/// Increment when the `contacts` layout changes.
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    apply_pragmas(&pool).await?;
    create_schema(&pool).await?;

    Ok(pool)
}

/// Open a private in-memory database with the full schema
///
/// Single connection: every pooled connection to `sqlite::memory:` would
/// otherwise see its own empty database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    create_schema(&pool).await?;
    Ok(pool)
}

async fn apply_pragmas(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    // WAL allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(pool).await?;

    Ok(())
}

/// Create all tables and indexes (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;
    create_contacts_table(pool).await?;
    stamp_schema_version(pool).await?;
    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the contacts table
///
/// `name_folded` holds the Unicode lower-cased name for case-insensitive
/// search; SQLite's own `lower()`/`LIKE` only fold ASCII.
async fn create_contacts_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contacts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            name_folded TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE COLLATE NOCASE,
            phone TEXT,
            birth_date TEXT,
            cpf TEXT UNIQUE,
            photo TEXT,
            password_hash TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_contacts_name_folded ON contacts(name_folded)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn stamp_schema_version(pool: &SqlitePool) -> Result<()> {
    let current: Option<i64> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    match current {
        None => {
            sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
                .bind(CURRENT_SCHEMA_VERSION)
                .execute(pool)
                .await?;
            info!("Schema version set to {}", CURRENT_SCHEMA_VERSION);
        }
        Some(v) if v > CURRENT_SCHEMA_VERSION => {
            warn!(
                "Database schema version {} is newer than this build ({})",
                v, CURRENT_SCHEMA_VERSION
            );
        }
        Some(_) => {}
    }

    Ok(())
}

/// Ensure the configured admin contact exists
///
/// Inserted with the configured password when no contact has that email.
/// An existing contact is never modified. Returns true if a row was inserted.
pub async fn ensure_admin_account(pool: &SqlitePool, admin: &AdminConfig) -> Result<bool> {
    let Some(plain) = admin.password.as_deref() else {
        return Ok(false);
    };

    let name = validation::normalize_name(&admin.name)?;
    let email = validation::normalize_email(&admin.email)?;

    if find_contact_by_email(pool, &email).await?.is_some() {
        return Ok(false);
    }

    let contact = NewContact {
        details: ContactDetails {
            name,
            email,
            phone: None,
            birth_date: None,
            cpf: None,
        },
        photo: None,
        password_hash: Some(password::hash_password(plain)?),
    };
    let id = insert_contact(pool, &contact).await?;

    info!("Created admin account {} (id {})", contact.details.email, id);
    Ok(true)
}
