//! Database access layer with connection pooling and migrations
//!
//! - `expenses` - expense storage and the [`crate::ExpenseRepository`] impl

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::calendar::{Clock, SystemClock};
use crate::error::{Error, Result};

mod expenses;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Environment variable for database encryption key
pub const DB_KEY_ENV: &str = "SPENT_DB_KEY";

/// Derive a SQLCipher key from a passphrase using Argon2id
///
/// The salt is fixed so a passphrase opens its database wherever the file lives.
fn derive_key(passphrase: &str) -> Result<String> {
    use argon2::{password_hash::SaltString, Argon2, PasswordHasher};

    // Changing this invalidates every existing encrypted database
    const APP_SALT: &[u8; 16] = b"spent-salt-v1-ok";

    let salt = SaltString::encode_b64(APP_SALT)
        .map_err(|e| Error::Encryption(format!("Failed to create salt: {}", e)))?;

    let hash = Argon2::default()
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| Error::Encryption(format!("Failed to derive key: {}", e)))?;

    let output = hash
        .hash
        .ok_or_else(|| Error::Encryption("No hash output".to_string()))?;
    Ok(hex::encode(output.as_bytes()))
}

/// Format a timestamp for storage
///
/// Fixed-width UTC RFC 3339 so that text order equals time order.
pub(crate) fn format_datetime(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp
pub(crate) fn parse_datetime(s: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
    /// Whether the database was opened with a SQLCipher key
    encrypted: bool,
    /// Supplies `created_at` for expenses inserted without one
    clock: Arc<dyn Clock + Send + Sync>,
    /// Directory removed once the last clone is dropped (`in_memory` only).
    /// Declared after `pool` so connections close before the files go.
    _scratch: Option<Arc<tempfile::TempDir>>,
}

impl Database {
    /// Open an encrypted database
    ///
    /// Requires the `SPENT_DB_KEY` environment variable. Use `new_unencrypted()`
    /// for a plain SQLite file.
    pub fn new(path: &str) -> Result<Self> {
        match std::env::var(DB_KEY_ENV).ok() {
            Some(key) => Self::new_with_key(path, Some(&key)),
            None => Err(Error::Encryption(format!(
                "Database encryption required. Set {} to your passphrase, \
                or use --no-encrypt for an unencrypted database.",
                DB_KEY_ENV
            ))),
        }
    }

    /// Open an unencrypted database
    pub fn new_unencrypted(path: &str) -> Result<Self> {
        Self::new_with_key(path, None)
    }

    /// Open a database with an explicit passphrase (or none)
    pub fn new_with_key(path: &str, passphrase: Option<&str>) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);

        let pool = if let Some(pass) = passphrase {
            let key_pragma = format!("PRAGMA key = 'x\"{}\"';", derive_key(pass)?);

            // Every pooled connection needs the key before its first query
            let manager = manager.with_init(move |conn| {
                conn.execute_batch(&key_pragma)?;
                Ok(())
            });

            Pool::builder().max_size(4).build(manager)?
        } else {
            Pool::builder().max_size(4).build(manager)?
        };

        let db = Self {
            pool,
            db_path: path.to_string(),
            encrypted: passphrase.is_some(),
            clock: Arc::new(SystemClock),
            _scratch: None,
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Create a throwaway database (for testing)
    ///
    /// Uses a file in a fresh temporary directory rather than `:memory:`
    /// because each pooled connection would otherwise see its own empty
    /// database. The directory, WAL files included, is deleted on drop.
    pub fn in_memory() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("spent_test_").tempdir()?;
        let path = dir.path().join("spent.db");
        let path = path.to_string_lossy().into_owned();

        let mut db = Self::new_unencrypted(&path)?;
        db._scratch = Some(Arc::new(dir));
        Ok(db)
    }

    /// Replace the clock used for default `created_at` values
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = clock;
        self
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Whether the database was opened with a SQLCipher key
    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            -- Expenses (immutable once written)
            CREATE TABLE IF NOT EXISTS expenses (
                id INTEGER PRIMARY KEY,
                owner_id TEXT NOT NULL CHECK (length(trim(owner_id)) > 0),
                cost TEXT NOT NULL,                        -- decimal string, e.g. "12.50"
                item TEXT NOT NULL CHECK (length(trim(item)) > 0),
                created_at TEXT NOT NULL                   -- UTC RFC 3339, fixed width
            );

            CREATE INDEX IF NOT EXISTS idx_expenses_owner_created ON expenses(owner_id, created_at);
            "#,
        )?;

        info!("Database schema initialized");
        Ok(())
    }
}
