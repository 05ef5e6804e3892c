//! DuckDB repository implementation

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use duckdb::{params, Connection};

use crate::domain::result::{Error, Result};
use crate::domain::{
    Category, CategoryInfo, Savings, SavingsInput, Transaction, TransactionInput, User,
};
use crate::migrations::MIGRATIONS;
use crate::ports::Repository;
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

const TRANSACTION_SELECT: &str =
    "SELECT t.id, t.title, t.amount, t.type, t.category_id, c.name,
            t.date_added::VARCHAR, t.optional_notes, t.user_id
     FROM transactions t
     LEFT JOIN categories c ON c.id = t.category_id";

const SAVINGS_SELECT: &str =
    "SELECT id, amount, optional_notes, created_at::VARCHAR, user_id FROM savings";

const USER_SELECT: &str =
    "SELECT id, username, email, password_hash, created_at::VARCHAR FROM users";

impl From<duckdb::Error> for Error {
    fn from(err: duckdb::Error) -> Self {
        Error::Database(err.to_string())
    }
}

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
}

/// Check if an error message comes from a UNIQUE or PRIMARY KEY violation
fn is_unique_violation(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    lower.contains("duplicate key") || lower.contains("unique constraint")
}

/// DuckDB repository implementation
///
/// Each operation takes the connection guard for its own duration only; the
/// guard is dropped on every return path, including errors.
pub struct DuckDbRepository {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbRepository {
    /// Open (or create) a database file
    ///
    /// Retries with exponential backoff when the file is locked by another
    /// process.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut attempt = 0;
        loop {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        eprintln!(
                            "[fintrack] Database busy, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        thread::sleep(delay);
                        attempt += 1;
                        continue;
                    }
                    return Err(e);
                }
            }
        }
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory_with_flags(config)?),
            db_path: None,
        })
    }

    fn try_open_connection(db_path: &Path) -> Result<Connection> {
        // Extension autoloading stays off; nothing here needs extensions
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Ok(Connection::open_with_flags(db_path, config)?)
    }

    /// Path of the database file, `None` for in-memory databases
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }

    /// Run database migrations
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.conn()?;
        MigrationService::new(&conn, MIGRATIONS)
            .run_pending()
            .map_err(|e| Error::database(format!("Migration failed: {:#}", e)))
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> Result<()> {
        self.run_migrations()?;
        Ok(())
    }
}

/// Map "no rows" to `None`
fn optional<T>(result: duckdb::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn next_id(conn: &Connection, sequence: &str) -> Result<i64> {
    let id: i64 = conn.query_row(&format!("SELECT nextval('{}')", sequence), [], |row| {
        row.get(0)
    })?;
    Ok(id)
}

fn row_to_user(row: &duckdb::Row) -> duckdb::Result<User> {
    let created_str: String = row.get(4)?;
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: parse_date(4, &created_str)?,
    })
}

fn row_to_category(row: &duckdb::Row) -> duckdb::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        user_id: row.get(2)?,
    })
}

fn row_to_transaction(row: &duckdb::Row) -> duckdb::Result<Transaction> {
    // Columns: 0 id, 1 title, 2 amount, 3 type, 4 category_id, 5 category name,
    // 6 date_added, 7 optional_notes, 8 user_id
    let kind: String = row.get(3)?;
    let category_id: Option<i64> = row.get(4)?;
    let category_name: Option<String> = row.get(5)?;
    let date_str: String = row.get(6)?;

    Ok(Transaction {
        id: row.get(0)?,
        title: row.get(1)?,
        amount: row.get(2)?,
        // The CHECK constraint limits the column to the two known values
        kind: kind.parse().unwrap_or_default(),
        category: category_id
            .zip(category_name)
            .map(|(id, name)| CategoryInfo { id, name }),
        date_added: parse_date(6, &date_str)?,
        optional_notes: row.get(7)?,
        user_id: row.get(8)?,
    })
}

fn row_to_savings(row: &duckdb::Row) -> duckdb::Result<Savings> {
    let created_str: String = row.get(3)?;
    Ok(Savings {
        id: row.get(0)?,
        amount: row.get(1)?,
        optional_notes: row.get(2)?,
        created_at: parse_date(3, &created_str)?,
        user_id: row.get(4)?,
    })
}

fn select_transaction(conn: &Connection, id: i64) -> Result<Option<Transaction>> {
    let mut stmt = conn.prepare(&format!("{} WHERE t.id = ?", TRANSACTION_SELECT))?;
    optional(stmt.query_row([id], row_to_transaction))
}

fn select_savings(conn: &Connection, id: i64) -> Result<Option<Savings>> {
    let mut stmt = conn.prepare(&format!("{} WHERE id = ?", SAVINGS_SELECT))?;
    optional(stmt.query_row([id], row_to_savings))
}

#[async_trait]
impl Repository for DuckDbRepository {
    // === Users ===

    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        created_at: NaiveDate,
    ) -> Result<User> {
        let conn = self.conn()?;
        let id = next_id(&conn, "seq_users")?;
        conn.execute(
            "INSERT INTO users (id, username, email, password_hash, created_at)
             VALUES (?, ?, ?, ?, ?)",
            params![id, username, email, password_hash, created_at.to_string()],
        )
        .map_err(|e| {
            if is_unique_violation(&e.to_string()) {
                Error::validation(format!("username '{}' is already taken", username))
            } else {
                e.into()
            }
        })?;

        Ok(User {
            id,
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at,
        })
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{} WHERE username = ?", USER_SELECT))?;
        optional(stmt.query_row([username], row_to_user))
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{} WHERE id = ?", USER_SELECT))?;
        optional(stmt.query_row([id], row_to_user))
    }

    // === Categories ===

    async fn add_category(&self, user_id: i64, name: &str) -> Result<Category> {
        let conn = self.conn()?;
        let id = next_id(&conn, "seq_categories")?;
        conn.execute(
            "INSERT INTO categories (id, name, user_id) VALUES (?, ?, ?)",
            params![id, name, user_id],
        )?;

        Ok(Category {
            id,
            name: name.to_string(),
            user_id,
        })
    }

    async fn get_categories(&self, user_id: i64) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, name, user_id FROM categories WHERE user_id = ? ORDER BY id")?;
        let categories = stmt
            .query_map([user_id], row_to_category)?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(categories)
    }

    async fn get_category_by_id(&self, id: i64) -> Result<Option<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name, user_id FROM categories WHERE id = ?")?;
        optional(stmt.query_row([id], row_to_category))
    }

    /// Cascade-null: referencing transactions lose their category in the same
    /// database transaction that removes the category.
    async fn delete_category(&self, id: i64) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "UPDATE transactions SET category_id = NULL WHERE category_id = ?",
            params![id],
        )?;
        tx.execute("DELETE FROM categories WHERE id = ?", params![id])?;
        tx.commit()?;
        Ok(())
    }

    // === Transactions ===

    async fn add_transaction(
        &self,
        user_id: i64,
        input: &TransactionInput,
        date_added: NaiveDate,
    ) -> Result<Transaction> {
        let conn = self.conn()?;
        let id = next_id(&conn, "seq_transactions")?;
        conn.execute(
            "INSERT INTO transactions (id, title, amount, type, category_id, date_added, optional_notes, user_id)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                id,
                input.title,
                input.amount,
                input.kind.as_str(),
                input.category_id,
                date_added.to_string(),
                input.optional_notes,
                user_id,
            ],
        )?;

        select_transaction(&conn, id)?
            .ok_or_else(|| Error::database(format!("Transaction {} vanished after insert", id)))
    }

    async fn get_transactions(&self, user_id: i64) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE t.user_id = ? ORDER BY t.date_added, t.id",
            TRANSACTION_SELECT
        ))?;
        let transactions = stmt
            .query_map([user_id], row_to_transaction)?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(transactions)
    }

    async fn get_transactions_for_month(&self, user_id: i64, month: u32) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE t.user_id = ? AND month(t.date_added) = ? ORDER BY t.date_added, t.id",
            TRANSACTION_SELECT
        ))?;
        let transactions = stmt
            .query_map(params![user_id, month as i64], row_to_transaction)?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(transactions)
    }

    async fn get_transaction_by_id(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        select_transaction(&conn, id)
    }

    async fn delete_transaction(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM transactions WHERE id = ?", params![id])?;
        Ok(())
    }

    // === Savings ===

    async fn add_savings(
        &self,
        user_id: i64,
        input: &SavingsInput,
        created_at: NaiveDate,
    ) -> Result<Savings> {
        let conn = self.conn()?;
        let id = next_id(&conn, "seq_savings")?;
        conn.execute(
            "INSERT INTO savings (id, amount, optional_notes, created_at, user_id)
             VALUES (?, ?, ?, ?, ?)",
            params![
                id,
                input.amount,
                input.optional_notes,
                created_at.to_string(),
                user_id
            ],
        )?;

        Ok(Savings {
            id,
            amount: input.amount,
            optional_notes: input.optional_notes.clone(),
            created_at,
            user_id,
        })
    }

    async fn get_savings(&self, user_id: i64) -> Result<Vec<Savings>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare(&format!("{} WHERE user_id = ? ORDER BY created_at, id", SAVINGS_SELECT))?;
        let savings = stmt
            .query_map([user_id], row_to_savings)?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(savings)
    }

    async fn get_savings_by_id(&self, id: i64) -> Result<Option<Savings>> {
        let conn = self.conn()?;
        select_savings(&conn, id)
    }

    async fn update_savings(&self, savings: &Savings) -> Result<Savings> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE savings SET amount = ?, optional_notes = ? WHERE id = ?",
            params![savings.amount, savings.optional_notes, savings.id],
        )?;

        select_savings(&conn, savings.id)?
            .ok_or_else(|| Error::not_found(format!("Savings {}", savings.id)))
    }

    async fn delete_savings(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM savings WHERE id = ?", params![id])?;
        Ok(())
    }

    async fn total_savings(&self, user_id: i64) -> Result<i64> {
        let conn = self.conn()?;
        let total: i64 = conn.query_row(
            "SELECT CAST(COALESCE(SUM(amount), 0) AS BIGINT) FROM savings WHERE user_id = ?",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(total)
    }
}

// Helper functions

/// Parse a `::VARCHAR` date column, failing the row on bad data
fn parse_date(column: usize, s: &str) -> duckdb::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
        duckdb::Error::FromSqlConversionFailure(column, duckdb::types::Type::Text, Box::new(e))
    })
}
