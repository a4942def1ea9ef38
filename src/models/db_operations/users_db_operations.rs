use bcrypt::{hash, verify, BcryptError};
use chrono::Utc;
use rusqlite::{params, Connection, Error as RusqliteError, OptionalExtension};

/// A persisted account row. The role is intentionally absent: it is derived
/// from the email against the configured admin address at session time.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
}

fn bcrypt_to_rusqlite_error(e: BcryptError) -> RusqliteError {
    RusqliteError::ToSqlConversionFailure(Box::new(e))
}

/// Inserts an account and returns its id. Emails are stored lowercase so
/// lookups are case-insensitive; a duplicate email surfaces as the UNIQUE
/// constraint error.
pub fn create_user(
    conn: &Connection,
    email: &str,
    display_name: &str,
    password: &str,
) -> Result<i64, RusqliteError> {
    let hashed_password = hash(password, bcrypt::DEFAULT_COST).map_err(bcrypt_to_rusqlite_error)?;
    conn.execute(
        "INSERT INTO users (email, display_name, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            email.trim().to_lowercase(),
            display_name.trim(),
            hashed_password,
            Utc::now().to_rfc3339()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_user_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<StoredUser>, RusqliteError> {
    conn.query_row(
        "SELECT id, email, display_name, password_hash FROM users WHERE email = ?1",
        [email.trim().to_lowercase()],
        |row| {
            Ok(StoredUser {
                id: row.get(0)?,
                email: row.get(1)?,
                display_name: row.get(2)?,
                password_hash: row.get(3)?,
            })
        },
    )
    .optional()
}

pub fn verify_password(stored: &StoredUser, password: &str) -> bool {
    verify(password, &stored.password_hash).unwrap_or(false)
}

pub fn read_all_emails(conn: &Connection) -> Result<Vec<String>, RusqliteError> {
    let mut stmt = conn.prepare("SELECT email FROM users ORDER BY email")?;
    let rows = stmt.query_map([], |row| row.get(0))?;

    let mut emails = Vec::new();
    for email in rows {
        emails.push(email?);
    }
    Ok(emails)
}

pub fn update_password(
    conn: &Connection,
    email: &str,
    new_password: &str,
) -> Result<usize, RusqliteError> {
    let hashed_password =
        hash(new_password, bcrypt::DEFAULT_COST).map_err(bcrypt_to_rusqlite_error)?;
    conn.execute(
        "UPDATE users SET password_hash = ?1 WHERE email = ?2",
        params![hashed_password, email.trim().to_lowercase()],
    )
}
