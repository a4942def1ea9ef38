use crate::models::db_operations::ads_db_operations;
use crate::models::db_operations::stories_db_operations::{STORIES, STORY_META};
use redb::{CommitError, Database, StorageError, TableError, TransactionError};
use rusqlite::Connection;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
    #[error("Redb storage error: {0}")]
    RedbStorage(#[from] StorageError),
    #[error("Redb transaction error: {0}")]
    RedbTransaction(#[from] TransactionError),
    #[error("Redb table error: {0}")]
    RedbTable(#[from] TableError),
    #[error("Redb commit error: {0}")]
    RedbCommit(#[from] CommitError),
    #[error("Content database error: {0}")]
    Content(#[from] crate::models::db_operations::stories_db_operations::DbError),
}

/// Accounts plus per-profile tracking. The read and like logs are keyed by
/// (profile_id, story_id) so a story can only ever count once per profile.
pub fn setup_users_db(conn: &mut Connection) -> Result<(), SetupError> {
    let tx = conn.transaction()?;

    println!("- Creating 'users' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            display_name TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    println!("- Creating 'read_log' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS read_log (
            profile_id TEXT NOT NULL,
            story_id TEXT NOT NULL,
            read_at TEXT NOT NULL,
            PRIMARY KEY (profile_id, story_id)
        )",
        [],
    )?;

    println!("- Creating 'liked_log' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS liked_log (
            profile_id TEXT NOT NULL,
            story_id TEXT NOT NULL,
            PRIMARY KEY (profile_id, story_id)
        )",
        [],
    )?;

    tx.commit()?;
    Ok(())
}

/// Opens the content store's tables and seeds the default restaurant ads
/// when the ad table is empty.
pub fn setup_content_db(db: &Database) -> Result<(), SetupError> {
    let write_txn = db.begin_write()?;
    {
        println!("- Creating 'stories' table in Redb...");
        write_txn.open_table(STORIES)?;

        println!("- Creating 'story_meta' table in Redb...");
        write_txn.open_table(STORY_META)?;

        println!("- Creating 'ads' table in Redb...");
        write_txn.open_table(ads_db_operations::ADS)?;
    }
    write_txn.commit()?;

    if ads_db_operations::seed_default_ads(db)? {
        println!("- Seeded the default restaurant ads.");
    }
    Ok(())
}
