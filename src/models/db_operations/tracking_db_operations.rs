use chrono::Utc;
use rusqlite::{params, Connection, Error as RusqliteError};

/// Adds a story to the profile's read set. Returns true only when the story
/// was not in the set yet, i.e. exactly once per (profile, story) pair no
/// matter how many times the detail page is visited.
pub fn record_read(
    conn: &Connection,
    profile_id: &str,
    story_id: &str,
) -> Result<bool, RusqliteError> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO read_log (profile_id, story_id, read_at) VALUES (?1, ?2, ?3)",
        params![profile_id, story_id, Utc::now().to_rfc3339()],
    )?;
    Ok(inserted > 0)
}

/// Distinct stories this profile has read. Derived from the read set itself
/// so the counter can never drift from it.
pub fn read_count(conn: &Connection, profile_id: &str) -> Result<u64, RusqliteError> {
    conn.query_row(
        "SELECT COUNT(*) FROM read_log WHERE profile_id = ?1",
        [profile_id],
        |row| row.get::<_, i64>(0),
    )
    .map(|n| n.max(0) as u64)
}

/// Flips the profile's like for a story. Returns true when the story is now
/// liked, false when the like was removed.
pub fn toggle_like(
    conn: &Connection,
    profile_id: &str,
    story_id: &str,
) -> Result<bool, RusqliteError> {
    let removed = conn.execute(
        "DELETE FROM liked_log WHERE profile_id = ?1 AND story_id = ?2",
        params![profile_id, story_id],
    )?;
    if removed > 0 {
        return Ok(false);
    }
    conn.execute(
        "INSERT INTO liked_log (profile_id, story_id) VALUES (?1, ?2)",
        params![profile_id, story_id],
    )?;
    Ok(true)
}

pub fn is_liked(conn: &Connection, profile_id: &str, story_id: &str) -> bool {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM liked_log WHERE profile_id = ?1 AND story_id = ?2)",
        params![profile_id, story_id],
        |row| row.get(0),
    )
    .unwrap_or(false)
}
