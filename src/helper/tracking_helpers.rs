use crate::config::ContentConfig;
use crate::models::db_operations::stories_db_operations::{self, DbError};
use crate::models::db_operations::tracking_db_operations;
use redb::Database;
use rusqlite::Connection;

/// What one detail-page visit did to the counters.
#[derive(Debug)]
pub struct ViewOutcome {
    pub views: u64,
    pub read_count: u64,
    pub newly_read: bool,
    pub reward_code: Option<String>,
}

/// Records one story read: the per-story view counter always goes up by one,
/// while the profile's distinct-read count advances only the first time this
/// story id enters the read set.
pub fn record_view(
    content_db: &Database,
    conn: &Connection,
    profile_id: &str,
    story_id: &str,
    content: &ContentConfig,
) -> Result<ViewOutcome, DbError> {
    let views = stories_db_operations::increment_views(content_db, story_id)?;
    let newly_read = tracking_db_operations::record_read(conn, profile_id, story_id)?;
    let read_count = tracking_db_operations::read_count(conn, profile_id)?;

    Ok(ViewOutcome {
        views,
        read_count,
        newly_read,
        reward_code: reward_code(read_count, content),
    })
}

/// Flips the profile's like on a story and moves the per-story counter the
/// same direction. Returns the new liked state and the new like count.
pub fn toggle_like(
    content_db: &Database,
    conn: &Connection,
    profile_id: &str,
    story_id: &str,
) -> Result<(bool, u64), DbError> {
    let liked = tracking_db_operations::toggle_like(conn, profile_id, story_id)?;
    let delta = if liked { 1 } else { -1 };
    let likes = stories_db_operations::adjust_likes(content_db, story_id, delta)?;
    Ok((liked, likes))
}

/// Pure threshold check, recomputed on every call. There is deliberately no
/// stored "unlocked" flag to go stale.
pub fn reward_code(read_count: u64, content: &ContentConfig) -> Option<String> {
    if read_count >= content.reward_threshold {
        Some(content.reward_code.clone())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_config() -> ContentConfig {
        ContentConfig {
            free_story_limit: 4,
            reward_threshold: 20,
            reward_code: "BLISS-DRIVE-20".to_string(),
            ads_per_slot: 3,
        }
    }

    #[test]
    fn reward_is_visible_iff_count_reaches_threshold() {
        let cfg = content_config();
        assert_eq!(reward_code(0, &cfg), None);
        assert_eq!(reward_code(19, &cfg), None);
        assert_eq!(reward_code(20, &cfg), Some("BLISS-DRIVE-20".to_string()));
        assert_eq!(reward_code(57, &cfg), Some("BLISS-DRIVE-20".to_string()));
    }
}
