use crate::models::{Story, StoryMetadata, StoryStatus};
use chrono::Utc;
use redb::{
    CommitError, Database, ReadableTable, StorageError, TableDefinition, TableError,
    TransactionError,
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Redb storage error: {0}")]
    RedbStorage(#[from] StorageError),
    #[error("Redb transaction error: {0}")]
    RedbTransaction(#[from] TransactionError),
    #[error("Redb table error: {0}")]
    RedbTable(#[from] TableError),
    #[error("Redb commit error: {0}")]
    RedbCommit(#[from] CommitError),
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("UUID parse error: {0}")]
    Uuid(#[from] uuid::Error),
    #[error("Item not found in database: {0}")]
    NotFound(String),
}

// Content body and metadata live in separate tables keyed by the UUID bytes;
// metadata is a JSON blob so listing reads never touch the (larger) body.
pub const STORIES: TableDefinition<&[u8; 16], &str> = TableDefinition::new("stories");
pub const STORY_META: TableDefinition<&[u8; 16], &str> = TableDefinition::new("story_meta");

/// Creates a story. Counters and creation time are owned by the store: a new
/// record always starts at zero views/likes and `now`.
pub fn create_story(
    db: &Database,
    mut metadata: StoryMetadata,
    content: &str,
) -> Result<String, DbError> {
    let story_uuid = Uuid::new_v4();
    metadata.created_at = Utc::now();
    metadata.views = 0;
    metadata.likes = 0;

    let metadata_json = serde_json::to_string(&metadata)?;

    let write_txn = db.begin_write()?;
    {
        let mut stories_table = write_txn.open_table(STORIES)?;
        let mut meta_table = write_txn.open_table(STORY_META)?;

        let story_id_bytes = story_uuid.into_bytes();
        stories_table.insert(&story_id_bytes, content)?;
        meta_table.insert(&story_id_bytes, metadata_json.as_str())?;
    }
    write_txn.commit()?;

    Ok(story_uuid.to_string())
}

pub fn read_story(db: &Database, id: &str) -> Option<Story> {
    let story_uuid = Uuid::parse_str(id).ok()?;
    let story_id_bytes = story_uuid.into_bytes();

    let read_txn = db.begin_read().ok()?;
    let stories_table = read_txn.open_table(STORIES).ok()?;
    let meta_table = read_txn.open_table(STORY_META).ok()?;

    if let Some(content_guard) = stories_table.get(&story_id_bytes).ok().flatten() {
        if let Some(meta_guard) = meta_table.get(&story_id_bytes).ok().flatten() {
            let content = content_guard.value().to_string();
            if let Ok(metadata) = serde_json::from_str(meta_guard.value()) {
                return Some(Story {
                    id: id.to_string(),
                    metadata,
                    content,
                });
            }
        }
    }
    None
}

/// Replaces a story's editable fields. Creation time and both counters are
/// preserved from the stored record.
pub fn update_story(
    db: &Database,
    story_id: &str,
    new_metadata: StoryMetadata,
    content: &str,
) -> Result<(), DbError> {
    let story_uuid = Uuid::parse_str(story_id)?;
    let story_id_bytes = story_uuid.into_bytes();

    let write_txn = db.begin_write()?;
    {
        let mut stories_table = write_txn.open_table(STORIES)?;
        let mut meta_table = write_txn.open_table(STORY_META)?;

        let old_meta: StoryMetadata = {
            let guard = meta_table
                .get(&story_id_bytes)?
                .ok_or_else(|| DbError::NotFound(story_id.to_string()))?;
            serde_json::from_str(guard.value())?
        };

        let merged = StoryMetadata {
            created_at: old_meta.created_at,
            views: old_meta.views,
            likes: old_meta.likes,
            ..new_metadata
        };
        let meta_json = serde_json::to_string(&merged)?;

        stories_table.insert(&story_id_bytes, content)?;
        meta_table.insert(&story_id_bytes, meta_json.as_str())?;
    }
    write_txn.commit()?;
    Ok(())
}

pub fn delete_story(db: &Database, story_id: &str) -> Result<(), DbError> {
    let story_uuid = Uuid::parse_str(story_id)?;
    let story_id_bytes = story_uuid.into_bytes();

    let write_txn = db.begin_write()?;
    {
        let mut stories_table = write_txn.open_table(STORIES)?;
        let mut meta_table = write_txn.open_table(STORY_META)?;

        // Removing an already-absent story is fine, we just want it gone.
        stories_table.remove(&story_id_bytes)?;
        meta_table.remove(&story_id_bytes)?;
    }
    write_txn.commit()?;
    Ok(())
}

pub fn set_story_status(db: &Database, story_id: &str, status: StoryStatus) -> Result<(), DbError> {
    mutate_metadata(db, story_id, |meta| {
        meta.status = status;
        0
    })?;
    Ok(())
}

/// Unconditionally adds one view and returns the new view count. Whether this
/// read also advances the profile's read counter is decided by the tracking
/// layer, not here.
pub fn increment_views(db: &Database, story_id: &str) -> Result<u64, DbError> {
    mutate_metadata(db, story_id, |meta| {
        meta.views += 1;
        meta.views
    })
}

/// Applies a like delta, clamped so the count never goes below zero, and
/// returns the new like count.
pub fn adjust_likes(db: &Database, story_id: &str, delta: i64) -> Result<u64, DbError> {
    mutate_metadata(db, story_id, |meta| {
        meta.likes = if delta.is_negative() {
            meta.likes.saturating_sub(delta.unsigned_abs())
        } else {
            meta.likes + delta as u64
        };
        meta.likes
    })
}

fn mutate_metadata<F>(db: &Database, story_id: &str, apply: F) -> Result<u64, DbError>
where
    F: FnOnce(&mut StoryMetadata) -> u64,
{
    let story_uuid = Uuid::parse_str(story_id)?;
    let story_id_bytes = story_uuid.into_bytes();

    let counter;
    let write_txn = db.begin_write()?;
    {
        let mut meta_table = write_txn.open_table(STORY_META)?;

        let mut meta: StoryMetadata = {
            let guard = meta_table
                .get(&story_id_bytes)?
                .ok_or_else(|| DbError::NotFound(story_id.to_string()))?;
            serde_json::from_str(guard.value())?
        };

        counter = apply(&mut meta);

        let meta_json = serde_json::to_string(&meta)?;
        meta_table.insert(&story_id_bytes, meta_json.as_str())?;
    }
    write_txn.commit()?;
    Ok(counter)
}

/// Reads the full collection, optionally restricted to one status, newest
/// first. The collection is small enough that an in-memory sort beats
/// maintaining a chronological index.
pub fn read_all_stories(
    db: &Database,
    status: Option<StoryStatus>,
) -> Result<Vec<Story>, DbError> {
    let read_txn = db.begin_read()?;
    let stories_table = read_txn.open_table(STORIES)?;
    let meta_table = read_txn.open_table(STORY_META)?;

    let mut stories: Vec<Story> = meta_table
        .iter()?
        .filter_map(|res| res.ok())
        .filter_map(|(id_bytes, meta_str)| {
            let story_uuid = Uuid::from_bytes(*id_bytes.value());
            let metadata: StoryMetadata = serde_json::from_str(meta_str.value()).ok()?;
            if let Some(wanted) = status {
                if metadata.status != wanted {
                    return None;
                }
            }
            let content = stories_table
                .get(id_bytes.value())
                .ok()
                .flatten()
                .map(|g| g.value().to_string())
                .unwrap_or_default();
            Some(Story {
                id: story_uuid.to_string(),
                metadata,
                content,
            })
        })
        .collect();

    stories.sort_by(|a, b| b.metadata.created_at.cmp(&a.metadata.created_at));
    Ok(stories)
}
