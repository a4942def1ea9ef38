use crate::models::db_operations::{ads_db_operations, stories_db_operations};
use crate::models::db_operations::stories_db_operations::DbError;
use crate::models::{Advertisement, Story, StoryStatus};
use crate::AppState;
use actix_web::web;
use redb::Database;

/// Loads the approved story collection. A successful read refreshes the
/// last-known-good cache; a failed read is logged and answered from that
/// cache instead of surfacing an error to the visitor.
pub fn load_approved_stories(db: &web::Data<Database>, state: &web::Data<AppState>) -> Vec<Story> {
    match stories_db_operations::read_all_stories(db, Some(StoryStatus::Approved)) {
        Ok(stories) => {
            let mut cache = state.story_cache.write().unwrap_or_else(|poisoned| {
                log::error!("RwLock for story cache was poisoned! Recovering lock.");
                poisoned.into_inner()
            });
            *cache = stories.clone();
            stories
        }
        Err(e) => {
            log::error!("Failed to load stories, serving last-known cache: {}", e);
            let cache = state.story_cache.read().unwrap_or_else(|poisoned| {
                log::error!("RwLock for story cache was poisoned! Using stale data.");
                poisoned.into_inner()
            });
            cache.clone()
        }
    }
}

/// Reloads the collection after an accepted mutation and pushes the
/// replacement snapshot to change-feed subscribers. Reload failures only log;
/// the mutation itself has already been committed.
pub fn broadcast_content_change(db: &web::Data<Database>, state: &web::Data<AppState>) {
    match stories_db_operations::read_all_stories(db, Some(StoryStatus::Approved)) {
        Ok(stories) => {
            {
                let mut cache = state.story_cache.write().unwrap_or_else(|poisoned| {
                    log::error!("RwLock for story cache was poisoned! Recovering lock.");
                    poisoned.into_inner()
                });
                *cache = stories.clone();
            }
            state.change_feed.notify(&stories);
        }
        Err(e) => {
            log::error!("Failed to reload stories after a content change: {}", e);
        }
    }
}

pub fn fetch_story_by_id(id: &str, db: &web::Data<Database>) -> Option<Story> {
    stories_db_operations::read_story(db, id)
}

pub fn fetch_all_ads(db: &web::Data<Database>) -> Result<Vec<Advertisement>, DbError> {
    ads_db_operations::read_all_ads(db)
}

/// Files a visitor submission as a pending story awaiting admin review.
pub fn submit_story(
    db: &web::Data<Database>,
    metadata: crate::models::StoryMetadata,
    content: &str,
) -> Result<String, DbError> {
    stories_db_operations::create_story(db, metadata, content)
}
