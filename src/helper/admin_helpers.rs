use crate::models::db_operations::{ads_db_operations, stories_db_operations};
use crate::models::{Advertisement, Story, StoryMetadata, StoryStatus};
use actix_web::web;
use redb::Database;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdminHelperError {
    #[error("Content database error: {0}")]
    Content(#[from] stories_db_operations::DbError),
    #[error("R2D2 Pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("{0}")]
    Validation(String),
    #[error("Record not found")]
    NotFound,
}

/// Every story in the store, pending and rejected included, newest first.
pub fn fetch_all_stories(db: &web::Data<Database>) -> Result<Vec<Story>, AdminHelperError> {
    Ok(stories_db_operations::read_all_stories(db, None)?)
}

pub fn create_story(
    db: &web::Data<Database>,
    metadata: StoryMetadata,
    content: &str,
) -> Result<String, AdminHelperError> {
    validate_story_fields(&metadata.title, content)?;
    Ok(stories_db_operations::create_story(db, metadata, content)?)
}

pub fn update_story(
    db: &web::Data<Database>,
    story_id: &str,
    metadata: StoryMetadata,
    content: &str,
) -> Result<(), AdminHelperError> {
    validate_story_fields(&metadata.title, content)?;
    Ok(stories_db_operations::update_story(db, story_id, metadata, content)?)
}

pub fn delete_story(db: &web::Data<Database>, story_id: &str) -> Result<(), AdminHelperError> {
    Ok(stories_db_operations::delete_story(db, story_id)?)
}

pub fn approve_story(db: &web::Data<Database>, story_id: &str) -> Result<(), AdminHelperError> {
    Ok(stories_db_operations::set_story_status(db, story_id, StoryStatus::Approved)?)
}

/// Rejected submissions keep their record (and status) so the CMS can show
/// what was turned down; they are not deleted.
pub fn reject_story(db: &web::Data<Database>, story_id: &str) -> Result<(), AdminHelperError> {
    Ok(stories_db_operations::set_story_status(db, story_id, StoryStatus::Rejected)?)
}

fn validate_story_fields(title: &str, content: &str) -> Result<(), AdminHelperError> {
    if title.trim().is_empty() {
        return Err(AdminHelperError::Validation("Title is required.".to_string()));
    }
    if content.trim().is_empty() {
        return Err(AdminHelperError::Validation("Content is required.".to_string()));
    }
    Ok(())
}

pub fn fetch_all_ads(db: &web::Data<Database>) -> Result<Vec<Advertisement>, AdminHelperError> {
    Ok(ads_db_operations::read_all_ads(db)?)
}

pub fn create_ad(db: &web::Data<Database>, ad: Advertisement) -> Result<String, AdminHelperError> {
    validate_ad(&ad)?;
    Ok(ads_db_operations::create_ad(db, ad)?)
}

pub fn update_ad(
    db: &web::Data<Database>,
    ad_id: &str,
    ad: Advertisement,
) -> Result<(), AdminHelperError> {
    validate_ad(&ad)?;
    Ok(ads_db_operations::update_ad(db, ad_id, ad)?)
}

pub fn delete_ad(db: &web::Data<Database>, ad_id: &str) -> Result<(), AdminHelperError> {
    Ok(ads_db_operations::delete_ad(db, ad_id)?)
}

fn validate_ad(ad: &Advertisement) -> Result<(), AdminHelperError> {
    if ad.restaurant_name.trim().is_empty() {
        return Err(AdminHelperError::Validation(
            "Restaurant name is required.".to_string(),
        ));
    }
    if url::Url::parse(&ad.menu_link).is_err() {
        return Err(AdminHelperError::Validation(
            "The menu link must be a valid URL.".to_string(),
        ));
    }
    Ok(())
}
