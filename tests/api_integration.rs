use blissdrive_backend::config::ContentConfig;
use blissdrive_backend::helper::tracking_helpers;
use blissdrive_backend::models::db_operations::{
    ads_db_operations, stories_db_operations, tracking_db_operations, users_db_operations,
};
use blissdrive_backend::models::{Category, StoryMetadata, StoryStatus};
use blissdrive_backend::setup::db_setup;
use blissdrive_backend::{AppState, ChangeFeed};
use redb::Database;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn content_db() -> (TempDir, Database) {
    let dir = TempDir::new().expect("temp dir");
    let db = Database::create(dir.path().join("content.db")).expect("content db");
    db_setup::setup_content_db(&db).expect("content setup");
    (dir, db)
}

fn users_conn() -> Connection {
    let mut conn = Connection::open_in_memory().expect("sqlite");
    db_setup::setup_users_db(&mut conn).expect("users setup");
    conn
}

fn content_config() -> ContentConfig {
    ContentConfig {
        free_story_limit: 4,
        reward_threshold: 20,
        reward_code: "BLISS-DRIVE-20".to_string(),
        ads_per_slot: 3,
    }
}

fn metadata(title: &str) -> StoryMetadata {
    StoryMetadata {
        title: title.to_string(),
        category: Category::RoadTestTips,
        status: StoryStatus::Approved,
        ..Default::default()
    }
}

#[test]
fn viewing_twice_counts_one_read_but_two_views() {
    let (_dir, db) = content_db();
    let conn = users_conn();
    let cfg = content_config();

    let id = stories_db_operations::create_story(&db, metadata("First drive"), "Body").unwrap();

    let first = tracking_helpers::record_view(&db, &conn, "profile-1", &id, &cfg).unwrap();
    assert_eq!(first.views, 1);
    assert_eq!(first.read_count, 1);
    assert!(first.newly_read);
    assert_eq!(first.reward_code, None);

    let second = tracking_helpers::record_view(&db, &conn, "profile-1", &id, &cfg).unwrap();
    assert_eq!(second.views, 2);
    assert_eq!(second.read_count, 1);
    assert!(!second.newly_read);
}

#[test]
fn distinct_stories_advance_the_read_count_to_the_reward() {
    let (_dir, db) = content_db();
    let conn = users_conn();
    let cfg = ContentConfig {
        reward_threshold: 3,
        ..content_config()
    };

    let mut last = None;
    for n in 0..3 {
        let id =
            stories_db_operations::create_story(&db, metadata(&format!("Story {}", n)), "Body")
                .unwrap();
        last = Some(tracking_helpers::record_view(&db, &conn, "profile-1", &id, &cfg).unwrap());
    }

    let outcome = last.unwrap();
    assert_eq!(outcome.read_count, 3);
    assert_eq!(outcome.reward_code, Some("BLISS-DRIVE-20".to_string()));
}

#[test]
fn seeding_ads_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let db = Database::create(dir.path().join("content.db")).unwrap();

    assert!(ads_db_operations::seed_default_ads(&db).unwrap());
    let ads = ads_db_operations::read_all_ads(&db).unwrap();
    assert_eq!(ads.len(), 9);
    assert_eq!(ads[0].restaurant_name, "The Driving Diner");
    assert!(ads.iter().all(|ad| ad.is_active));

    // A second seeding run writes nothing.
    assert!(!ads_db_operations::seed_default_ads(&db).unwrap());
    assert_eq!(ads_db_operations::read_all_ads(&db).unwrap().len(), 9);
}

#[test]
fn ad_crud_round_trip() {
    let (_dir, db) = content_db();
    let mut ads = ads_db_operations::read_all_ads(&db).unwrap();

    let mut ad = ads[0].clone();
    ad.restaurant_name = "Test Kitchen".to_string();
    let new_id = ads_db_operations::create_ad(&db, ad.clone()).unwrap();

    ads = ads_db_operations::read_all_ads(&db).unwrap();
    assert_eq!(ads.len(), 10);
    assert_eq!(ads.last().unwrap().id, new_id);

    ad.id = new_id.clone();
    ad.is_active = false;
    ads_db_operations::update_ad(&db, &new_id, ad).unwrap();
    let updated = ads_db_operations::read_all_ads(&db).unwrap();
    assert!(!updated.last().unwrap().is_active);

    ads_db_operations::delete_ad(&db, &new_id).unwrap();
    assert_eq!(ads_db_operations::read_all_ads(&db).unwrap().len(), 9);
    // Deleting again is not an error.
    ads_db_operations::delete_ad(&db, &new_id).unwrap();
}

#[test]
fn story_lifecycle_preserves_counters_across_edits() {
    let (_dir, db) = content_db();

    let mut meta = metadata("Parallel parking");
    meta.status = StoryStatus::Pending;
    let id = stories_db_operations::create_story(&db, meta, "Original body").unwrap();

    let created = stories_db_operations::read_story(&db, &id).unwrap();
    assert_eq!(created.metadata.status, StoryStatus::Pending);
    let created_at = created.metadata.created_at;

    stories_db_operations::increment_views(&db, &id).unwrap();
    stories_db_operations::adjust_likes(&db, &id, 1).unwrap();

    stories_db_operations::set_story_status(&db, &id, StoryStatus::Approved).unwrap();

    // An edit replaces the editable fields but never the counters or the
    // creation time.
    let mut edit = metadata("Parallel parking, revisited");
    edit.status = StoryStatus::Approved;
    stories_db_operations::update_story(&db, &id, edit, "Edited body").unwrap();

    let story = stories_db_operations::read_story(&db, &id).unwrap();
    assert_eq!(story.metadata.title, "Parallel parking, revisited");
    assert_eq!(story.content, "Edited body");
    assert_eq!(story.metadata.status, StoryStatus::Approved);
    assert_eq!(story.metadata.views, 1);
    assert_eq!(story.metadata.likes, 1);
    assert_eq!(story.metadata.created_at, created_at);

    stories_db_operations::delete_story(&db, &id).unwrap();
    assert!(stories_db_operations::read_story(&db, &id).is_none());
}

#[test]
fn status_filter_limits_the_listing() {
    let (_dir, db) = content_db();

    stories_db_operations::create_story(&db, metadata("Approved one"), "Body").unwrap();
    let mut pending = metadata("Pending one");
    pending.status = StoryStatus::Pending;
    stories_db_operations::create_story(&db, pending, "Body").unwrap();

    let approved =
        stories_db_operations::read_all_stories(&db, Some(StoryStatus::Approved)).unwrap();
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0].metadata.title, "Approved one");

    let all = stories_db_operations::read_all_stories(&db, None).unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn unliking_never_drives_the_counter_below_zero() {
    let (_dir, db) = content_db();
    let conn = users_conn();

    let id = stories_db_operations::create_story(&db, metadata("Likes"), "Body").unwrap();

    let (liked, likes) = tracking_helpers::toggle_like(&db, &conn, "profile-1", &id).unwrap();
    assert!(liked);
    assert_eq!(likes, 1);

    let (liked, likes) = tracking_helpers::toggle_like(&db, &conn, "profile-1", &id).unwrap();
    assert!(!liked);
    assert_eq!(likes, 0);

    // A direct negative adjustment on an already-zero counter clamps.
    assert_eq!(stories_db_operations::adjust_likes(&db, &id, -5).unwrap(), 0);

    assert!(!tracking_db_operations::is_liked(&conn, "profile-1", &id));
}

#[test]
fn change_feed_bumps_generation_and_notifies_subscribers() {
    let feed = ChangeFeed::new();
    assert_eq!(feed.generation(), 0);

    let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    feed.subscribe(move |stories| {
        sink.lock().unwrap().push(stories.len());
    });

    let (_dir, db) = content_db();
    stories_db_operations::create_story(&db, metadata("One"), "Body").unwrap();
    let stories = stories_db_operations::read_all_stories(&db, Some(StoryStatus::Approved)).unwrap();

    assert_eq!(feed.notify(&stories), 1);
    assert_eq!(feed.generation(), 1);
    assert_eq!(*seen.lock().unwrap(), vec![1]);

    // Each notification replaces the previous snapshot wholesale.
    assert_eq!(feed.notify(&[]), 2);
    assert_eq!(*seen.lock().unwrap(), vec![1, 0]);
}

#[test]
fn app_state_starts_with_an_empty_cache() {
    let state = AppState::new();
    assert!(state.story_cache.read().unwrap().is_empty());
    assert_eq!(state.change_feed.generation(), 0);
}

#[test]
fn account_creation_and_password_verification() {
    let conn = users_conn();

    let id = users_db_operations::create_user(&conn, "Jess@Example.com", "Jess", "secret1")
        .unwrap();
    assert!(id > 0);

    // Lookup is case-insensitive because emails are stored lowercase.
    let stored = users_db_operations::find_user_by_email(&conn, "jess@example.COM")
        .unwrap()
        .expect("account exists");
    assert_eq!(stored.email, "jess@example.com");
    assert_eq!(stored.display_name, "Jess");
    assert!(users_db_operations::verify_password(&stored, "secret1"));
    assert!(!users_db_operations::verify_password(&stored, "wrong"));

    // The same email cannot register twice.
    let duplicate = users_db_operations::create_user(&conn, "jess@example.com", "Other", "secret2");
    assert!(duplicate.is_err());

    assert!(users_db_operations::find_user_by_email(&conn, "nobody@example.com")
        .unwrap()
        .is_none());
}

#[test]
fn password_change_verifies_the_current_password_first() {
    use blissdrive_backend::helper::auth_helpers;

    let conn = users_conn();
    users_db_operations::create_user(&conn, "driver@y.com", "Driver", "oldpass1").unwrap();
    let stored = users_db_operations::find_user_by_email(&conn, "driver@y.com")
        .unwrap()
        .unwrap();

    // The gate the change-password route applies before writing anything:
    // the replacement must be long enough and the current password must match.
    assert!(auth_helpers::validate_new_password("abc").is_err());
    assert!(!users_db_operations::verify_password(&stored, "notmypassword"));

    assert!(auth_helpers::validate_new_password("newpass2").is_ok());
    assert!(users_db_operations::verify_password(&stored, "oldpass1"));
    users_db_operations::update_password(&conn, "driver@y.com", "newpass2").unwrap();

    let stored = users_db_operations::find_user_by_email(&conn, "driver@y.com")
        .unwrap()
        .unwrap();
    assert!(users_db_operations::verify_password(&stored, "newpass2"));
    assert!(!users_db_operations::verify_password(&stored, "oldpass1"));
}

#[test]
fn password_change_applies_to_the_stored_hash() {
    let conn = users_conn();
    users_db_operations::create_user(&conn, "x@y.com", "X", "before1").unwrap();

    assert_eq!(
        users_db_operations::update_password(&conn, "x@y.com", "after22").unwrap(),
        1
    );
    let stored = users_db_operations::find_user_by_email(&conn, "x@y.com")
        .unwrap()
        .unwrap();
    assert!(users_db_operations::verify_password(&stored, "after22"));
    assert!(!users_db_operations::verify_password(&stored, "before1"));

    assert_eq!(
        users_db_operations::update_password(&conn, "missing@y.com", "whatever").unwrap(),
        0
    );
}
