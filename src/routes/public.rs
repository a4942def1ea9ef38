use crate::config::Config;
use crate::helper::{
    ad_helpers, listing_helpers, public_helpers, sanitization_helpers, tracking_helpers,
};
use crate::helper::listing_helpers::{CategoryFilter, SortOrder};
use crate::middleware;
use crate::models::db_operations::tracking_db_operations;
use crate::models::{ApiMessage, Category, SessionUser, StoryMetadata, StoryStatus};
use crate::{AppState, DbPool};
use actix_session::Session;
use actix_web::{web, HttpResponse, Responder};
use redb::Database;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct ApiQuery {
    category: Option<String>,
    q: Option<String>,
    sort: Option<String>,
    limit: Option<u32>,
    offset: Option<u32>,
}

#[derive(Deserialize)]
pub struct AdQuery {
    path: Option<String>,
}

#[derive(Deserialize)]
pub struct SubmissionForm {
    title: String,
    content: String,
    category: Option<String>,
    author_name: Option<String>,
    author_email: Option<String>,
}

#[derive(Serialize)]
struct VersionResponse {
    version: u64,
}

#[derive(Serialize)]
struct RewardResponse {
    read_count: u64,
    reward_threshold: u64,
    reward_code: Option<String>,
}

pub fn config_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/is_server_active", web::get().to(is_server_active))
            .route("/stories", web::get().to(list_stories))
            .route("/stories/version", web::get().to(stories_version))
            .route("/stories/{id}", web::get().to(get_story_by_id))
            .route("/stories/{id}/like", web::post().to(toggle_story_like))
            .route("/categories", web::get().to(get_categories))
            .route("/ads", web::get().to(get_ads_for_path))
            .route("/rewards", web::get().to(get_reward_progress))
            .route("/submissions", web::post().to(submit_story)),
    );
}

async fn is_server_active() -> impl Responder {
    HttpResponse::Ok().body("active")
}

/// Approved stories filtered, searched, sorted and paginated, as summaries.
/// The free-tier flag is assigned on the most-recent ordering before any
/// other sort or pagination is applied, so the same four stories stay free
/// no matter how the visitor slices the list.
async fn list_stories(
    db: web::Data<Database>,
    state: web::Data<AppState>,
    config: web::Data<Config>,
    query: web::Query<ApiQuery>,
) -> impl Responder {
    let stories = public_helpers::load_approved_stories(&db, &state);

    let free_limit = config.content.free_story_limit;
    let free_ids: Vec<String> = stories
        .iter()
        .take(free_limit)
        .map(|s| s.id.clone())
        .collect();

    let filter = CategoryFilter::parse(query.category.as_deref());
    let stories = listing_helpers::filter_by_category(stories, filter);
    let stories = listing_helpers::search(stories, query.q.as_deref().unwrap_or(""));
    let stories = listing_helpers::apply_sort(stories, SortOrder::parse(query.sort.as_deref()));

    let offset = query.offset.unwrap_or(0) as usize;
    let limit = query.limit.unwrap_or(50) as usize;

    let summaries: Vec<_> = stories
        .iter()
        .skip(offset)
        .take(limit)
        .map(|story| {
            let mut summary = story.summary();
            summary.free = free_ids.contains(&story.id);
            summary
        })
        .collect();

    HttpResponse::Ok().json(summaries)
}

/// Monotonic change counter for the approved collection. Clients poll this
/// and refetch the listing when the number moves.
async fn stories_version(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(VersionResponse {
        version: state.change_feed.generation(),
    })
}

/// Full story detail. Guests can only open stories inside the free tier;
/// everything past it asks them to sign in. A successful fetch records a
/// view and a read for the visitor's profile, and reports reward progress
/// alongside the story.
async fn get_story_by_id(
    id: web::Path<String>,
    db: web::Data<Database>,
    pool: web::Data<DbPool>,
    state: web::Data<AppState>,
    config: web::Data<Config>,
    session: Session,
) -> impl Responder {
    let story_id = id.into_inner();

    let story = match public_helpers::fetch_story_by_id(&story_id, &db) {
        Some(story) if story.metadata.status == StoryStatus::Approved => story,
        _ => return HttpResponse::NotFound().json(ApiMessage::new("Story not found.")),
    };

    let is_guest = middleware::session_user(&session).is_none();
    if is_guest {
        let approved = public_helpers::load_approved_stories(&db, &state);
        if !listing_helpers::is_free_for_guests(
            &approved,
            &story_id,
            config.content.free_story_limit,
        ) {
            return HttpResponse::Unauthorized()
                .json(ApiMessage::new("Sign in to keep reading."));
        }
    }

    let profile_id = match middleware::profile_id(&session) {
        Ok(id) => id,
        Err(e) => {
            log::error!("Failed to issue a profile id: {}", e);
            return HttpResponse::InternalServerError().finish();
        }
    };

    let conn = match pool.get() {
        Ok(conn) => conn,
        Err(e) => {
            log::error!("Failed to get a connection from the pool: {}", e);
            return HttpResponse::InternalServerError().finish();
        }
    };

    match tracking_helpers::record_view(&db, &conn, &profile_id, &story_id, &config.content) {
        Ok(outcome) => {
            let mut story = story;
            story.metadata.views = outcome.views;
            let liked = tracking_db_operations::is_liked(&conn, &profile_id, &story_id);
            HttpResponse::Ok().json(serde_json::json!({
                "story": story,
                "liked": liked,
                "read_count": outcome.read_count,
                "newly_read": outcome.newly_read,
                "reward_code": outcome.reward_code,
            }))
        }
        Err(e) => {
            log::error!("Failed to record a view on story '{}': {}", story_id, e);
            // The story itself loaded fine; tracking is best-effort.
            HttpResponse::Ok().json(serde_json::json!({
                "story": story,
                "liked": false,
            }))
        }
    }
}

/// Toggles the visitor's like on a story and moves the counter with it.
/// Signing in is required; the `SessionUser` extractor rejects guests with
/// 401 before the handler runs.
async fn toggle_story_like(
    id: web::Path<String>,
    db: web::Data<Database>,
    pool: web::Data<DbPool>,
    session: Session,
    _user: SessionUser,
) -> impl Responder {
    let story_id = id.into_inner();
    if public_helpers::fetch_story_by_id(&story_id, &db)
        .filter(|s| s.metadata.status == StoryStatus::Approved)
        .is_none()
    {
        return HttpResponse::NotFound().json(ApiMessage::new("Story not found."));
    }

    let profile_id = match middleware::profile_id(&session) {
        Ok(id) => id,
        Err(e) => {
            log::error!("Failed to issue a profile id: {}", e);
            return HttpResponse::InternalServerError().finish();
        }
    };

    let conn = match pool.get() {
        Ok(conn) => conn,
        Err(e) => {
            log::error!("Failed to get a connection from the pool: {}", e);
            return HttpResponse::InternalServerError().finish();
        }
    };

    match tracking_helpers::toggle_like(&db, &conn, &profile_id, &story_id) {
        Ok((liked, likes)) => {
            HttpResponse::Ok().json(serde_json::json!({ "liked": liked, "likes": likes }))
        }
        Err(e) => {
            log::error!("Failed to toggle like on story '{}': {}", story_id, e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

async fn get_categories() -> impl Responder {
    let labels: Vec<&str> = Category::ALL.iter().map(|c| c.label()).collect();
    HttpResponse::Ok().json(labels)
}

/// The rotation slot for a page. The path decides which slice of the active
/// ads the visitor sees; admin surfaces get none.
async fn get_ads_for_path(
    db: web::Data<Database>,
    config: web::Data<Config>,
    query: web::Query<AdQuery>,
) -> impl Responder {
    let path = query.path.as_deref().unwrap_or("/");

    match public_helpers::fetch_all_ads(&db) {
        Ok(ads) => {
            let slot = ad_helpers::ads_for_path(&ads, path, config.content.ads_per_slot);
            HttpResponse::Ok().json(slot)
        }
        Err(e) => {
            log::error!("Failed to fetch ads: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Where the visitor stands against the read-reward threshold.
async fn get_reward_progress(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    session: Session,
) -> impl Responder {
    let profile_id = match middleware::profile_id(&session) {
        Ok(id) => id,
        Err(e) => {
            log::error!("Failed to issue a profile id: {}", e);
            return HttpResponse::InternalServerError().finish();
        }
    };

    let conn = match pool.get() {
        Ok(conn) => conn,
        Err(e) => {
            log::error!("Failed to get a connection from the pool: {}", e);
            return HttpResponse::InternalServerError().finish();
        }
    };

    match tracking_db_operations::read_count(&conn, &profile_id) {
        Ok(read_count) => HttpResponse::Ok().json(RewardResponse {
            read_count,
            reward_threshold: config.content.reward_threshold,
            reward_code: tracking_helpers::reward_code(read_count, &config.content),
        }),
        Err(e) => {
            log::error!("Failed to read the reward progress: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Visitor-submitted story. Everything tag-shaped is stripped before it is
/// stored, and the story lands as pending until an admin reviews it.
async fn submit_story(
    db: web::Data<Database>,
    state: web::Data<AppState>,
    form: web::Json<SubmissionForm>,
) -> impl Responder {
    let title = sanitization_helpers::strip_all_html(form.title.trim());
    let content = sanitization_helpers::strip_all_html(form.content.trim());

    if title.is_empty() || content.is_empty() {
        return HttpResponse::BadRequest()
            .json(ApiMessage::new("A title and story text are required."));
    }

    let metadata = StoryMetadata {
        title,
        category: form
            .category
            .as_deref()
            .and_then(Category::from_label)
            .unwrap_or_default(),
        status: StoryStatus::Pending,
        author_name: form
            .author_name
            .as_deref()
            .map(|s| sanitization_helpers::strip_all_html(s.trim())),
        author_email: form.author_email.as_deref().map(|s| s.trim().to_string()),
        ..Default::default()
    };

    match public_helpers::submit_story(&db, metadata, &content) {
        Ok(id) => {
            public_helpers::broadcast_content_change(&db, &state);
            HttpResponse::Created().json(serde_json::json!({
                "id": id,
                "message": "Thanks! Your story is waiting for review.",
            }))
        }
        Err(e) => {
            log::error!("Failed to store a submission: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}
