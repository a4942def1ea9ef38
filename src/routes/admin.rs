use crate::helper::{admin_helpers, public_helpers};
use crate::helper::admin_helpers::AdminHelperError;
use crate::models::{Advertisement, ApiMessage, StoryMetadata, StoryStatus};
use crate::AppState;
use actix_web::{web, HttpResponse, Responder};
use redb::Database;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct StoryForm {
    #[serde(flatten)]
    pub metadata: StoryMetadata,
    pub content: String,
}

pub fn config_admin(cfg: &mut web::ServiceConfig) {
    cfg.route("/stories", web::get().to(list_all_stories))
        .route("/stories", web::post().to(create_story))
        .route("/stories/{id}", web::put().to(update_story))
        .route("/stories/{id}", web::delete().to(delete_story))
        .route("/stories/{id}/approve", web::post().to(approve_story))
        .route("/stories/{id}/reject", web::post().to(reject_story))
        .route("/ads", web::get().to(list_ads))
        .route("/ads", web::post().to(create_ad))
        .route("/ads/{id}", web::put().to(update_ad))
        .route("/ads/{id}", web::delete().to(delete_ad));
}

fn error_response(context: &str, e: AdminHelperError) -> HttpResponse {
    match e {
        AdminHelperError::Validation(msg) => HttpResponse::BadRequest().json(ApiMessage::new(msg)),
        AdminHelperError::NotFound => {
            HttpResponse::NotFound().json(ApiMessage::new("Record not found."))
        }
        AdminHelperError::Content(
            crate::models::db_operations::stories_db_operations::DbError::NotFound(id),
        ) => HttpResponse::NotFound().json(ApiMessage::new(format!("No record with id {}.", id))),
        other => {
            log::error!("{}: {}", context, other);
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// The full collection for the CMS, pending and rejected included.
async fn list_all_stories(db: web::Data<Database>) -> impl Responder {
    match admin_helpers::fetch_all_stories(&db) {
        Ok(stories) => HttpResponse::Ok().json(stories),
        Err(e) => error_response("Failed to list stories", e),
    }
}

async fn create_story(
    db: web::Data<Database>,
    state: web::Data<AppState>,
    form: web::Json<StoryForm>,
) -> impl Responder {
    let mut form = form.into_inner();
    // Stories created from the CMS go live immediately; only public
    // submissions wait in the pending queue.
    form.metadata.status = StoryStatus::Approved;
    match admin_helpers::create_story(&db, form.metadata, &form.content) {
        Ok(id) => {
            public_helpers::broadcast_content_change(&db, &state);
            HttpResponse::Created().json(serde_json::json!({ "id": id }))
        }
        Err(e) => error_response("Failed to create a story", e),
    }
}

async fn update_story(
    id: web::Path<String>,
    db: web::Data<Database>,
    state: web::Data<AppState>,
    form: web::Json<StoryForm>,
) -> impl Responder {
    let form = form.into_inner();
    match admin_helpers::update_story(&db, &id, form.metadata, &form.content) {
        Ok(()) => {
            public_helpers::broadcast_content_change(&db, &state);
            HttpResponse::Ok().json(ApiMessage::new("Story updated."))
        }
        Err(e) => error_response("Failed to update a story", e),
    }
}

async fn delete_story(
    id: web::Path<String>,
    db: web::Data<Database>,
    state: web::Data<AppState>,
) -> impl Responder {
    match admin_helpers::delete_story(&db, &id) {
        Ok(()) => {
            public_helpers::broadcast_content_change(&db, &state);
            HttpResponse::Ok().json(ApiMessage::new("Story deleted."))
        }
        Err(e) => error_response("Failed to delete a story", e),
    }
}

async fn approve_story(
    id: web::Path<String>,
    db: web::Data<Database>,
    state: web::Data<AppState>,
) -> impl Responder {
    match admin_helpers::approve_story(&db, &id) {
        Ok(()) => {
            public_helpers::broadcast_content_change(&db, &state);
            HttpResponse::Ok().json(ApiMessage::new("Story approved."))
        }
        Err(e) => error_response("Failed to approve a story", e),
    }
}

async fn reject_story(
    id: web::Path<String>,
    db: web::Data<Database>,
    state: web::Data<AppState>,
) -> impl Responder {
    match admin_helpers::reject_story(&db, &id) {
        Ok(()) => {
            public_helpers::broadcast_content_change(&db, &state);
            HttpResponse::Ok().json(ApiMessage::new("Story rejected."))
        }
        Err(e) => error_response("Failed to reject a story", e),
    }
}

async fn list_ads(db: web::Data<Database>) -> impl Responder {
    match admin_helpers::fetch_all_ads(&db) {
        Ok(ads) => HttpResponse::Ok().json(ads),
        Err(e) => error_response("Failed to list ads", e),
    }
}

async fn create_ad(db: web::Data<Database>, ad: web::Json<Advertisement>) -> impl Responder {
    match admin_helpers::create_ad(&db, ad.into_inner()) {
        Ok(id) => HttpResponse::Created().json(serde_json::json!({ "id": id })),
        Err(e) => error_response("Failed to create an ad", e),
    }
}

async fn update_ad(
    id: web::Path<String>,
    db: web::Data<Database>,
    ad: web::Json<Advertisement>,
) -> impl Responder {
    match admin_helpers::update_ad(&db, &id, ad.into_inner()) {
        Ok(()) => HttpResponse::Ok().json(ApiMessage::new("Ad updated.")),
        Err(e) => error_response("Failed to update an ad", e),
    }
}

async fn delete_ad(id: web::Path<String>, db: web::Data<Database>) -> impl Responder {
    match admin_helpers::delete_ad(&db, &id) {
        Ok(()) => HttpResponse::Ok().json(ApiMessage::new("Ad deleted.")),
        Err(e) => error_response("Failed to delete an ad", e),
    }
}
