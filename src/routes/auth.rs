use crate::config::Config;
use crate::helper::auth_helpers::{self, AuthError};
use crate::middleware;
use crate::models::db_operations::users_db_operations;
use crate::models::{ApiMessage, SessionUser};
use crate::DbPool;
use actix_session::Session;
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct LoginForm {
    email: String,
    password: String,
}

#[derive(Deserialize)]
pub struct SignupForm {
    email: String,
    password: String,
    name: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordForm {
    current_password: String,
    new_password: String,
}

pub fn config_auth(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .route("/signup", web::post().to(handle_signup))
            .route("/login", web::post().to(handle_login))
            .route("/logout", web::post().to(handle_logout))
            .route("/change-password", web::post().to(handle_change_password))
            .route("/me", web::get().to(current_user)),
    );
}

fn auth_error_response(e: &AuthError) -> HttpResponse {
    match e {
        AuthError::AccountNotFound => HttpResponse::NotFound().json(ApiMessage::new(e.to_string())),
        AuthError::WrongPassword => {
            HttpResponse::Unauthorized().json(ApiMessage::new(e.to_string()))
        }
        AuthError::EmailTaken => HttpResponse::Conflict().json(ApiMessage::new(e.to_string())),
        AuthError::Backend => {
            HttpResponse::InternalServerError().json(ApiMessage::new(e.to_string()))
        }
        _ => HttpResponse::BadRequest().json(ApiMessage::new(e.to_string())),
    }
}

fn start_session(session: &Session, user: &SessionUser) -> Result<(), actix_web::Error> {
    session.renew();
    session.insert("user", user)?;
    Ok(())
}

async fn handle_signup(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    session: Session,
    form: web::Json<SignupForm>,
) -> impl Responder {
    if let Err(e) = auth_helpers::validate_signup(&form.email, &form.password, &form.name) {
        return auth_error_response(&e);
    }

    let conn = match pool.get() {
        Ok(conn) => conn,
        Err(e) => {
            log::error!("Failed to get a connection from the pool: {}", e);
            return auth_error_response(&AuthError::Backend);
        }
    };

    let user_id =
        match users_db_operations::create_user(&conn, &form.email, &form.name, &form.password) {
            Ok(id) => id,
            Err(e) => {
                if let rusqlite::Error::SqliteFailure(inner, _) = &e {
                    if inner.code == rusqlite::ErrorCode::ConstraintViolation {
                        return auth_error_response(&AuthError::EmailTaken);
                    }
                }
                log::error!("Failed to create an account: {}", e);
                return auth_error_response(&AuthError::Backend);
            }
        };

    let user = SessionUser {
        id: user_id,
        email: form.email.trim().to_lowercase(),
        name: form.name.trim().to_string(),
        role: auth_helpers::resolve_role(&form.email, &config.admin_email),
    };

    if let Err(e) = start_session(&session, &user) {
        log::error!("Failed to start a session after signup: {}", e);
        return auth_error_response(&AuthError::Backend);
    }
    HttpResponse::Created().json(user)
}

async fn handle_login(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    session: Session,
    form: web::Json<LoginForm>,
) -> impl Responder {
    if let Err(e) = auth_helpers::validate_login(&form.email, &form.password) {
        return auth_error_response(&e);
    }

    let conn = match pool.get() {
        Ok(conn) => conn,
        Err(e) => {
            log::error!("Failed to get a connection from the pool: {}", e);
            return auth_error_response(&AuthError::Backend);
        }
    };

    let stored = match users_db_operations::find_user_by_email(&conn, &form.email) {
        Ok(Some(stored)) => stored,
        Ok(None) => return auth_error_response(&AuthError::AccountNotFound),
        Err(e) => {
            log::error!("Failed to look up an account: {}", e);
            return auth_error_response(&AuthError::Backend);
        }
    };

    if !users_db_operations::verify_password(&stored, &form.password) {
        return auth_error_response(&AuthError::WrongPassword);
    }

    let user = SessionUser {
        id: stored.id,
        email: stored.email.clone(),
        name: stored.display_name.clone(),
        role: auth_helpers::resolve_role(&stored.email, &config.admin_email),
    };

    if let Err(e) = start_session(&session, &user) {
        log::error!("Failed to start a session after login: {}", e);
        return auth_error_response(&AuthError::Backend);
    }
    HttpResponse::Ok().json(user)
}

/// Drops the signed-in identity but keeps everything else in the session,
/// in particular the profile id: read history and reward progress belong to
/// the browser profile, not the account, and must survive logging out.
/// (`purge()` would be terminal for the whole session, profile id included.)
fn clear_identity(session: &Session) {
    session.remove("user");
    session.renew();
}

async fn handle_logout(session: Session) -> impl Responder {
    clear_identity(&session);
    HttpResponse::Ok().json(ApiMessage::new("Logged out."))
}

/// Password update for the signed-in account. The current password is
/// re-checked before anything is written.
async fn handle_change_password(
    pool: web::Data<DbPool>,
    user: SessionUser,
    form: web::Json<ChangePasswordForm>,
) -> impl Responder {
    if let Err(e) = auth_helpers::validate_new_password(&form.new_password) {
        return auth_error_response(&e);
    }

    let conn = match pool.get() {
        Ok(conn) => conn,
        Err(e) => {
            log::error!("Failed to get a connection from the pool: {}", e);
            return auth_error_response(&AuthError::Backend);
        }
    };

    let stored = match users_db_operations::find_user_by_email(&conn, &user.email) {
        Ok(Some(stored)) => stored,
        Ok(None) => return auth_error_response(&AuthError::AccountNotFound),
        Err(e) => {
            log::error!("Failed to look up an account: {}", e);
            return auth_error_response(&AuthError::Backend);
        }
    };

    if !users_db_operations::verify_password(&stored, &form.current_password) {
        return auth_error_response(&AuthError::WrongPassword);
    }

    match users_db_operations::update_password(&conn, &user.email, &form.new_password) {
        Ok(_) => HttpResponse::Ok().json(ApiMessage::new("Password updated.")),
        Err(e) => {
            log::error!("Failed to update a password: {}", e);
            auth_error_response(&AuthError::Backend)
        }
    }
}

/// The signed-in identity, or 401 when the session carries none. Guests are
/// never represented as a stored role; they are simply not here.
async fn current_user(session: Session) -> impl Responder {
    match middleware::session_user(&session) {
        Some(user) => HttpResponse::Ok().json(user),
        None => HttpResponse::Unauthorized().json(ApiMessage::new("Not logged in.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use actix_session::SessionExt;
    use actix_web::test::TestRequest;

    #[test]
    fn logging_out_keeps_the_profile_id() {
        let req = TestRequest::default().to_http_request();
        let session = req.get_session();
        session.insert("profile_id", "profile-1").unwrap();
        session
            .insert(
                "user",
                SessionUser {
                    id: 1,
                    email: "x@y.com".to_string(),
                    name: "X".to_string(),
                    role: Role::User,
                },
            )
            .unwrap();

        clear_identity(&session);

        assert!(session.get::<SessionUser>("user").unwrap().is_none());
        assert_eq!(
            session.get::<String>("profile_id").unwrap().as_deref(),
            Some("profile-1")
        );
    }
}
