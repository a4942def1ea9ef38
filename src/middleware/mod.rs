use crate::models::{ApiMessage, Role, SessionUser};
use actix_session::{Session, SessionExt};
use actix_web::{
    body::EitherBody,
    dev::{self, forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, FromRequest, HttpRequest, HttpResponse,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use std::future::{ready, Ready as StdReady};

/// Extractor for handlers that require a signed-in visitor. Guests (no
/// session entry) are rejected with 401 before the handler runs.
impl FromRequest for SessionUser {
    type Error = actix_web::Error;
    type Future = StdReady<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let session = req.get_session();
        if let Ok(Some(user)) = session.get::<SessionUser>("user") {
            ready(Ok(user))
        } else {
            ready(Err(actix_web::error::ErrorUnauthorized("Not logged in.")))
        }
    }
}

pub fn session_user(session: &Session) -> Option<SessionUser> {
    session.get::<SessionUser>("user").unwrap_or(None)
}

pub fn admin_guard(session: &Session) -> bool {
    session_user(session).map(|u| u.role) == Some(Role::Admin)
}

/// Every visitor with a session gets a stable profile id, issued lazily on
/// first use. Read and like tracking key off this id rather than the account
/// row so tracking works the moment the session exists.
pub fn profile_id(session: &Session) -> Result<String, Error> {
    if let Ok(Some(id)) = session.get::<String>("profile_id") {
        return Ok(id);
    }
    let id = uuid::Uuid::new_v4().to_string();
    session.insert("profile_id", &id)?;
    Ok(id)
}

// Wraps the /api/admin scope. Non-admin sessions never reach the inner
// services; they get a uniform 401 with a JSON body instead.

pub struct RequireAdmin;

impl<S, B> Transform<S, ServiceRequest> for RequireAdmin
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireAdminMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RequireAdminMiddleware { service })
    }
}

pub struct RequireAdminMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequireAdminMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let is_admin = admin_guard(&req.get_session());

        if is_admin {
            let fut = self.service.call(req);
            Box::pin(async move {
                let res = fut.await?;
                Ok(res.map_into_left_body())
            })
        } else {
            Box::pin(async move {
                let (http_req, _payload) = req.into_parts();
                let res = HttpResponse::Unauthorized()
                    .json(ApiMessage::new("Admin access required."))
                    .map_into_right_body();
                Ok(ServiceResponse::new(http_req, res))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn signed_in_user() -> SessionUser {
        SessionUser {
            id: 1,
            email: "x@y.com".to_string(),
            name: "X".to_string(),
            role: Role::User,
        }
    }

    #[actix_web::test]
    async fn extractor_rejects_guests_and_admits_signed_in_sessions() {
        let req = TestRequest::default().to_http_request();
        let mut payload = dev::Payload::None;

        assert!(SessionUser::from_request(&req, &mut payload).await.is_err());

        req.get_session().insert("user", signed_in_user()).unwrap();
        let user = SessionUser::from_request(&req, &mut payload)
            .await
            .expect("session carries a user");
        assert_eq!(user.email, "x@y.com");
    }

    #[test]
    fn admin_guard_only_passes_the_admin_role() {
        let req = TestRequest::default().to_http_request();
        let session = req.get_session();
        assert!(!admin_guard(&session));

        session.insert("user", signed_in_user()).unwrap();
        assert!(!admin_guard(&session));

        let mut admin = signed_in_user();
        admin.role = Role::Admin;
        session.insert("user", admin).unwrap();
        assert!(admin_guard(&session));
    }
}
