use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, ResponseError,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

use crate::models::{Role, User};
use crate::state::AppState;
use crate::utils::AppError;

/// Exige um token válido de um usuário com o papel indicado.
///
/// On success the resolved [`User`] is placed in the request extensions, so handlers
/// can take it as `web::ReqData<User>`.
#[derive(Debug, Clone, Copy)]
pub struct RoleGuard {
    role: Role,
}

impl RoleGuard {
    pub fn patient() -> Self {
        Self { role: Role::Patient }
    }

    pub fn admin() -> Self {
        Self { role: Role::Admin }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RoleGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RoleGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RoleGuardMiddleware {
            service: Rc::new(service),
            role: self.role,
        }))
    }
}

pub struct RoleGuardMiddleware<S> {
    service: Rc<S>,
    role: Role,
}

impl<S, B> Service<ServiceRequest> for RoleGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let role = self.role;

        Box::pin(async move {
            let state = req.app_data::<web::Data<AppState>>().cloned();
            let state = match state {
                Some(state) => state,
                None => {
                    let err = AppError::internal("AppState not registered");
                    return Ok(req.into_response(err.error_response()).map_into_right_body());
                }
            };

            let token = extract_token(&req, role);

            match authenticate(&state, role, token.as_deref()).await {
                Ok(user) => {
                    log::debug!("🔐 {} {} authenticated as {}", req.method(), req.path(), user.email);
                    req.extensions_mut().insert(user);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(err) => {
                    log::warn!("🚫 {} {} rejected: {}", req.method(), req.path(), err);
                    Ok(req.into_response(err.error_response()).map_into_right_body())
                }
            }
        })
    }
}

/// Cookie do papel primeiro; depois `Authorization: Bearer <token>`
fn extract_token(req: &ServiceRequest, role: Role) -> Option<String> {
    if let Some(cookie) = req.cookie(role.cookie_name()) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Resolves the caller of a guarded route.
///
/// Missing, invalid or orphaned tokens are all `Unauthenticated`; a valid user with the
/// wrong role is `Forbidden`.
pub async fn authenticate(state: &AppState, role: Role, token: Option<&str>) -> Result<User, AppError> {
    let token =
        token.ok_or_else(|| AppError::Unauthenticated(format!("{} Not Authenticated!", role)))?;

    let user_id = state
        .tokens
        .verify(token)
        .map_err(|_| AppError::Unauthenticated("Invalid or expired token".to_string()))?;

    let user = match state.users.find_by_id(&user_id).await {
        Ok(user) => user,
        Err(AppError::NotFound(_)) => {
            return Err(AppError::Unauthenticated("User not found".to_string()));
        }
        Err(e) => return Err(e),
    };

    if user.role != role {
        return Err(AppError::Forbidden(format!(
            "{} not authorized for this resource!",
            user.role
        )));
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserInput;
    use crate::state::testing::in_memory_state;
    use actix_web::{cookie::Cookie, http::StatusCode, test, App, HttpResponse};

    async fn whoami(user: web::ReqData<User>) -> HttpResponse {
        HttpResponse::Ok().body(user.email.clone())
    }

    fn person(email: &str, role: Role) -> UserInput {
        UserInput {
            first_name: Some("Jane".into()),
            last_name: Some("Doe".into()),
            email: Some(email.into()),
            phone: Some("1234567890".into()),
            nic: Some("123".into()),
            dob: Some("1990-01-01".into()),
            gender: Some("Female".into()),
            password: Some("secretpw".into()),
            role: Some(role),
            ..Default::default()
        }
    }

    async fn token_for(state: &AppState, email: &str, role: Role) -> String {
        let user = state.users.create(person(email, role)).await.unwrap();
        state.tokens.issue(&user.id_hex()).unwrap()
    }

    #[actix_web::test]
    async fn test_admin_route_status_codes() {
        let state = in_memory_state();
        let patient_token = token_for(&state, "jane@x.com", Role::Patient).await;
        let admin_token = token_for(&state, "admin@x.com", Role::Admin).await;

        let app = test::init_service(
            App::new().app_data(web::Data::new(state)).service(
                web::scope("/admin")
                    .wrap(RoleGuard::admin())
                    .route("/me", web::get().to(whoami)),
            ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/admin/me")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", patient_token)))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get().uri("/admin/me").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/admin/me")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", admin_token)))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        assert_eq!(body, "admin@x.com");
    }

    #[actix_web::test]
    async fn test_patient_cookie_is_accepted() {
        let state = in_memory_state();
        let token = token_for(&state, "jane@x.com", Role::Patient).await;

        let app = test::init_service(
            App::new().app_data(web::Data::new(state)).service(
                web::scope("/patient")
                    .wrap(RoleGuard::patient())
                    .route("/me", web::get().to(whoami)),
            ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/patient/me")
            .cookie(Cookie::new("patientToken", token.clone()))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        // o cookie de admin não serve para rotas de paciente
        let req = test::TestRequest::get()
            .uri("/patient/me")
            .cookie(Cookie::new("adminToken", token))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_authenticate_rejects_bad_tokens() {
        let state = in_memory_state();

        let err = authenticate(&state, Role::Admin, Some("garbage")).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(_)));

        // token válido para um usuário que não existe mais
        let orphan = state.tokens.issue(&mongodb::bson::oid::ObjectId::new().to_hex()).unwrap();
        let err = authenticate(&state, Role::Admin, Some(&orphan)).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(_)));

        let err = authenticate(&state, Role::Patient, None).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(ref m) if m == "Patient Not Authenticated!"));
    }
}
