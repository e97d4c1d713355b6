use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie},
    web, HttpResponse,
};

use crate::models::{
    AuthResponse, LoginRequest, Role, User, UserChanges, UserInput, UserResponse,
};
use crate::state::AppState;
use crate::utils::AppError;

/// Cookie HttpOnly com o token, nomeado pelo papel do usuário
fn token_cookie(role: Role, token: String, days: i64) -> Cookie<'static> {
    Cookie::build(role.cookie_name(), token)
        .path("/")
        .http_only(true)
        .max_age(CookieDuration::days(days))
        .finish()
}

fn removal_cookie(role: Role) -> Cookie<'static> {
    let mut cookie = Cookie::build(role.cookie_name(), "")
        .path("/")
        .http_only(true)
        .finish();
    cookie.make_removal();
    cookie
}

/// Issues a token for `user` and returns it both in the body and in the role cookie.
fn send_token(
    state: &AppState,
    user: User,
    message: &str,
    mut response: actix_web::HttpResponseBuilder,
) -> Result<HttpResponse, AppError> {
    let token = state.tokens.issue(&user.id_hex())?;
    let cookie = token_cookie(user.role, token.clone(), state.config.cookie_expire_days);

    Ok(response.cookie(cookie).json(AuthResponse {
        success: true,
        message: message.to_string(),
        token,
        user: UserResponse::from(user),
    }))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[utoipa::path(
    post,
    path = "/api/v1/user/patient/register",
    tag = "Users",
    request_body = UserInput,
    responses(
        (status = 201, description = "Patient registered, token set in patientToken cookie", body = AuthResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register_patient(
    state: web::Data<AppState>,
    body: web::Json<UserInput>,
) -> Result<HttpResponse, AppError> {
    let mut input = body.into_inner();
    input.role = Some(Role::Patient);
    log::info!(
        "📝 POST /user/patient/register - email: {}",
        input.email.as_deref().unwrap_or("N/A")
    );

    let user = state.users.create(input).await?;
    send_token(&state, user, "User Registered!", HttpResponse::Created())
}

#[utoipa::path(
    post,
    path = "/api/v1/user/login",
    tag = "Users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, token set in the role cookie", body = AuthResponse),
        (status = 400, description = "Missing fields or password confirmation mismatch"),
        (status = 401, description = "Invalid credentials or role")
    )
)]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();

    let (email, password, confirm_password, role) = match (
        non_blank(&request.email),
        request.password.as_deref().filter(|p| !p.is_empty()),
        request.confirm_password.as_deref().filter(|p| !p.is_empty()),
        non_blank(&request.role),
    ) {
        (Some(e), Some(p), Some(c), Some(r)) => (e, p, c, r),
        _ => return Err(AppError::validation("body", "Please Fill Full Form!")),
    };

    log::info!("🔐 POST /user/login - email: {}, role: {}", email, role);

    if password != confirm_password {
        return Err(AppError::validation(
            "confirmPassword",
            "Password & Confirm Password Do Not Match!",
        ));
    }

    let invalid = || AppError::Unauthenticated("Invalid email or password".to_string());

    let user = match state.users.find_by_email(email, true).await {
        Ok(user) => user,
        Err(AppError::NotFound(_)) => {
            log::warn!("❌ Login failed: {} - unknown email", email);
            return Err(invalid());
        }
        Err(e) => return Err(e),
    };

    if !state.users.compare_password(&user, password).await? {
        log::warn!("❌ Login failed: {} - wrong password", email);
        return Err(invalid());
    }

    if role.parse::<Role>().ok() != Some(user.role) {
        log::warn!("❌ Login failed: {} - role mismatch ({})", email, role);
        return Err(AppError::Unauthenticated(
            "User not found with this role".to_string(),
        ));
    }

    log::info!("✅ Login successful: {}", email);
    send_token(&state, user, "Login Successfully!", HttpResponse::Ok())
}

#[utoipa::path(
    post,
    path = "/api/v1/user/admin/addnew",
    tag = "Users",
    request_body = UserInput,
    responses(
        (status = 201, description = "Admin created", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn add_new_admin(
    state: web::Data<AppState>,
    body: web::Json<UserInput>,
) -> Result<HttpResponse, AppError> {
    let mut input = body.into_inner();
    input.role = Some(Role::Admin);
    log::warn!(
        "⚠️  POST /user/admin/addnew (unguarded) - email: {}",
        input.email.as_deref().unwrap_or("N/A")
    );

    let admin = state.users.create(input).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "message": "New Admin Registered!",
        "admin": UserResponse::from(admin)
    })))
}

#[utoipa::path(
    post,
    path = "/api/v1/user/doctor/addnew",
    tag = "Users",
    request_body = UserInput,
    responses(
        (status = 201, description = "Doctor created", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn add_new_doctor(
    state: web::Data<AppState>,
    body: web::Json<UserInput>,
) -> Result<HttpResponse, AppError> {
    let mut input = body.into_inner();
    input.role = Some(Role::Doctor);
    log::warn!(
        "⚠️  POST /user/doctor/addnew (unguarded) - email: {}",
        input.email.as_deref().unwrap_or("N/A")
    );

    let doctor = state.users.create(input).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "message": "New Doctor Registered!",
        "doctor": UserResponse::from(doctor)
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/user/doctors",
    tag = "Users",
    responses(
        (status = 200, description = "All doctors", body = [UserResponse])
    )
)]
pub async fn get_all_doctors(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    log::info!("👨‍⚕️ GET /user/doctors");

    let doctors: Vec<UserResponse> = state
        .users
        .list_by_role(Role::Doctor)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "doctors": doctors
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/user/patient/me",
    tag = "Users",
    responses(
        (status = 200, description = "Authenticated user's profile", body = UserResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Wrong role")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user_details(user: web::ReqData<User>) -> HttpResponse {
    let user = user.into_inner();
    log::info!("👤 GET /user/me - {}", user.email);

    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "user": UserResponse::from(user)
    }))
}

#[utoipa::path(
    put,
    path = "/api/v1/user/patient/me",
    tag = "Users",
    request_body = UserChanges,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_patient_profile(
    state: web::Data<AppState>,
    user: web::ReqData<User>,
    body: web::Json<UserChanges>,
) -> Result<HttpResponse, AppError> {
    log::info!("✏️  PUT /user/patient/me - {}", user.email);

    let updated = state.users.update(&user.id_hex(), body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Profile Updated!",
        "user": UserResponse::from(updated)
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/user/patient/logout",
    tag = "Users",
    responses((status = 200, description = "patientToken cookie cleared")),
    security(("bearer_auth" = []))
)]
pub async fn logout_patient() -> HttpResponse {
    log::info!("👋 GET /user/patient/logout");

    HttpResponse::Ok()
        .cookie(removal_cookie(Role::Patient))
        .json(serde_json::json!({
            "success": true,
            "message": "Patient Logged Out Successfully."
        }))
}

#[utoipa::path(
    get,
    path = "/api/v1/user/admin/logout",
    tag = "Users",
    responses((status = 200, description = "adminToken cookie cleared")),
    security(("bearer_auth" = []))
)]
pub async fn logout_admin() -> HttpResponse {
    log::info!("👋 GET /user/admin/logout");

    HttpResponse::Ok()
        .cookie(removal_cookie(Role::Admin))
        .json(serde_json::json!({
            "success": true,
            "message": "Admin Logged Out Successfully."
        }))
}

#[utoipa::path(
    get,
    path = "/api/v1/user/admindetails",
    tag = "Users",
    responses(
        (status = 200, description = "All admins", body = [UserResponse]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Wrong role")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_admin_details(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    log::info!("📋 GET /user/admindetails");

    let admins: Vec<UserResponse> = state
        .users
        .list_by_role(Role::Admin)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "admins": admins
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/user/totaladmin",
    tag = "Users",
    responses(
        (status = 200, description = "Number of admins"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Wrong role")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_total_admin(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let count = state.users.count_by_role(Role::Admin).await?;
    log::info!("🔢 GET /user/totaladmin - {}", count);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "count": count
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/user/doctorcount",
    tag = "Users",
    responses(
        (status = 200, description = "Number of doctors"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Wrong role")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_doctor_count(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let count = state.users.count_by_role(Role::Doctor).await?;
    log::info!("🔢 GET /user/doctorcount - {}", count);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "count": count
    })))
}
