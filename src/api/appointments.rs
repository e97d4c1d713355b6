use actix_web::{web, HttpResponse};

use crate::models::{AppointmentInput, AppointmentResponse, UpdateStatusRequest, User};
use crate::state::AppState;
use crate::utils::AppError;

#[utoipa::path(
    post,
    path = "/api/v1/appointment/post",
    tag = "Appointments",
    request_body = AppointmentInput,
    responses(
        (status = 201, description = "Appointment created", body = AppointmentResponse),
        (status = 400, description = "Validation error or ambiguous doctor"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Only patients can book"),
        (status = 404, description = "Doctor not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn post_appointment(
    state: web::Data<AppState>,
    patient: web::ReqData<User>,
    body: web::Json<AppointmentInput>,
) -> Result<HttpResponse, AppError> {
    log::info!("📅 POST /appointment/post - patient: {}", patient.email);

    let appointment = state
        .appointments
        .create(body.into_inner(), &patient)
        .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "message": "Appointment Sent!",
        "appointment": AppointmentResponse::from(appointment)
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/appointment/getall",
    tag = "Appointments",
    responses(
        (status = 200, description = "All appointments", body = [AppointmentResponse]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_all_appointments(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let appointments: Vec<AppointmentResponse> = state
        .appointments
        .list_all()
        .await?
        .into_iter()
        .map(AppointmentResponse::from)
        .collect();

    log::info!("📋 GET /appointment/getall - {} appointments", appointments.len());

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "appointments": appointments
    })))
}

#[utoipa::path(
    put,
    path = "/api/v1/appointment/update/{id}",
    tag = "Appointments",
    params(("id" = String, Path, description = "Appointment id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = AppointmentResponse),
        (status = 400, description = "Invalid id or status"),
        (status = 404, description = "Appointment not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_appointment_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let status = body
        .into_inner()
        .status
        .ok_or_else(|| AppError::validation("status", "Status is required!"))?;

    log::info!("✏️  PUT /appointment/update/{} - status: {}", id, status);

    let appointment = state.appointments.update_status(&id, &status).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Appointment Status Updated!",
        "appointment": AppointmentResponse::from(appointment)
    })))
}

#[utoipa::path(
    delete,
    path = "/api/v1/appointment/delete/{id}",
    tag = "Appointments",
    params(("id" = String, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment deleted"),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Appointment not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_appointment(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    log::info!("🗑️  DELETE /appointment/delete/{}", id);

    state.appointments.delete(&id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Appointment Deleted!"
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/appointment/coutnappointment",
    tag = "Appointments",
    responses(
        (status = 200, description = "Number of appointments"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn count_appointments(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let count = state.appointments.count().await?;
    log::info!("🔢 GET /appointment/coutnappointment - {}", count);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "count": count
    })))
}
