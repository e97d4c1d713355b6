use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Hospital Service API",
        version = "1.0.0",
        description = "Patients, doctors and admins of the hospital, plus appointment booking.\n\n**Authentication:** guarded routes accept the role cookie (`patientToken` / `adminToken`) or a JWT Bearer token.",
        contact(
            name = "Hospital Service Team"
        )
    ),
    paths(
        // Users
        crate::api::users::register_patient,
        crate::api::users::login,
        crate::api::users::add_new_admin,
        crate::api::users::add_new_doctor,
        crate::api::users::get_all_doctors,
        crate::api::users::get_user_details,
        crate::api::users::update_patient_profile,
        crate::api::users::logout_patient,
        crate::api::users::logout_admin,
        crate::api::users::get_admin_details,
        crate::api::users::get_total_admin,
        crate::api::users::get_doctor_count,

        // Appointments
        crate::api::appointments::post_appointment,
        crate::api::appointments::get_all_appointments,
        crate::api::appointments::update_appointment_status,
        crate::api::appointments::delete_appointment,
        crate::api::appointments::count_appointments,

        // Health
        crate::api::health::health_check,
    ),
    components(
        schemas(
            crate::models::Role,
            crate::models::Gender,
            crate::models::DocAvatar,
            crate::models::UserInput,
            crate::models::UserChanges,
            crate::models::LoginRequest,
            crate::models::UserResponse,
            crate::models::AuthResponse,
            crate::models::AppointmentStatus,
            crate::models::DoctorName,
            crate::models::AppointmentInput,
            crate::models::UpdateStatusRequest,
            crate::models::AppointmentResponse,
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Users", description = "Registration, login, profiles and role-scoped user listings."),
        (name = "Appointments", description = "Appointment booking by patients and management by admins."),
        (name = "Health", description = "Liveness check."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT issued by /api/v1/user/login"))
                        .build(),
                ),
            );
            components.add_security_scheme(
                "admin_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("adminToken"))),
            );
            components.add_security_scheme(
                "patient_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("patientToken"))),
            );
        }
    }
}
