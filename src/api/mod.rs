pub mod appointments;
pub mod health;
pub mod swagger;
pub mod users;

use actix_web::web;

use crate::middleware::RoleGuard;
use crate::utils::AppError;

/// JSON malformado vira erro de validação no campo "body"
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req| {
        log::warn!("❌ {} {} - invalid JSON body: {}", req.method(), req.path(), err);
        AppError::validation("body", err.to_string()).into()
    })
}

/// Registers every `/api/v1` route with its role guard.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/appointment")
            .service(
                web::resource("/post")
                    .wrap(RoleGuard::patient())
                    .route(web::post().to(appointments::post_appointment)),
            )
            .service(
                web::resource("/getall")
                    .wrap(RoleGuard::admin())
                    .route(web::get().to(appointments::get_all_appointments)),
            )
            .service(
                web::resource("/update/{id}")
                    .wrap(RoleGuard::admin())
                    .route(web::put().to(appointments::update_appointment_status)),
            )
            .service(
                web::resource("/delete/{id}")
                    .wrap(RoleGuard::admin())
                    .route(web::delete().to(appointments::delete_appointment)),
            )
            .service(
                web::resource("/coutnappointment")
                    .wrap(RoleGuard::admin())
                    .route(web::get().to(appointments::count_appointments)),
            ),
    )
    .service(
        web::scope("/api/v1/user")
            // Public
            .route("/patient/register", web::post().to(users::register_patient))
            .route("/login", web::post().to(users::login))
            .route("/admin/addnew", web::post().to(users::add_new_admin))
            .route("/doctor/addnew", web::post().to(users::add_new_doctor))
            .route("/doctors", web::get().to(users::get_all_doctors))
            // Patient
            .service(
                web::resource("/patient/me")
                    .wrap(RoleGuard::patient())
                    .route(web::get().to(users::get_user_details))
                    .route(web::put().to(users::update_patient_profile)),
            )
            .service(
                web::resource("/patient/logout")
                    .wrap(RoleGuard::patient())
                    .route(web::get().to(users::logout_patient)),
            )
            // Admin
            .service(
                web::resource("/admin/me")
                    .wrap(RoleGuard::admin())
                    .route(web::get().to(users::get_user_details)),
            )
            .service(
                web::resource("/admin/logout")
                    .wrap(RoleGuard::admin())
                    .route(web::get().to(users::logout_admin)),
            )
            .service(
                web::resource("/admindetails")
                    .wrap(RoleGuard::admin())
                    .route(web::get().to(users::get_admin_details)),
            )
            .service(
                web::resource("/totaladmin")
                    .wrap(RoleGuard::admin())
                    .route(web::get().to(users::get_total_admin)),
            )
            .service(
                web::resource("/doctorcount")
                    .wrap(RoleGuard::admin())
                    .route(web::get().to(users::get_doctor_count)),
            ),
    );
}
