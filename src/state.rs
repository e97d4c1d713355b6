use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::{AppointmentRepository, UserRepository};
use crate::services::{AppointmentService, PasswordHasher, TokenService, UserService};

/// Estado compartilhado entre os workers (via `web::Data`)
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: TokenService,
    pub users: UserService,
    pub appointments: AppointmentService,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserRepository>,
        appointments: Arc<dyn AppointmentRepository>,
    ) -> Self {
        let tokens = TokenService::new(&config.jwt);
        let users = UserService::new(users, PasswordHasher::new(config.bcrypt_cost));
        let appointments = AppointmentService::new(appointments, users.clone());

        Self {
            config: Arc::new(config),
            tokens,
            users,
            appointments,
        }
    }
}
