pub mod auth;

pub use auth::RoleGuard;
