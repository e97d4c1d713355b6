pub mod appointment;
pub mod user;

pub use appointment::*;
pub use user::*;
