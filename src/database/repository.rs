use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::models::{Appointment, AppointmentStatus, DocAvatar, Gender, Role, User};
use crate::utils::AppError;

/// Alterações já validadas (e senha já com hash) aplicadas via `$set`
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub nic: Option<String>,
    pub dob: Option<chrono::NaiveDate>,
    pub gender: Option<Gender>,
    pub password_hash: Option<String>,
    pub doctor_department: Option<String>,
    pub doc_avatar: Option<DocAvatar>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
            && self.nic.is_none()
            && self.dob.is_none()
            && self.gender.is_none()
            && self.password_hash.is_none()
            && self.doctor_department.is_none()
            && self.doc_avatar.is_none()
    }
}

/// Persistence seam for the `users` collection.
///
/// Implementations must reject a second user with the same email atomically and
/// report it as [`AppError::DuplicateKey`]. Reads strip the password digest unless
/// `include_password` is set.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: User) -> Result<User, AppError>;

    async fn find_by_email(
        &self,
        email: &str,
        include_password: bool,
    ) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError>;

    async fn update(&self, id: &ObjectId, patch: &UserPatch) -> Result<Option<User>, AppError>;

    async fn count_by_role(&self, role: Role) -> Result<u64, AppError>;

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, AppError>;

    async fn find_doctors(
        &self,
        first_name: &str,
        last_name: &str,
        department: &str,
    ) -> Result<Vec<User>, AppError>;
}

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn insert(&self, appointment: Appointment) -> Result<Appointment, AppError>;

    async fn list_all(&self) -> Result<Vec<Appointment>, AppError>;

    /// Changes only `status`; `None` when the id does not exist
    async fn update_status(
        &self,
        id: &ObjectId,
        status: AppointmentStatus,
    ) -> Result<Option<Appointment>, AppError>;

    /// `false` when nothing was deleted
    async fn delete(&self, id: &ObjectId) -> Result<bool, AppError>;

    async fn count(&self) -> Result<u64, AppError>;
}
