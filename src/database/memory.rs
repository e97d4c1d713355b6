//! In-memory repositories for tests, with the same contracts as the MongoDB ones.

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::sync::Mutex;

use super::{AppointmentRepository, UserPatch, UserRepository};
use crate::models::{Appointment, AppointmentStatus, Role, User};
use crate::utils::AppError;

fn strip_password(mut user: User) -> User {
    user.password = None;
    user
}

/// Mesmo efeito do `$set` montado pelo repositório MongoDB
fn apply_patch(patch: &UserPatch, user: &mut User) {
    if let Some(v) = &patch.first_name {
        user.first_name = v.clone();
    }
    if let Some(v) = &patch.last_name {
        user.last_name = v.clone();
    }
    if let Some(v) = &patch.phone {
        user.phone = v.clone();
    }
    if let Some(v) = &patch.nic {
        user.nic = v.clone();
    }
    if let Some(v) = patch.dob {
        user.dob = v;
    }
    if let Some(v) = patch.gender {
        user.gender = v;
    }
    if let Some(v) = &patch.password_hash {
        user.password = Some(v.clone());
    }
    if let Some(v) = &patch.doctor_department {
        user.doctor_department = Some(v.clone());
    }
    if let Some(v) = &patch.doc_avatar {
        user.doc_avatar = v.clone();
    }
}

fn poisoned<T>(_: T) -> AppError {
    AppError::Internal("store lock poisoned".to_string())
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leitura crua (inclui o hash) para asserts nos testes
    pub fn raw(&self, id: &ObjectId) -> Option<User> {
        self.users
            .lock()
            .ok()?
            .iter()
            .find(|u| u.id.as_ref() == Some(id))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.users.lock().map(|u| u.len()).unwrap_or(0)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, mut user: User) -> Result<User, AppError> {
        let mut users = self.users.lock().map_err(poisoned)?;

        // Verificação e inserção sob o mesmo lock, como o índice único
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::DuplicateKey {
                field: "email".to_string(),
            });
        }

        user.id = Some(ObjectId::new());
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(
        &self,
        email: &str,
        include_password: bool,
    ) -> Result<Option<User>, AppError> {
        let email = email.trim().to_lowercase();
        let users = self.users.lock().map_err(poisoned)?;
        let found = users.iter().find(|u| u.email == email).cloned();

        Ok(if include_password {
            found
        } else {
            found.map(strip_password)
        })
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError> {
        let users = self.users.lock().map_err(poisoned)?;
        Ok(users
            .iter()
            .find(|u| u.id.as_ref() == Some(id))
            .cloned()
            .map(strip_password))
    }

    async fn update(&self, id: &ObjectId, patch: &UserPatch) -> Result<Option<User>, AppError> {
        let mut users = self.users.lock().map_err(poisoned)?;
        Ok(users
            .iter_mut()
            .find(|u| u.id.as_ref() == Some(id))
            .map(|user| {
                apply_patch(patch, user);
                strip_password(user.clone())
            }))
    }

    async fn count_by_role(&self, role: Role) -> Result<u64, AppError> {
        let users = self.users.lock().map_err(poisoned)?;
        Ok(users.iter().filter(|u| u.role == role).count() as u64)
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, AppError> {
        let users = self.users.lock().map_err(poisoned)?;
        Ok(users
            .iter()
            .filter(|u| u.role == role)
            .cloned()
            .map(strip_password)
            .collect())
    }

    async fn find_doctors(
        &self,
        first_name: &str,
        last_name: &str,
        department: &str,
    ) -> Result<Vec<User>, AppError> {
        let users = self.users.lock().map_err(poisoned)?;
        Ok(users
            .iter()
            .filter(|u| {
                u.role == Role::Doctor
                    && u.first_name == first_name
                    && u.last_name == last_name
                    && u.doctor_department.as_deref() == Some(department)
            })
            .cloned()
            .map(strip_password)
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryAppointmentRepository {
    appointments: Mutex<Vec<Appointment>>,
}

impl InMemoryAppointmentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryAppointmentRepository {
    async fn insert(&self, mut appointment: Appointment) -> Result<Appointment, AppError> {
        let mut appointments = self.appointments.lock().map_err(poisoned)?;
        appointment.id = Some(ObjectId::new());
        appointments.push(appointment.clone());
        Ok(appointment)
    }

    async fn list_all(&self) -> Result<Vec<Appointment>, AppError> {
        Ok(self.appointments.lock().map_err(poisoned)?.clone())
    }

    async fn update_status(
        &self,
        id: &ObjectId,
        status: AppointmentStatus,
    ) -> Result<Option<Appointment>, AppError> {
        let mut appointments = self.appointments.lock().map_err(poisoned)?;
        Ok(appointments
            .iter_mut()
            .find(|a| a.id.as_ref() == Some(id))
            .map(|a| {
                a.status = status;
                a.clone()
            }))
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, AppError> {
        let mut appointments = self.appointments.lock().map_err(poisoned)?;
        let before = appointments.len();
        appointments.retain(|a| a.id.as_ref() != Some(id));
        Ok(appointments.len() < before)
    }

    async fn count(&self) -> Result<u64, AppError> {
        Ok(self.appointments.lock().map_err(poisoned)?.len() as u64)
    }
}
