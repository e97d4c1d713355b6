use mongodb::bson::oid::ObjectId;
use std::sync::Arc;

use crate::database::{UserPatch, UserRepository};
use crate::models::{Role, User, UserChanges, UserInput};
use crate::services::password_service::PasswordHasher;
use crate::utils::validation::{first_error, FieldViolation, Violations};
use crate::utils::AppError;

/// Usuário validado, ainda com a senha em texto puro
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user: User,
    pub plaintext_password: String,
}

/// Checks every field of a registration and returns all violations in field order.
///
/// `role` comes from the route, never from the body. `doctorDepartment` is required for
/// doctors and dropped for everyone else.
pub fn validate_user(input: &UserInput) -> Result<NewUser, Vec<FieldViolation>> {
    let mut v = Violations::new();

    let first_name = v.name("firstName", "First Name", input.first_name.as_deref());
    let last_name = v.name("lastName", "Last Name", input.last_name.as_deref());
    let email = v.email(input.email.as_deref());
    let phone = v.phone(input.phone.as_deref());
    let nic = v.nic(input.nic.as_deref());
    let dob = v.dob(input.dob.as_deref());
    let gender = v.gender(input.gender.as_deref());
    let password = v.password(input.password.as_deref());

    let role = input.role;
    if role.is_none() {
        v.push("role", "User Role is required!");
    }

    let doctor_department = match role {
        Some(Role::Doctor) => v
            .required(
                "doctorDepartment",
                "Doctor Department",
                input.doctor_department.as_deref(),
            )
            .map(str::to_string),
        _ => None,
    };

    match (first_name, last_name, email, phone, nic, dob, gender, password, role) {
        (
            Some(first_name),
            Some(last_name),
            Some(email),
            Some(phone),
            Some(nic),
            Some(dob),
            Some(gender),
            Some(password),
            Some(role),
        ) if v.is_empty() => Ok(NewUser {
            user: User {
                id: None,
                first_name,
                last_name,
                email,
                phone,
                nic,
                dob,
                gender,
                password: None,
                role,
                doctor_department,
                doc_avatar: input.doc_avatar.clone().unwrap_or_default(),
            },
            plaintext_password: password,
        }),
        _ => Err(v.into_vec()),
    }
}

/// Valida só os campos presentes em `changes`
fn validate_changes(
    changes: &UserChanges,
    role: Role,
) -> Result<(UserPatch, Option<String>), Vec<FieldViolation>> {
    let mut v = Violations::new();
    let mut patch = UserPatch::default();

    if changes.first_name.is_some() {
        patch.first_name = v.name("firstName", "First Name", changes.first_name.as_deref());
    }
    if changes.last_name.is_some() {
        patch.last_name = v.name("lastName", "Last Name", changes.last_name.as_deref());
    }
    if changes.phone.is_some() {
        patch.phone = v.phone(changes.phone.as_deref());
    }
    if changes.nic.is_some() {
        patch.nic = v.nic(changes.nic.as_deref());
    }
    if changes.dob.is_some() {
        patch.dob = v.dob(changes.dob.as_deref());
    }
    if changes.gender.is_some() {
        patch.gender = v.gender(changes.gender.as_deref());
    }
    if role == Role::Doctor && changes.doctor_department.is_some() {
        patch.doctor_department = v
            .required(
                "doctorDepartment",
                "Doctor Department",
                changes.doctor_department.as_deref(),
            )
            .map(str::to_string);
    }
    patch.doc_avatar = changes.doc_avatar.clone();

    let password = match changes.password {
        Some(_) => v.password(changes.password.as_deref()),
        None => None,
    };

    if v.is_empty() {
        Ok((patch, password))
    } else {
        Err(v.into_vec())
    }
}

/// Ids vindos de tokens ou de rotas; qualquer formato inválido conta como inexistente
fn parse_user_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::NotFound("User not found".to_string()))
}

/// User store: validation, the pre-persist hashing step and reads over a [`UserRepository`].
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, hasher: PasswordHasher) -> Self {
        Self { repo, hasher }
    }

    pub async fn create(&self, input: UserInput) -> Result<User, AppError> {
        let NewUser {
            mut user,
            plaintext_password,
        } = validate_user(&input).map_err(first_error)?;

        user.password = Some(self.hasher.hash_blocking(plaintext_password).await?);

        let mut created = self.repo.insert(user).await?;
        created.password = None;

        log::info!(
            "✅ User created: {} ({}) id={}",
            created.email,
            created.role,
            created.id_hex()
        );

        Ok(created)
    }

    pub async fn find_by_email(&self, email: &str, include_password: bool) -> Result<User, AppError> {
        self.repo
            .find_by_email(email, include_password)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn find_by_id(&self, id: &str) -> Result<User, AppError> {
        let oid = parse_user_id(id)?;
        self.repo
            .find_by_id(&oid)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// The user must have been loaded with `include_password = true`.
    pub async fn compare_password(&self, user: &User, plaintext: &str) -> Result<bool, AppError> {
        let digest = user
            .password
            .clone()
            .ok_or_else(|| AppError::internal("password digest not loaded"))?;

        self.hasher
            .verify_blocking(plaintext.to_string(), digest)
            .await
    }

    pub async fn count_by_role(&self, role: Role) -> Result<u64, AppError> {
        self.repo.count_by_role(role).await
    }

    pub async fn list_by_role(&self, role: Role) -> Result<Vec<User>, AppError> {
        self.repo.list_by_role(role).await
    }

    /// Partial profile update. Role and email cannot change; the password is re-hashed
    /// only when a new one is supplied.
    pub async fn update(&self, id: &str, changes: UserChanges) -> Result<User, AppError> {
        let current = self.find_by_id(id).await?;
        let oid = parse_user_id(id)?;

        let (mut patch, password) = validate_changes(&changes, current.role).map_err(first_error)?;

        if let Some(plaintext) = password {
            patch.password_hash = Some(self.hasher.hash_blocking(plaintext).await?);
        }

        if patch.is_empty() {
            return Ok(current);
        }

        self.repo
            .update(&oid, &patch)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn find_doctors(
        &self,
        first_name: &str,
        last_name: &str,
        department: &str,
    ) -> Result<Vec<User>, AppError> {
        self.repo
            .find_doctors(first_name.trim(), last_name.trim(), department.trim())
            .await
    }
}
