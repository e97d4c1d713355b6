use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
pub enum Role {
    Patient,
    Doctor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "Patient",
            Role::Doctor => "Doctor",
            Role::Admin => "Admin",
        }
    }

    /// Nome do cookie que transporta o token deste papel
    pub fn cookie_name(&self) -> &'static str {
        match self {
            Role::Admin => "adminToken",
            Role::Patient | Role::Doctor => "patientToken",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Patient" => Ok(Role::Patient),
            "Doctor" => Ok(Role::Doctor),
            "Admin" => Ok(Role::Admin),
            other => Err(format!("Invalid role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub enum Gender {
    Male,
    Female,
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            other => Err(format!("Invalid gender: {}", other)),
        }
    }
}

/// Referência ao avatar no storage externo (só os campos, sem upload)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DocAvatar {
    #[serde(default)]
    pub public_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Documento da collection "users"
///
/// `password` holds the bcrypt digest. Reads leave it `None` unless the caller
/// explicitly asks for it, and it never leaves the service through [`UserResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub nic: String,
    pub dob: chrono::NaiveDate,
    pub gender: Gender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub doctor_department: Option<String>,
    #[serde(default)]
    pub doc_avatar: DocAvatar,
}

impl User {
    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }
}

/// Campos brutos recebidos nas rotas de cadastro.
///
/// Everything is optional so missing fields surface as field-level validation errors
/// instead of a generic JSON deserialization failure. `role` is never read from the body;
/// the route decides it.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub nic: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub password: Option<String>,
    #[serde(skip_deserializing)]
    pub role: Option<Role>,
    pub doctor_department: Option<String>,
    pub doc_avatar: Option<DocAvatar>,
}

/// Alterações parciais de perfil; `None` mantém o valor armazenado
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub nic: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub password: Option<String>,
    pub doctor_department: Option<String>,
    pub doc_avatar: Option<DocAvatar>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    pub role: Option<String>,
}

/// Response de usuário (nunca inclui a senha)
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub nic: String,
    pub dob: chrono::NaiveDate,
    pub gender: Gender,
    pub role: Role,
    pub doctor_department: Option<String>,
    pub doc_avatar: DocAvatar,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id_hex(),
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            phone: user.phone,
            nic: user.nic,
            dob: user.dob,
            gender: user.gender,
            role: user.role,
            doctor_department: user.doctor_department,
            doc_avatar: user.doc_avatar,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: UserResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_str() {
        for role in [Role::Patient, Role::Doctor, Role::Admin] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_cookie_names_by_role() {
        assert_eq!(Role::Admin.cookie_name(), "adminToken");
        assert_eq!(Role::Patient.cookie_name(), "patientToken");
        assert_eq!(Role::Doctor.cookie_name(), "patientToken");
    }

    #[test]
    fn test_user_response_never_carries_password() {
        let user = User {
            id: Some(ObjectId::new()),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane@x.com".into(),
            phone: "1234567890".into(),
            nic: "123".into(),
            dob: chrono::NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            gender: Gender::Female,
            password: Some("$2b$10$digest".into()),
            role: Role::Patient,
            doctor_department: None,
            doc_avatar: DocAvatar::default(),
        };

        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["firstName"], "Jane");
        assert_eq!(json["role"], "Patient");
        assert_eq!(json["docAvatar"]["url"], serde_json::Value::Null);
    }
}
