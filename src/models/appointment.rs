use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Gender;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "Pending",
            AppointmentStatus::Accepted => "Accepted",
            AppointmentStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(AppointmentStatus::Pending),
            "Accepted" => Ok(AppointmentStatus::Accepted),
            "Rejected" => Ok(AppointmentStatus::Rejected),
            other => Err(format!(
                "Invalid status: {}. Supported: Pending, Accepted, Rejected",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorName {
    pub first_name: String,
    pub last_name: String,
}

/// Documento da collection "appointments"
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub nic: String,
    pub dob: chrono::NaiveDate,
    pub gender: Gender,
    #[serde(rename = "appointment_date")]
    pub appointment_date: String,
    pub department: String,
    pub doctor: DoctorName,
    #[serde(default)]
    pub has_visited: bool,
    pub address: String,
    pub doctor_id: ObjectId,
    pub patient_id: ObjectId,
    #[serde(default)]
    pub status: AppointmentStatus,
}

/// Request para criar consulta
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub nic: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    #[serde(rename = "appointment_date")]
    pub appointment_date: Option<String>,
    pub department: Option<String>,
    #[serde(alias = "doctor_firstName")]
    pub doctor_first_name: Option<String>,
    #[serde(alias = "doctor_lastName")]
    pub doctor_last_name: Option<String>,
    pub has_visited: Option<bool>,
    pub address: Option<String>,
}

/// Request para atualizar status
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

/// Response de consulta
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub nic: String,
    pub dob: chrono::NaiveDate,
    pub gender: Gender,
    #[serde(rename = "appointment_date")]
    pub appointment_date: String,
    pub department: String,
    pub doctor: DoctorName,
    pub has_visited: bool,
    pub address: String,
    pub doctor_id: String,
    pub patient_id: String,
    pub status: AppointmentStatus,
}

impl From<Appointment> for AppointmentResponse {
    fn from(a: Appointment) -> Self {
        AppointmentResponse {
            id: a.id.map(|id| id.to_hex()).unwrap_or_default(),
            first_name: a.first_name,
            last_name: a.last_name,
            email: a.email,
            phone: a.phone,
            nic: a.nic,
            dob: a.dob,
            gender: a.gender,
            appointment_date: a.appointment_date,
            department: a.department,
            doctor: a.doctor,
            has_visited: a.has_visited,
            address: a.address,
            doctor_id: a.doctor_id.to_hex(),
            patient_id: a.patient_id.to_hex(),
            status: a.status,
        }
    }
}
