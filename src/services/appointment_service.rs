use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;

use crate::database::AppointmentRepository;
use crate::models::{Appointment, AppointmentInput, AppointmentStatus, DoctorName, Gender, User};
use crate::services::user_service::UserService;
use crate::utils::validation::{first_error, FieldViolation, Violations};
use crate::utils::AppError;

/// Ids de rota malformados viram erro de validação no campo "id"
pub fn parse_object_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id.trim()).map_err(|_| AppError::validation("id", "Invalid id"))
}

/// Booking that passed validation but has no doctor resolved yet.
#[derive(Debug)]
struct AppointmentDraft {
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    nic: String,
    dob: NaiveDate,
    gender: Gender,
    appointment_date: String,
    department: String,
    doctor: DoctorName,
    has_visited: bool,
    address: String,
}

impl AppointmentDraft {
    fn into_appointment(self, patient_id: ObjectId, doctor_id: ObjectId) -> Appointment {
        Appointment {
            id: None,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            nic: self.nic,
            dob: self.dob,
            gender: self.gender,
            appointment_date: self.appointment_date,
            department: self.department,
            doctor: self.doctor,
            has_visited: self.has_visited,
            address: self.address,
            doctor_id,
            patient_id,
            status: AppointmentStatus::Pending,
        }
    }
}

/// Validates a booking in field order.
fn validate_appointment(input: &AppointmentInput) -> Result<AppointmentDraft, Vec<FieldViolation>> {
    let mut v = Violations::new();

    let first_name = v.name("firstName", "First Name", input.first_name.as_deref());
    let last_name = v.name("lastName", "Last Name", input.last_name.as_deref());
    let email = v.email(input.email.as_deref());
    let phone = v.phone(input.phone.as_deref());
    let nic = v.nic(input.nic.as_deref());
    let dob = v.dob(input.dob.as_deref());
    let gender = v.gender(input.gender.as_deref());
    let appointment_date = v
        .required(
            "appointment_date",
            "Appointment Date",
            input.appointment_date.as_deref(),
        )
        .map(str::to_string);
    let department = v
        .required("department", "Department Name", input.department.as_deref())
        .map(str::to_string);
    let doctor_first_name = v
        .required(
            "doctor_firstName",
            "Doctor First Name",
            input.doctor_first_name.as_deref(),
        )
        .map(str::to_string);
    let doctor_last_name = v
        .required(
            "doctor_lastName",
            "Doctor Last Name",
            input.doctor_last_name.as_deref(),
        )
        .map(str::to_string);
    let address = v
        .required("address", "Address", input.address.as_deref())
        .map(str::to_string);

    match (
        first_name,
        last_name,
        email,
        phone,
        nic,
        dob,
        gender,
        appointment_date,
        department,
        doctor_first_name,
        doctor_last_name,
        address,
    ) {
        (
            Some(first_name),
            Some(last_name),
            Some(email),
            Some(phone),
            Some(nic),
            Some(dob),
            Some(gender),
            Some(appointment_date),
            Some(department),
            Some(doctor_first_name),
            Some(doctor_last_name),
            Some(address),
        ) if v.is_empty() => Ok(AppointmentDraft {
            first_name,
            last_name,
            email,
            phone,
            nic,
            dob,
            gender,
            appointment_date,
            department,
            doctor: DoctorName {
                first_name: doctor_first_name,
                last_name: doctor_last_name,
            },
            has_visited: input.has_visited.unwrap_or(false),
            address,
        }),
        _ => Err(v.into_vec()),
    }
}

/// Appointment store. Doctor resolution goes through the user store.
#[derive(Clone)]
pub struct AppointmentService {
    repo: Arc<dyn AppointmentRepository>,
    users: UserService,
}

impl AppointmentService {
    pub fn new(repo: Arc<dyn AppointmentRepository>, users: UserService) -> Self {
        Self { repo, users }
    }

    pub async fn create(&self, input: AppointmentInput, patient: &User) -> Result<Appointment, AppError> {
        let patient_id = patient
            .id
            .ok_or_else(|| AppError::internal("authenticated patient without id"))?;

        let draft = validate_appointment(&input).map_err(first_error)?;

        let doctors = self
            .users
            .find_doctors(
                &draft.doctor.first_name,
                &draft.doctor.last_name,
                &draft.department,
            )
            .await?;

        let doctor = match doctors.as_slice() {
            [] => return Err(AppError::NotFound("Doctor not found".to_string())),
            [doctor] => doctor,
            _ => {
                log::warn!(
                    "⚠️  {} doctors match {} {} in {}",
                    doctors.len(),
                    draft.doctor.first_name,
                    draft.doctor.last_name,
                    draft.department
                );
                return Err(AppError::validation(
                    "doctor",
                    "Doctors conflict! Please contact through email or phone",
                ));
            }
        };

        let doctor_id = doctor
            .id
            .ok_or_else(|| AppError::internal("doctor record without id"))?;

        let created = self
            .repo
            .insert(draft.into_appointment(patient_id, doctor_id))
            .await?;
        log::info!(
            "✅ Appointment created: patient={} doctor={} date={}",
            created.patient_id.to_hex(),
            created.doctor_id.to_hex(),
            created.appointment_date
        );

        Ok(created)
    }

    pub async fn list_all(&self) -> Result<Vec<Appointment>, AppError> {
        self.repo.list_all().await
    }

    pub async fn update_status(&self, id: &str, status: &str) -> Result<Appointment, AppError> {
        let oid = parse_object_id(id)?;
        let status: AppointmentStatus = status
            .trim()
            .parse()
            .map_err(|e: String| AppError::validation("status", e))?;

        self.repo
            .update_status(&oid, status)
            .await?
            .ok_or_else(|| AppError::NotFound("Appointment not found!".to_string()))
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let oid = parse_object_id(id)?;
        if self.repo.delete(&oid).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Appointment not found!".to_string()))
        }
    }

    pub async fn count(&self) -> Result<u64, AppError> {
        self.repo.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::{InMemoryAppointmentRepository, InMemoryUserRepository};
    use crate::models::{Role, UserInput};
    use crate::services::password_service::PasswordHasher;

    fn person(first: &str, last: &str, email: &str, role: Role) -> UserInput {
        UserInput {
            first_name: Some(first.into()),
            last_name: Some(last.into()),
            email: Some(email.into()),
            phone: Some("1234567890".into()),
            nic: Some("123".into()),
            dob: Some("1990-01-01".into()),
            gender: Some("Female".into()),
            password: Some("secretpw".into()),
            role: Some(role),
            doctor_department: Some("Diagnostics".into()),
            ..Default::default()
        }
    }

    fn booking() -> AppointmentInput {
        AppointmentInput {
            first_name: Some("Jane".into()),
            last_name: Some("Doe".into()),
            email: Some("jane@x.com".into()),
            phone: Some("1234567890".into()),
            nic: Some("123".into()),
            dob: Some("1990-01-01".into()),
            gender: Some("Female".into()),
            appointment_date: Some("2024-05-01".into()),
            department: Some("Diagnostics".into()),
            doctor_first_name: Some("Gregory".into()),
            doctor_last_name: Some("House".into()),
            has_visited: None,
            address: Some("221B Baker Street".into()),
        }
    }

    async fn setup() -> (AppointmentService, UserService, User) {
        let users = UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            PasswordHasher::default(),
        );
        let service = AppointmentService::new(
            Arc::new(InMemoryAppointmentRepository::new()),
            users.clone(),
        );
        let patient = users
            .create(person("Jane", "Doe", "jane@x.com", Role::Patient))
            .await
            .unwrap();
        (service, users, patient)
    }

    #[tokio::test]
    async fn test_create_resolves_doctor_and_patient() {
        let (service, users, patient) = setup().await;
        let doctor = users
            .create(person("Gregory", "House", "house@x.com", Role::Doctor))
            .await
            .unwrap();

        let created = service.create(booking(), &patient).await.unwrap();
        assert_eq!(created.doctor_id, doctor.id.unwrap());
        assert_eq!(created.patient_id, patient.id.unwrap());
        assert_eq!(created.status, AppointmentStatus::Pending);
        assert!(!created.has_visited);
        assert_eq!(service.count().await.unwrap(), 1);
    }

    #[test]
    fn test_draft_takes_ids_from_caller() {
        let draft = validate_appointment(&booking()).unwrap();
        assert_eq!(draft.doctor.last_name, "House");
        assert!(!draft.has_visited);

        let patient_id = ObjectId::new();
        let doctor_id = ObjectId::new();
        let appointment = draft.into_appointment(patient_id, doctor_id);
        assert_eq!(appointment.patient_id, patient_id);
        assert_eq!(appointment.doctor_id, doctor_id);
        assert_eq!(appointment.status, AppointmentStatus::Pending);
        assert!(appointment.id.is_none());
    }

    #[tokio::test]
    async fn test_create_without_matching_doctor() {
        let (service, _, patient) = setup().await;

        let err = service.create(booking(), &patient).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "Doctor not found"));
        assert_eq!(service.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_with_ambiguous_doctor() {
        let (service, users, patient) = setup().await;
        users
            .create(person("Gregory", "House", "house@x.com", Role::Doctor))
            .await
            .unwrap();
        users
            .create(person("Gregory", "House", "house2@x.com", Role::Doctor))
            .await
            .unwrap();

        let err = service.create(booking(), &patient).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "doctor"));
    }

    #[tokio::test]
    async fn test_create_validates_fields() {
        let (service, _, patient) = setup().await;
        let mut input = booking();
        input.address = None;

        let err = service.create(input, &patient).await.unwrap_err();
        match err {
            AppError::Validation { field, message } => {
                assert_eq!(field, "address");
                assert_eq!(message, "Address is required!");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_status_changes_only_status() {
        let (service, users, patient) = setup().await;
        users
            .create(person("Gregory", "House", "house@x.com", Role::Doctor))
            .await
            .unwrap();
        let created = service.create(booking(), &patient).await.unwrap();
        let id = created.id.unwrap().to_hex();

        let updated = service.update_status(&id, "Accepted").await.unwrap();
        assert_eq!(updated.status, AppointmentStatus::Accepted);
        assert_eq!(updated.appointment_date, created.appointment_date);
        assert_eq!(updated.doctor_id, created.doctor_id);
        assert_eq!(updated.address, created.address);

        let err = service.update_status(&id, "Done").await.unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "status"));
    }

    #[tokio::test]
    async fn test_missing_and_malformed_ids() {
        let (service, _, _) = setup().await;
        let missing = ObjectId::new().to_hex();

        let err = service.update_status(&missing, "Accepted").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = service.delete(&missing).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = service.delete("xyz").await.unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "id"));
    }

    #[tokio::test]
    async fn test_delete_removes_appointment() {
        let (service, users, patient) = setup().await;
        users
            .create(person("Gregory", "House", "house@x.com", Role::Doctor))
            .await
            .unwrap();
        let created = service.create(booking(), &patient).await.unwrap();
        let id = created.id.unwrap().to_hex();

        service.delete(&id).await.unwrap();
        assert_eq!(service.count().await.unwrap(), 0);
        assert!(service.list_all().await.unwrap().is_empty());
    }
}
