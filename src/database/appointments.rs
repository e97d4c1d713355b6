use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::ReturnDocument;
use mongodb::Collection;

use super::{AppointmentRepository, MongoDB, APPOINTMENTS_COLLECTION};
use crate::models::{Appointment, AppointmentStatus};
use crate::utils::AppError;

#[derive(Clone)]
pub struct MongoAppointmentRepository {
    collection: Collection<Appointment>,
}

impl MongoAppointmentRepository {
    pub fn new(db: &MongoDB) -> Self {
        Self {
            collection: db.collection::<Appointment>(APPOINTMENTS_COLLECTION),
        }
    }
}

#[async_trait]
impl AppointmentRepository for MongoAppointmentRepository {
    async fn insert(&self, mut appointment: Appointment) -> Result<Appointment, AppError> {
        appointment.id = None;
        let result = self.collection.insert_one(&appointment).await?;
        appointment.id = result.inserted_id.as_object_id();
        Ok(appointment)
    }

    async fn list_all(&self) -> Result<Vec<Appointment>, AppError> {
        let cursor = self.collection.find(doc! {}).await?;
        let appointments: Vec<Appointment> = cursor.try_collect().await?;
        Ok(appointments)
    }

    async fn update_status(
        &self,
        id: &ObjectId,
        status: AppointmentStatus,
    ) -> Result<Option<Appointment>, AppError> {
        Ok(self
            .collection
            .find_one_and_update(
                doc! { "_id": *id },
                doc! { "$set": { "status": status.as_str() } },
            )
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, AppError> {
        let result = self.collection.delete_one(doc! { "_id": *id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn count(&self) -> Result<u64, AppError> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }
}
