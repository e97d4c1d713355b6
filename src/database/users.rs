use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, to_bson, Document};
use mongodb::Collection;

use super::{MongoDB, UserPatch, UserRepository, USERS_COLLECTION};
use crate::models::{Role, User};
use crate::utils::AppError;

/// Projeção que remove o hash da senha das leituras normais
fn without_password() -> Document {
    doc! { "password": 0 }
}

#[derive(Clone)]
pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &MongoDB) -> Self {
        Self {
            collection: db.collection::<User>(USERS_COLLECTION),
        }
    }
}

fn patch_to_set(patch: &UserPatch) -> Result<Document, AppError> {
    let mut set = Document::new();

    if let Some(v) = &patch.first_name {
        set.insert("firstName", v.clone());
    }
    if let Some(v) = &patch.last_name {
        set.insert("lastName", v.clone());
    }
    if let Some(v) = &patch.phone {
        set.insert("phone", v.clone());
    }
    if let Some(v) = &patch.nic {
        set.insert("nic", v.clone());
    }
    if let Some(v) = &patch.dob {
        set.insert("dob", to_bson(v).map_err(AppError::internal)?);
    }
    if let Some(v) = &patch.gender {
        set.insert("gender", to_bson(v).map_err(AppError::internal)?);
    }
    if let Some(v) = &patch.password_hash {
        set.insert("password", v.clone());
    }
    if let Some(v) = &patch.doctor_department {
        set.insert("doctorDepartment", v.clone());
    }
    if let Some(v) = &patch.doc_avatar {
        set.insert("docAvatar", to_bson(v).map_err(AppError::internal)?);
    }

    Ok(set)
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn insert(&self, mut user: User) -> Result<User, AppError> {
        user.id = None;
        let result = self.collection.insert_one(&user).await?;
        user.id = result.inserted_id.as_object_id();
        Ok(user)
    }

    async fn find_by_email(
        &self,
        email: &str,
        include_password: bool,
    ) -> Result<Option<User>, AppError> {
        let filter = doc! { "email": email.trim().to_lowercase() };

        let user = if include_password {
            self.collection.find_one(filter).await?
        } else {
            self.collection
                .find_one(filter)
                .projection(without_password())
                .await?
        };

        Ok(user)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError> {
        Ok(self
            .collection
            .find_one(doc! { "_id": *id })
            .projection(without_password())
            .await?)
    }

    async fn update(&self, id: &ObjectId, patch: &UserPatch) -> Result<Option<User>, AppError> {
        let set = patch_to_set(patch)?;

        if !set.is_empty() {
            let result = self
                .collection
                .update_one(doc! { "_id": *id }, doc! { "$set": set })
                .await?;

            if result.matched_count == 0 {
                return Ok(None);
            }
        }

        self.find_by_id(id).await
    }

    async fn count_by_role(&self, role: Role) -> Result<u64, AppError> {
        Ok(self
            .collection
            .count_documents(doc! { "role": role.as_str() })
            .await?)
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, AppError> {
        let cursor = self
            .collection
            .find(doc! { "role": role.as_str() })
            .projection(without_password())
            .await?;

        let users: Vec<User> = cursor.try_collect().await?;
        Ok(users)
    }

    async fn find_doctors(
        &self,
        first_name: &str,
        last_name: &str,
        department: &str,
    ) -> Result<Vec<User>, AppError> {
        let filter = doc! {
            "firstName": first_name,
            "lastName": last_name,
            "role": Role::Doctor.as_str(),
            "doctorDepartment": department,
        };

        let cursor = self
            .collection
            .find(filter)
            .projection(without_password())
            .await?;

        let users: Vec<User> = cursor.try_collect().await?;
        Ok(users)
    }
}
