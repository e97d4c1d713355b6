use mongodb::{Client, Collection, Database};

use crate::utils::AppError;

pub mod appointments;
#[cfg(test)]
pub mod memory;
pub mod repository;
pub mod users;

pub use appointments::MongoAppointmentRepository;
pub use repository::*;
pub use users::MongoUserRepository;

pub const USERS_COLLECTION: &str = "users";
pub const APPOINTMENTS_COLLECTION: &str = "appointments";

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, AppError> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        // Timeouts: única limitação de uma operação lenta no store
        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes the application relies on.
    ///
    /// The unique index on `users.email` is what makes duplicate registration fail
    /// atomically, so a failure here aborts startup.
    async fn ensure_indexes(&self) -> Result<(), AppError> {
        use mongodb::bson::doc;
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        log::info!("🔧 Creating database indexes...");

        let users = self.collection::<mongodb::bson::Document>(USERS_COLLECTION);

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        users.create_index(email_index).await?;
        log::info!("   ✅ Index ready: users(email) unique");

        let role_index = IndexModel::builder().keys(doc! { "role": 1 }).build();

        match users.create_index(role_index).await {
            Ok(_) => log::info!("   ✅ Index ready: users(role)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}
