use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    Collection, Database as MongoDatabase,
};

use crate::errors::AppError;
use crate::models::{Lead, NewLead};

/// Name of the MongoDB collection that holds lead documents.
pub const LEAD_COLLECTION_NAME: &str = "leads";

/// Safety bound on list results. Not pagination; just a cap so a runaway
/// collection cannot be streamed back wholesale.
pub const LIST_LIMIT: i64 = 1000;

/// Durable store for lead records. Knows nothing about HTTP or business
/// rules; exists as a trait so tests can substitute an in-memory fake.
#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// Inserts the record and returns the full stored document, including the
    /// store-generated identifier.
    async fn create(&self, record: NewLead) -> Result<Lead, AppError>;

    /// Returns up to [`LIST_LIMIT`] leads.
    async fn list(&self) -> Result<Vec<Lead>, AppError>;

    /// Looks a lead up by its identifier. A syntactically invalid identifier
    /// is indistinguishable from an absent one: both return `Ok(None)`.
    async fn get_by_id(&self, id: &str) -> Result<Option<Lead>, AppError>;
}

/// MongoDB implementation of [`LeadRepository`].
#[derive(Clone)]
pub struct MongoLeadRepository {
    db: MongoDatabase,
}

impl MongoLeadRepository {
    pub fn new(db: MongoDatabase) -> Self {
        Self { db }
    }

    fn leads(&self) -> Collection<Lead> {
        self.db.collection(LEAD_COLLECTION_NAME)
    }
}

#[async_trait]
impl LeadRepository for MongoLeadRepository {
    async fn create(&self, record: NewLead) -> Result<Lead, AppError> {
        let collection = self.db.collection::<NewLead>(LEAD_COLLECTION_NAME);
        let result = collection.insert_one(&record).await?;

        let inserted_id = result.inserted_id.as_object_id().ok_or_else(|| {
            AppError::InternalError("insert did not yield an ObjectId".to_string())
        })?;

        // Re-read the stored document so the caller gets back exactly what
        // the store holds, identifier included.
        let created = self.leads().find_one(doc! { "_id": inserted_id }).await?;

        created.ok_or_else(|| {
            AppError::InternalError(format!("inserted lead {} not found on re-read", inserted_id))
        })
    }

    async fn list(&self) -> Result<Vec<Lead>, AppError> {
        let cursor = self.leads().find(doc! {}).limit(LIST_LIMIT).await?;
        let leads = cursor.try_collect().await?;

        Ok(leads)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Lead>, AppError> {
        // An identifier that does not parse as an ObjectId cannot match any
        // stored document, so it is reported the same way: not found.
        let object_id = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => return Ok(None),
        };

        let lead = self.leads().find_one(doc! { "_id": object_id }).await?;
        Ok(lead)
    }
}
