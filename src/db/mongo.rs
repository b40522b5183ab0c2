use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Document};
use mongodb::{Client, Database};
use tokio_stream::StreamExt;

use super::store::{DocumentStore, UpdateOutcome};
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    database: Database,
}

impl MongoStore {
    pub async fn connect(database_url: &str, database_name: &str) -> AppResult<Self> {
        let client = Client::with_uri_str(database_url).await?;
        let database = client.database(database_name);
        Ok(Self { client, database })
    }

    fn collection(&self, name: &str) -> mongodb::Collection<Document> {
        self.database.collection::<Document>(name)
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert_one(&self, collection: &str, document: Document) -> AppResult<ObjectId> {
        let result = self.collection(collection).insert_one(document).await?;
        result.inserted_id.as_object_id().ok_or_else(|| {
            AppError::Internal(format!(
                "store assigned a non-ObjectId identifier: {}",
                result.inserted_id
            ))
        })
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        limit: i64,
    ) -> AppResult<Vec<Document>> {
        let cursor = self.collection(collection).find(filter).limit(limit).await?;
        let documents = cursor.collect::<Result<Vec<_>, _>>().await?;
        Ok(documents)
    }

    async fn find_one(&self, collection: &str, id: ObjectId) -> AppResult<Option<Document>> {
        Ok(self.collection(collection).find_one(doc! { "_id": id }).await?)
    }

    async fn update_one(
        &self,
        collection: &str,
        id: ObjectId,
        fields: Document,
    ) -> AppResult<UpdateOutcome> {
        let result = self
            .collection(collection)
            .update_one(doc! { "_id": id }, doc! { "$set": fields })
            .await?;
        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn delete_one(&self, collection: &str, id: ObjectId) -> AppResult<u64> {
        let result = self
            .collection(collection)
            .delete_one(doc! { "_id": id })
            .await?;
        Ok(result.deleted_count)
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
    ) -> AppResult<Vec<Document>> {
        let cursor = self.collection(collection).aggregate(pipeline).await?;
        let documents = cursor.collect::<Result<Vec<_>, _>>().await?;
        Ok(documents)
    }

    async fn ping(&self) -> AppResult<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn shutdown(&self) {
        self.client.clone().shutdown().await;
    }
}
