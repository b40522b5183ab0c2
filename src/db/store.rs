use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::Document;

use crate::error::AppResult;

/// Counts reported by [`DocumentStore::update_one`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

/// Document store interface used by the resource services.
///
/// Collections are addressed by name and documents are plain BSON; the
/// services own the mapping to and from typed models.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts a document without `_id` and returns the id the store assigned.
    async fn insert_one(&self, collection: &str, document: Document) -> AppResult<ObjectId>;

    /// Returns up to `limit` documents matching `filter`, in store order.
    async fn find(&self, collection: &str, filter: Document, limit: i64)
        -> AppResult<Vec<Document>>;

    async fn find_one(&self, collection: &str, id: ObjectId) -> AppResult<Option<Document>>;

    /// Applies `fields` with `$set` semantics to the document with the given id.
    async fn update_one(
        &self,
        collection: &str,
        id: ObjectId,
        fields: Document,
    ) -> AppResult<UpdateOutcome>;

    /// Returns the number of documents removed (0 or 1).
    async fn delete_one(&self, collection: &str, id: ObjectId) -> AppResult<u64>;

    async fn aggregate(&self, collection: &str, pipeline: Vec<Document>)
        -> AppResult<Vec<Document>>;

    async fn ping(&self) -> AppResult<()>;

    async fn shutdown(&self);
}
