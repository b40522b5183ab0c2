use std::sync::Arc;

use bson::Document;
use chrono::Utc;

use crate::db::DocumentStore;
use crate::error::{AppError, AppResult};
use crate::ids;
use crate::models::{EmailCount, Item, ItemModel, ItemPayload, ITEMS_COLLECTION};
use crate::query::{ItemFilter, RESULT_LIMIT};
use crate::services::aggregation::AggregationReporter;

const NOT_FOUND: &str = "Item not found";

pub struct ItemsService {
    store: Arc<dyn DocumentStore>,
    reporter: AggregationReporter,
}

impl ItemsService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let reporter = AggregationReporter::new(store.clone());
        Self { store, reporter }
    }

    fn model_to_response(model: ItemModel) -> AppResult<Item> {
        let id = model
            .id
            .ok_or_else(|| AppError::Internal("stored item has no _id".to_string()))?;
        Ok(Item {
            id: ids::encode(&id),
            name: model.name,
            email: model.email,
            item_name: model.item_name,
            quantity: model.quantity,
            expiry_date: model.expiry_date,
            inserted_data: model.inserted_data,
        })
    }

    fn document_to_response(document: Document) -> AppResult<Item> {
        let model: ItemModel = bson::from_document(document)?;
        Self::model_to_response(model)
    }

    pub async fn create_item(&self, payload: ItemPayload) -> AppResult<Item> {
        payload.validate()?;

        let mut model = ItemModel::from_payload(payload, Utc::now());
        let document = bson::to_document(&model)?;
        let id = self.store.insert_one(ITEMS_COLLECTION, document).await?;
        model.id = Some(id);

        tracing::info!("Created item: id={}, email={}", id, model.email);
        Self::model_to_response(model)
    }

    pub async fn filter_items(&self, filter: &ItemFilter) -> AppResult<Vec<Item>> {
        let predicate = filter.to_predicate();
        tracing::debug!("Filtering items: {}", predicate);

        self.store
            .find(ITEMS_COLLECTION, predicate, RESULT_LIMIT)
            .await?
            .into_iter()
            .map(Self::document_to_response)
            .collect()
    }

    pub async fn aggregate_by_email(&self) -> AppResult<Vec<EmailCount>> {
        self.reporter.count_items_by_email().await
    }

    pub async fn get_item(&self, id: &str) -> AppResult<Item> {
        let id = ids::decode(id)?;

        match self.store.find_one(ITEMS_COLLECTION, id).await? {
            Some(document) => Self::document_to_response(document),
            None => {
                tracing::debug!("Item lookup missed: id={}", id);
                Err(AppError::NotFound(NOT_FOUND.to_string()))
            }
        }
    }

    /// Replaces every client-supplied field and re-stamps `inserted_data`.
    pub async fn update_item(&self, id: &str, payload: ItemPayload) -> AppResult<()> {
        payload.validate()?;
        let id = ids::decode(id)?;

        let model = ItemModel::from_payload(payload, Utc::now());
        let fields = bson::to_document(&model)?;
        let outcome = self.store.update_one(ITEMS_COLLECTION, id, fields).await?;

        // An unmatched id and a no-op replacement both surface as not found.
        if outcome.modified == 0 {
            tracing::debug!(
                "Item update had no effect: id={}, matched={}",
                id,
                outcome.matched
            );
            return Err(AppError::NotFound(NOT_FOUND.to_string()));
        }

        tracing::info!("Updated item: id={}", id);
        Ok(())
    }

    pub async fn delete_item(&self, id: &str) -> AppResult<()> {
        let id = ids::decode(id)?;

        let deleted = self.store.delete_one(ITEMS_COLLECTION, id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound(NOT_FOUND.to_string()));
        }

        tracing::info!("Deleted item: id={}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryStore;
    use chrono::{DateTime, TimeZone};

    fn service() -> ItemsService {
        ItemsService::new(Arc::new(InMemoryStore::new()))
    }

    fn payload(email: &str, quantity: i64, expiry: DateTime<Utc>) -> ItemPayload {
        ItemPayload {
            name: "Test Item".to_string(),
            email: email.to_string(),
            item_name: "Widget".to_string(),
            quantity,
            expiry_date: expiry,
            client_inserted_data: None,
        }
    }

    fn expiry() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_create_then_get_round_trips_client_fields() {
        let service = service();
        let created = service
            .create_item(payload("a@b.com", 5, expiry()))
            .await
            .unwrap();

        let fetched = service.get_item(&created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.email, "a@b.com");
        assert_eq!(fetched.quantity, 5);
        assert_eq!(fetched.expiry_date, expiry());
    }

    #[tokio::test]
    async fn test_create_rejects_bad_email() {
        let result = service().create_item(payload("nope", 1, expiry())).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_rejects_malformed_id() {
        let result = service().get_item("not-an-id").await;
        assert!(matches!(result, Err(AppError::InvalidIdentifier(_))));
    }

    #[tokio::test]
    async fn test_filter_uses_lower_bounds() {
        let service = service();
        for quantity in [1, 5, 10] {
            service
                .create_item(payload("a@b.com", quantity, expiry()))
                .await
                .unwrap();
        }
        service
            .create_item(payload("c@d.com", 50, expiry()))
            .await
            .unwrap();

        let filter = ItemFilter {
            email: Some("a@b.com".to_string()),
            quantity: Some(5),
            ..Default::default()
        };
        let found = service.filter_items(&filter).await.unwrap();
        let mut quantities: Vec<i64> = found.iter().map(|i| i.quantity).collect();
        quantities.sort();
        assert_eq!(quantities, vec![5, 10]);

        let later = ItemFilter {
            expiry_date: Some(expiry() + chrono::Duration::days(1)),
            ..Default::default()
        };
        assert!(service.filter_items(&later).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_filter_is_capped() {
        let service = service();
        for _ in 0..(RESULT_LIMIT + 5) {
            service
                .create_item(payload("a@b.com", 1, expiry()))
                .await
                .unwrap();
        }
        let found = service.filter_items(&ItemFilter::default()).await.unwrap();
        assert_eq!(found.len() as i64, RESULT_LIMIT);
    }

    #[tokio::test]
    async fn test_update_restamps_inserted_data() {
        let service = service();
        let created = service
            .create_item(payload("a@b.com", 5, expiry()))
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        service
            .update_item(&created.id, payload("a@b.com", 7, expiry()))
            .await
            .unwrap();

        let fetched = service.get_item(&created.id).await.unwrap();
        assert_eq!(fetched.quantity, 7);
        assert!(fetched.inserted_data > created.inserted_data);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let result = service()
            .update_item(
                &ids::encode(&bson::oid::ObjectId::new()),
                payload("a@b.com", 1, expiry()),
            )
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let service = service();
        let created = service
            .create_item(payload("a@b.com", 5, expiry()))
            .await
            .unwrap();

        service.delete_item(&created.id).await.unwrap();
        assert!(matches!(
            service.get_item(&created.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_item(&created.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
