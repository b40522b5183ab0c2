use std::sync::Arc;

use bson::{doc, Document};
use chrono::Utc;

use crate::db::DocumentStore;
use crate::error::{AppError, AppResult};
use crate::ids;
use crate::models::{ClockIn, ClockInCreated, ClockInModel, ClockInPayload, CLOCK_IN_COLLECTION};
use crate::query::{ClockInFilter, RESULT_LIMIT};

const NOT_FOUND: &str = "Clock in not found";

pub struct ClockInService {
    store: Arc<dyn DocumentStore>,
}

impl ClockInService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn document_to_response(document: Document) -> AppResult<ClockIn> {
        let model: ClockInModel = bson::from_document(document)?;
        let id = model
            .id
            .ok_or_else(|| AppError::Internal("stored clock-in has no _id".to_string()))?;
        Ok(ClockIn {
            id: ids::encode(&id),
            email: model.email,
            location: model.location,
            inserted_data: model.inserted_data,
        })
    }

    pub async fn create_clock_in(&self, payload: ClockInPayload) -> AppResult<ClockInCreated> {
        payload.validate()?;

        let model = ClockInModel::from_payload(payload, Utc::now());
        let id = self
            .store
            .insert_one(CLOCK_IN_COLLECTION, bson::to_document(&model)?)
            .await?;

        tracing::info!(
            "Created clock-in: id={}, email={}, location={}",
            id,
            model.email,
            model.location
        );
        Ok(ClockInCreated {
            id: ids::encode(&id),
        })
    }

    pub async fn filter_clock_ins(&self, filter: &ClockInFilter) -> AppResult<Vec<ClockIn>> {
        self.store
            .find(CLOCK_IN_COLLECTION, filter.to_predicate(), RESULT_LIMIT)
            .await?
            .into_iter()
            .map(Self::document_to_response)
            .collect()
    }

    pub async fn list_clock_ins(&self) -> AppResult<Vec<ClockIn>> {
        self.filter_clock_ins(&ClockInFilter::default()).await
    }

    pub async fn get_clock_in(&self, id: &str) -> AppResult<ClockIn> {
        let id = ids::decode(id)?;

        self.store
            .find_one(CLOCK_IN_COLLECTION, id)
            .await?
            .map(Self::document_to_response)
            .unwrap_or_else(|| Err(AppError::NotFound(NOT_FOUND.to_string())))
    }

    /// Replaces `email` and `location`; `inserted_data` keeps its creation value.
    pub async fn update_clock_in(&self, id: &str, payload: ClockInPayload) -> AppResult<()> {
        payload.validate()?;
        let id = ids::decode(id)?;

        let fields = doc! {
            "email": payload.email,
            "location": payload.location,
        };
        let outcome = self
            .store
            .update_one(CLOCK_IN_COLLECTION, id, fields)
            .await?;

        // Unchanged values count as a miss, same as an unknown id.
        if outcome.modified == 0 {
            return Err(AppError::NotFound(NOT_FOUND.to_string()));
        }

        tracing::info!("Updated clock-in: id={}", id);
        Ok(())
    }

    pub async fn delete_clock_in(&self, id: &str) -> AppResult<()> {
        let id = ids::decode(id)?;

        if self.store.delete_one(CLOCK_IN_COLLECTION, id).await? == 0 {
            return Err(AppError::NotFound(NOT_FOUND.to_string()));
        }

        tracing::info!("Deleted clock-in: id={}", id);
        Ok(())
    }
}
