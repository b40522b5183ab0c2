use std::sync::Arc;

use bson::{doc, Bson, Document};

use crate::db::DocumentStore;
use crate::error::{AppError, AppResult};
use crate::models::{EmailCount, ITEMS_COLLECTION};
use crate::query::RESULT_LIMIT;

/// Per-key document counts computed by the store's aggregation pipeline.
pub struct AggregationReporter {
    store: Arc<dyn DocumentStore>,
}

/// `$group` on `field` counting documents, capped at [`RESULT_LIMIT`] groups.
pub fn count_by_pipeline(field: &str) -> Vec<Document> {
    vec![
        doc! { "$group": { "_id": format!("${field}"), "count": { "$sum": 1 } } },
        doc! { "$limit": RESULT_LIMIT },
    ]
}

impl AggregationReporter {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn count_items_by_email(&self) -> AppResult<Vec<EmailCount>> {
        let groups = self
            .store
            .aggregate(ITEMS_COLLECTION, count_by_pipeline("email"))
            .await?;

        groups
            .into_iter()
            .map(|group| {
                let email = match group.get("_id") {
                    Some(Bson::String(email)) => email.clone(),
                    Some(Bson::Null) | None => String::new(),
                    Some(other) => other.to_string(),
                };
                let count = match group.get("count") {
                    Some(Bson::Int32(n)) => i64::from(*n),
                    Some(Bson::Int64(n)) => *n,
                    other => {
                        return Err(AppError::Internal(format!(
                            "unexpected count in aggregation result: {other:?}"
                        )))
                    }
                };
                Ok(EmailCount { email, count })
            })
            .collect()
    }
}
