use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use super::{timestamp, to_store_precision, validate_email};
use crate::error::AppResult;

pub const ITEMS_COLLECTION: &str = "items";

/// Body of `POST /items` and `PUT /items/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemPayload {
    pub name: String,
    pub email: String,
    pub item_name: String,
    pub quantity: i64,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub expiry_date: DateTime<Utc>,
    /// Server-assigned; accepted for compatibility and discarded.
    #[serde(default, rename = "inserted_data")]
    pub client_inserted_data: Option<IgnoredAny>,
}

impl ItemPayload {
    pub fn validate(&self) -> AppResult<()> {
        validate_email(&self.email)
    }
}

/// Item as stored in the `items` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemModel {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    pub item_name: String,
    pub quantity: i64,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub expiry_date: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub inserted_data: DateTime<Utc>,
}

impl ItemModel {
    pub fn from_payload(payload: ItemPayload, inserted_data: DateTime<Utc>) -> Self {
        Self {
            id: None,
            name: payload.name,
            email: payload.email,
            item_name: payload.item_name,
            quantity: payload.quantity,
            expiry_date: to_store_precision(payload.expiry_date),
            inserted_data: to_store_precision(inserted_data),
        }
    }
}

/// Item as returned on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub item_name: String,
    pub quantity: i64,
    pub expiry_date: DateTime<Utc>,
    pub inserted_data: DateTime<Utc>,
}

/// One row of `GET /items/aggregation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailCount {
    pub email: String,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload_json() -> serde_json::Value {
        json!({
            "name": "Test Item",
            "email": "test@example.com",
            "item_name": "Widget",
            "quantity": 5,
            "expiry_date": "2030-01-01T00:00:00+00:00"
        })
    }

    #[test]
    fn test_payload_parses() {
        let payload: ItemPayload = serde_json::from_value(payload_json()).unwrap();
        assert_eq!(payload.quantity, 5);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_payload_ignores_client_inserted_data() {
        let mut value = payload_json();
        value["inserted_data"] = json!("1999-01-01T00:00:00Z");
        let payload: ItemPayload = serde_json::from_value(value).unwrap();

        let now = Utc::now();
        let model = ItemModel::from_payload(payload, now);
        assert_eq!(model.inserted_data, to_store_precision(now));
    }

    #[test]
    fn test_payload_rejects_unknown_field() {
        let mut value = payload_json();
        value["colour"] = json!("red");
        assert!(serde_json::from_value::<ItemPayload>(value).is_err());
    }

    #[test]
    fn test_payload_rejects_wrong_types() {
        let mut value = payload_json();
        value["quantity"] = json!("five");
        assert!(serde_json::from_value::<ItemPayload>(value).is_err());

        let mut value = payload_json();
        value["expiry_date"] = json!("not a date");
        assert!(serde_json::from_value::<ItemPayload>(value).is_err());

        let mut value = payload_json();
        value.as_object_mut().unwrap().remove("item_name");
        assert!(serde_json::from_value::<ItemPayload>(value).is_err());
    }

    #[test]
    fn test_payload_rejects_bad_email() {
        let mut value = payload_json();
        value["email"] = json!("not-an-email");
        let payload: ItemPayload = serde_json::from_value(value).unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn test_model_document_shape() {
        let payload: ItemPayload = serde_json::from_value(payload_json()).unwrap();
        let model = ItemModel::from_payload(payload, Utc::now());
        let doc = bson::to_document(&model).unwrap();

        assert!(!doc.contains_key("_id"));
        assert!(doc.get_datetime("expiry_date").is_ok());
        assert!(doc.get_datetime("inserted_data").is_ok());
        assert_eq!(doc.get_i64("quantity").unwrap(), 5);
    }
}
