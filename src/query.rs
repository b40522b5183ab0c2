//! Translation of optional filter parameters into MongoDB predicate documents.

use bson::{doc, Bson, DateTime as BsonDateTime, Document};
use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer};

use crate::models::timestamp;

/// Upper bound on documents returned by any list, filter or aggregation call.
pub const RESULT_LIMIT: i64 = 100;

#[derive(Debug, Default)]
pub struct QueryBuilder {
    predicate: Document,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Equality match, skipped when the value is absent or empty.
    pub fn eq(mut self, field: &str, value: Option<&str>) -> Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.predicate.insert(field, value);
        }
        self
    }

    /// Lower-bound (`$gte`) match, skipped when the value is absent.
    pub fn gte(mut self, field: &str, value: Option<impl Into<Bson>>) -> Self {
        if let Some(value) = value {
            let bound: Bson = value.into();
            self.predicate.insert(field, doc! { "$gte": bound });
        }
        self
    }

    pub fn gte_datetime(self, field: &str, value: Option<DateTime<Utc>>) -> Self {
        self.gte(field, value.map(BsonDateTime::from_chrono))
    }

    pub fn build(self) -> Document {
        self.predicate
    }
}

/// Query string of `GET /items/filter`.
#[derive(Debug, Default, Deserialize)]
pub struct ItemFilter {
    pub email: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub inserted_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_quantity")]
    pub quantity: Option<i64>,
}

/// Integer query value where an empty string counts as absent.
fn deserialize_quantity<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| de::Error::custom(format!("invalid quantity {raw:?}: {e}"))),
    }
}

impl ItemFilter {
    pub fn to_predicate(&self) -> Document {
        QueryBuilder::new()
            .eq("email", self.email.as_deref())
            .gte_datetime("expiry_date", self.expiry_date)
            .gte_datetime("inserted_data", self.inserted_date)
            .gte("quantity", self.quantity)
            .build()
    }
}

/// Query string of `GET /clock_in/filter`.
#[derive(Debug, Default, Deserialize)]
pub struct ClockInFilter {
    pub email: Option<String>,
    pub location: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub inserted_date: Option<DateTime<Utc>>,
}

impl ClockInFilter {
    pub fn to_predicate(&self) -> Document {
        QueryBuilder::new()
            .eq("email", self.email.as_deref())
            .eq("location", self.location.as_deref())
            .gte_datetime("inserted_data", self.inserted_date)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(ItemFilter::default().to_predicate().is_empty());
        assert!(ClockInFilter::default().to_predicate().is_empty());
    }

    #[test]
    fn test_empty_strings_are_ignored() {
        let filter = ClockInFilter {
            email: Some(String::new()),
            location: Some(String::new()),
            inserted_date: None,
        };
        assert!(filter.to_predicate().is_empty());
    }

    #[test]
    fn test_item_filter_predicate() {
        let since = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let filter = ItemFilter {
            email: Some("a@b.com".to_string()),
            expiry_date: Some(since),
            inserted_date: Some(since),
            quantity: Some(3),
        };

        let expected = doc! {
            "email": "a@b.com",
            "expiry_date": { "$gte": BsonDateTime::from_chrono(since) },
            "inserted_data": { "$gte": BsonDateTime::from_chrono(since) },
            "quantity": { "$gte": 3_i64 },
        };
        assert_eq!(filter.to_predicate(), expected);
    }

    #[test]
    fn test_zero_quantity_is_still_a_bound() {
        let filter = ItemFilter {
            quantity: Some(0),
            ..Default::default()
        };
        assert_eq!(filter.to_predicate(), doc! { "quantity": { "$gte": 0_i64 } });
    }

    #[test]
    fn test_empty_quantity_is_absent() {
        let filter: ItemFilter = serde_json::from_value(json!({ "quantity": "" })).unwrap();
        assert_eq!(filter.quantity, None);
        assert!(filter.to_predicate().is_empty());

        let filter: ItemFilter = serde_json::from_value(json!({ "quantity": "4" })).unwrap();
        assert_eq!(filter.quantity, Some(4));

        assert!(serde_json::from_value::<ItemFilter>(json!({ "quantity": "many" })).is_err());
    }

    #[test]
    fn test_clock_in_filter_predicate() {
        let filter = ClockInFilter {
            email: None,
            location: Some("Office".to_string()),
            inserted_date: None,
        };
        assert_eq!(filter.to_predicate(), doc! { "location": "Office" });
    }
}
