use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use super::{to_store_precision, validate_email};
use crate::error::AppResult;

pub const CLOCK_IN_COLLECTION: &str = "clock_in";

/// Body of `POST /clock_in` and `PUT /clock_in/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClockInPayload {
    pub email: String,
    pub location: String,
    /// Server-assigned; accepted for compatibility and discarded.
    #[serde(default, rename = "inserted_data")]
    pub client_inserted_data: Option<IgnoredAny>,
}

impl ClockInPayload {
    pub fn validate(&self) -> AppResult<()> {
        validate_email(&self.email)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockInModel {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub location: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub inserted_data: DateTime<Utc>,
}

impl ClockInModel {
    pub fn from_payload(payload: ClockInPayload, inserted_data: DateTime<Utc>) -> Self {
        Self {
            id: None,
            email: payload.email,
            location: payload.location,
            inserted_data: to_store_precision(inserted_data),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockIn {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub location: String,
    pub inserted_data: DateTime<Utc>,
}

/// Response of `POST /clock_in`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockInCreated {
    pub id: String,
}
