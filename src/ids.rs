//! Conversion between MongoDB object ids and their 24-character hex wire form.

use bson::oid::ObjectId;

use crate::error::{AppError, AppResult};

pub fn encode(id: &ObjectId) -> String {
    id.to_hex()
}

/// Parses a path parameter into an [`ObjectId`].
///
/// Anything that is not exactly 24 hex digits is rejected here, before a
/// store call is made.
pub fn decode(raw: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(raw).map_err(|_| AppError::InvalidIdentifier(raw.to_string()))
}
