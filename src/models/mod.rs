pub mod clock_in;
pub mod item;
pub mod timestamp;

pub use clock_in::*;
pub use item::*;

use std::sync::LazyLock;

use bson::DateTime as BsonDateTime;
use chrono::{DateTime, Utc};
use regex::Regex;

use crate::error::{AppError, AppResult};

/// Dot-atom local part, then two or more dot-separated `[A-Za-z0-9-]` labels.
static RE_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*",
        r"@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)+$",
    ))
    .unwrap()
});

pub fn validate_email(email: &str) -> AppResult<()> {
    if RE_EMAIL.is_match(email) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "email: value is not a valid email address: {email}"
        )))
    }
}

/// Drops sub-millisecond precision so the value survives a BSON round trip unchanged.
pub fn to_store_precision(dt: DateTime<Utc>) -> DateTime<Utc> {
    BsonDateTime::from_chrono(dt).to_chrono()
}
