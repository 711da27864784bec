//! # Extension traits for DynamoDB session items.

use aws_sdk_dynamodb::model::AttributeValue;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Trait to extract concrete values from a DynamoDB item
///
/// The DynamoDB client returns AttributeValues, which are enums that contain
/// the concrete values. This trait provides additional methods to the HashMap
/// to extract those values.
pub trait AttributeValuesExt {
    fn get_s(&self, key: &str) -> Option<String>;
    fn get_n(&self, key: &str) -> Option<i64>;
    fn get_dt(&self, key: &str) -> Option<DateTime<Utc>>;
}

impl AttributeValuesExt for HashMap<String, AttributeValue> {
    /// Return a string from a key
    ///
    /// E.g. if you run `get_s("session_id")` on a DynamoDB item structured
    /// like this, you will retrieve the value `"1712345678901-a1b2c3d4"`.
    ///
    /// ```json
    /// {
    ///   "session_id": {
    ///     "S": "1712345678901-a1b2c3d4"
    ///   }
    /// }
    /// ```
    fn get_s(&self, key: &str) -> Option<String> {
        Some(self.get(key)?.as_s().ok()?.to_owned())
    }

    /// Return an integer from a key
    ///
    /// E.g. if you run `get_n("expiration")` on a DynamoDB item structured
    /// like this, you will retrieve the value `1714937678`.
    ///
    /// ```json
    /// {
    ///  "expiration": {
    ///   "N": "1714937678"
    ///   }
    /// }
    /// ```
    fn get_n(&self, key: &str) -> Option<i64> {
        self.get(key)?.as_n().ok()?.parse::<i64>().ok()
    }

    /// Return a DateTime<Utc> from a key
    ///
    /// E.g. if you run `get_dt("created_at")` on a DynamoDB item structured
    /// like this, you will retrieve the value `2014-11-28T12:45:59.324310806Z`.
    ///
    /// ```json
    /// {
    ///  "created_at": {
    ///   "S": "2014-11-28T12:45:59.324310806Z"
    ///   }
    /// }
    /// ```
    fn get_dt(&self, key: &str) -> Option<DateTime<Utc>> {
        self.get(key)?
            .as_s()
            .ok()?
            .to_owned()
            .parse::<DateTime<Utc>>()
            .ok()
    }
}
