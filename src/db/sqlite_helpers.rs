//! SQLite helper utilities for type conversion
//!
//! SQLite has no native array type; genre lists are stored as JSON text.

use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};

/// Current UTC timestamp as an RFC 3339 string for SQLite storage
#[inline]
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339()
}

/// Serialize a Vec to a JSON string for SQLite storage
#[inline]
pub fn vec_to_json<T: Serialize>(v: &[T]) -> String {
    serde_json::to_string(v).unwrap_or_else(|_| "[]".to_string())
}

/// Deserialize a JSON string from SQLite to a Vec
#[inline]
pub fn json_to_vec<T: DeserializeOwned>(s: &str) -> Vec<T> {
    serde_json::from_str(s).unwrap_or_default()
}
