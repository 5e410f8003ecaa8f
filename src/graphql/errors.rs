//! Error constructors for the GraphQL layer
//!
//! Every failure carries a machine-readable `code` extension alongside the
//! human-readable message, so clients can branch without parsing messages.

use async_graphql::{Error, ErrorExtensions};

/// Client-supplied data fails validation
pub fn bad_user_input(message: impl Into<String>) -> Error {
    Error::new(message).extend_with(|_, e| e.set("code", "BAD_USER_INPUT"))
}

/// A protected operation was called without an authenticated identity
pub fn no_credentials() -> Error {
    Error::new("Unauthorized").extend_with(|_, e| e.set("code", "NO_CREDENTIALS"))
}

/// Missing or invalid identity; also used for failed logins
pub fn unauthorized(message: impl Into<String>) -> Error {
    Error::new(message).extend_with(|_, e| e.set("code", "UNAUTHORIZED"))
}

/// A referenced entity does not exist
pub fn not_found(message: impl Into<String>) -> Error {
    Error::new(message).extend_with(|_, e| e.set("code", "NOT_FOUND"))
}

/// A storage operation failed (including uniqueness violations); the
/// underlying message is passed through
pub fn storage(err: anyhow::Error) -> Error {
    Error::new(err.to_string()).extend_with(|_, e| e.set("code", "STORAGE_ERROR"))
}
