//! GraphQL authentication context
//!
//! The HTTP/WS handlers verify the bearer token, resolve the referenced
//! user, and attach an [AuthUser] to the request data. Resolvers read it
//! back through [AuthExt]; protected mutations use [AuthExt::current_user],
//! which raises NO_CREDENTIALS when the request is anonymous.

use async_graphql::{Context, Result};

use crate::db::UserRecord;
use crate::graphql::errors;

/// The authenticated identity attached to a request scope
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub username: String,
    pub favorite_genre: String,
}

impl From<UserRecord> for AuthUser {
    fn from(user: UserRecord) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            favorite_genre: user.favorite_genre,
        }
    }
}

/// Extension trait to get the authenticated user from the GraphQL context
pub trait AuthExt {
    /// Get the authenticated user, or fail with NO_CREDENTIALS
    fn current_user(&self) -> Result<&AuthUser>;

    /// Get the authenticated user if present, or None for anonymous callers
    fn try_current_user(&self) -> Option<&AuthUser>;
}

impl AuthExt for Context<'_> {
    fn current_user(&self) -> Result<&AuthUser> {
        self.data_opt::<AuthUser>()
            .ok_or_else(errors::no_credentials)
    }

    fn try_current_user(&self) -> Option<&AuthUser> {
        self.data_opt::<AuthUser>()
    }
}
