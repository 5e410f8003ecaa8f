//! User registration and login mutations
//!
//! Neither operation requires authentication. Login failures use one
//! message for unknown usernames and wrong passwords alike.

use std::sync::Arc;

use async_graphql::{Context, Object, Result};
use tracing::warn;

use crate::graphql::errors;
use crate::graphql::helpers::user_record_to_graphql;
use crate::graphql::types::{Token, User};
use crate::services::AuthService;

#[derive(Default)]
pub struct AuthMutations;

#[Object]
impl AuthMutations {
    /// Register a new user. No credential is issued here; use login.
    async fn create_user(
        &self,
        ctx: &Context<'_>,
        username: String,
        favorite_genre: String,
    ) -> Result<User> {
        if username.len() < 3 {
            return Err(errors::bad_user_input(
                "Username must be at least 3 characters",
            ));
        }
        if favorite_genre.is_empty() {
            return Err(errors::bad_user_input("Missing favorite genre"));
        }

        let auth = ctx.data_unchecked::<Arc<AuthService>>();
        let user = auth
            .create_user(&username, &favorite_genre)
            .await
            .map_err(errors::storage)?;

        Ok(user_record_to_graphql(user))
    }

    /// Exchange a username/password pair for a signed token
    async fn login(&self, ctx: &Context<'_>, username: String, password: String) -> Result<Token> {
        let auth = ctx.data_unchecked::<Arc<AuthService>>();

        match auth.login(&username, &password).await {
            Ok(Some(value)) => Ok(Token { value }),
            Ok(None) => Err(errors::unauthorized("Invalid username or password")),
            Err(e) => {
                warn!(username = %username, error = %e, "Login hit a storage failure");
                Err(errors::storage(e))
            }
        }
    }
}
