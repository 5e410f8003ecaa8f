//! User queries

use async_graphql::{Context, Object, Result};

use crate::graphql::auth::AuthExt;
use crate::graphql::types::User;

#[derive(Default)]
pub struct UserQueries;

#[Object]
impl UserQueries {
    /// The identity attached to this request, or null for anonymous callers
    async fn me(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        Ok(ctx.try_current_user().map(|user| User {
            id: user.user_id.clone(),
            username: user.username.clone(),
            favorite_genre: user.favorite_genre.clone(),
        }))
    }
}
