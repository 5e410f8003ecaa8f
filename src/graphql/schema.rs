//! GraphQL schema definition with queries, mutations, and subscriptions

use std::sync::Arc;

use async_graphql::{MergedObject, Schema};

use crate::db::Database;
use crate::services::{AuthService, EventBus};

use super::mutations::{AuthMutations, CatalogMutations};
use super::queries::{CatalogQueries, UserQueries};
use super::subscriptions::SubscriptionRoot;

/// The GraphQL schema type
pub type BibliothecaSchema = Schema<QueryRoot, MutationRoot, SubscriptionRoot>;

#[derive(MergedObject, Default)]
pub struct QueryRoot(CatalogQueries, UserQueries);

#[derive(MergedObject, Default)]
pub struct MutationRoot(CatalogMutations, AuthMutations);

/// Build the GraphQL schema with all resolvers
pub fn build_schema(
    db: Database,
    auth: Arc<AuthService>,
    events: Arc<EventBus>,
) -> BibliothecaSchema {
    Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        SubscriptionRoot,
    )
    .data(db)
    .data(auth)
    .data(events)
    .finish()
}
