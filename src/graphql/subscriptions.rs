//! GraphQL subscriptions for real-time updates
//!
//! Subscriptions allow clients to receive push updates over WebSocket.

use std::sync::Arc;

use async_graphql::{Context, Subscription};
use futures::Stream;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use crate::graphql::helpers::book_record_to_graphql;
use crate::graphql::types::Book;
use crate::services::EventBus;

pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// Stream every book added to the catalog for the lifetime of the
    /// connection. Events published before subscribing are never replayed;
    /// closing the connection drops the stream and deregisters the listener.
    async fn book_added<'ctx>(&self, ctx: &Context<'ctx>) -> impl Stream<Item = Book> + 'ctx {
        let events = ctx.data_unchecked::<Arc<EventBus>>();
        let receiver = events.subscribe_book_added();

        // Lagged receivers yield an error item; skip it and keep streaming
        BroadcastStream::new(receiver)
            .filter_map(|result| result.ok().map(|e| book_record_to_graphql(e.book, e.author)))
    }
}
