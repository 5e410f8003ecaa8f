//! Catalog write path
//!
//! `addBook` is the one operation with a multi-record consistency
//! obligation: the author's `bookCount` must end up incremented exactly once
//! per created book. Validation and the credential check happen before any
//! write; a storage failure at any later step aborts the remaining steps
//! without rolling back completed ones.

use std::sync::Arc;

use async_graphql::{Context, Object, Result};
use tracing::info;

use crate::db::{CreateBook, Database};
use crate::graphql::auth::AuthExt;
use crate::graphql::errors;
use crate::graphql::helpers::{author_record_to_graphql, book_record_to_graphql};
use crate::graphql::types::{Author, Book};
use crate::services::{BookAddedEvent, EventBus};

#[derive(Default)]
pub struct CatalogMutations;

#[Object]
impl CatalogMutations {
    /// Add a book to the catalog, creating its author on first mention.
    /// Requires authentication. Publishes a bookAdded event on success.
    async fn add_book(
        &self,
        ctx: &Context<'_>,
        title: String,
        author: String,
        published: i32,
        genres: Vec<String>,
    ) -> Result<Book> {
        if title.len() < 4 {
            return Err(errors::bad_user_input("Title must be at least 4 characters"));
        }
        if author.len() < 4 {
            return Err(errors::bad_user_input(
                "Author name must be at least 4 characters",
            ));
        }
        if genres.is_empty() {
            return Err(errors::bad_user_input("At least one genre must be provided"));
        }

        let user = ctx.current_user()?;
        let db = ctx.data_unchecked::<Database>();
        let events = ctx.data_unchecked::<Arc<EventBus>>();

        // Find the author first, or create it if it doesn't exist. Two
        // concurrent creations of the same name race on the unique index;
        // the loser surfaces the storage error rather than silently merging.
        let existing = db
            .authors()
            .get_by_name(&author)
            .await
            .map_err(errors::storage)?;
        let author_record = match existing {
            Some(record) => record,
            None => db.authors().create(&author).await.map_err(errors::storage)?,
        };

        let book = db
            .books()
            .create(CreateBook {
                title,
                published,
                genres,
                author_id: author_record.id.clone(),
            })
            .await
            .map_err(errors::storage)?;

        // The book exists now, so the aggregate moves by exactly one. The
        // increment is a single atomic UPDATE inside the database.
        db.authors()
            .increment_book_count(&author_record.id)
            .await
            .map_err(errors::storage)?;

        let author_record = db
            .authors()
            .get_by_id(&author_record.id)
            .await
            .map_err(errors::storage)?
            .ok_or_else(|| {
                errors::storage(anyhow::anyhow!("Author vanished during book creation"))
            })?;

        info!(
            user = %user.username,
            title = %book.title,
            author = %author_record.name,
            book_count = author_record.book_count,
            "Book added"
        );

        events.publish_book_added(BookAddedEvent {
            book: book.clone(),
            author: author_record.clone(),
        });

        Ok(book_record_to_graphql(book, author_record))
    }

    /// Set or clear an author's birth year. The existence check deliberately
    /// precedes the credential check: an unknown name reports NOT_FOUND even
    /// to anonymous callers.
    async fn edit_author(
        &self,
        ctx: &Context<'_>,
        name: String,
        set_born_to: Option<i32>,
    ) -> Result<Author> {
        let db = ctx.data_unchecked::<Database>();

        let author = db
            .authors()
            .get_by_name(&name)
            .await
            .map_err(errors::storage)?
            .ok_or_else(|| errors::not_found("Author not found"))?;

        let user = ctx.current_user()?;

        let updated = db
            .authors()
            .set_born(&author.id, set_born_to)
            .await
            .map_err(errors::storage)?;

        info!(
            user = %user.username,
            author = %updated.name,
            born = ?updated.born,
            "Author edited"
        );

        Ok(author_record_to_graphql(updated))
    }
}
