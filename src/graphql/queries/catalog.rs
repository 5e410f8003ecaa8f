//! Read-only catalog queries
//!
//! All of these are side-effect free and safe to serve concurrently.

use std::collections::HashMap;

use anyhow::anyhow;
use async_graphql::{Context, Object, Result};

use crate::db::{AuthorRecord, Database};
use crate::graphql::errors;
use crate::graphql::helpers::{author_record_to_graphql, book_record_to_graphql};
use crate::graphql::types::{Author, Book};

#[derive(Default)]
pub struct CatalogQueries;

#[Object]
impl CatalogQueries {
    /// Total number of books in the catalog
    async fn book_count(&self, ctx: &Context<'_>) -> Result<i32> {
        let db = ctx.data_unchecked::<Database>();
        let count = db.books().count().await.map_err(errors::storage)?;
        Ok(count as i32)
    }

    /// Total number of authors in the catalog
    async fn author_count(&self, ctx: &Context<'_>) -> Result<i32> {
        let db = ctx.data_unchecked::<Database>();
        let count = db.authors().count().await.map_err(errors::storage)?;
        Ok(count as i32)
    }

    /// All books, optionally filtered by author name and/or genre (AND).
    /// An unknown author name yields an empty list, not an error.
    async fn all_books(
        &self,
        ctx: &Context<'_>,
        author: Option<String>,
        genre: Option<String>,
    ) -> Result<Vec<Book>> {
        let db = ctx.data_unchecked::<Database>();

        let author_filter = match &author {
            Some(name) => {
                match db
                    .authors()
                    .get_by_name(name)
                    .await
                    .map_err(errors::storage)?
                {
                    Some(record) => Some(record),
                    None => return Ok(Vec::new()),
                }
            }
            None => None,
        };

        let books = db
            .books()
            .list(author_filter.as_ref().map(|a| a.id.as_str()), genre.as_deref())
            .await
            .map_err(errors::storage)?;

        // Resolve each book's author, fetching every distinct author once
        let mut authors: HashMap<String, AuthorRecord> = HashMap::new();
        if let Some(record) = author_filter {
            authors.insert(record.id.clone(), record);
        }

        let mut resolved = Vec::with_capacity(books.len());
        for book in books {
            if !authors.contains_key(&book.author_id) {
                let record = db
                    .authors()
                    .get_by_id(&book.author_id)
                    .await
                    .map_err(errors::storage)?
                    .ok_or_else(|| {
                        errors::storage(anyhow!("Book '{}' references a missing author", book.id))
                    })?;
                authors.insert(book.author_id.clone(), record);
            }
            let author = authors[&book.author_id].clone();
            resolved.push(book_record_to_graphql(book, author));
        }

        Ok(resolved)
    }

    /// All authors, each with its maintained book count
    async fn all_authors(&self, ctx: &Context<'_>) -> Result<Vec<Author>> {
        let db = ctx.data_unchecked::<Database>();
        let records = db.authors().list().await.map_err(errors::storage)?;
        Ok(records.into_iter().map(author_record_to_graphql).collect())
    }
}
