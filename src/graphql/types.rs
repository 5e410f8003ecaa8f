//! GraphQL object types for the catalog API

use async_graphql::SimpleObject;

/// An author in the catalog. `bookCount` is the denormalized aggregate
/// maintained by the addBook path, never recomputed on read.
#[derive(Debug, Clone, SimpleObject)]
pub struct Author {
    pub id: String,
    pub name: String,
    pub born: Option<i32>,
    pub book_count: i32,
}

/// A book, always returned with its author fully resolved
#[derive(Debug, Clone, SimpleObject)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub published: i32,
    pub genres: Vec<String>,
    pub author: Author,
}

/// A registered user
#[derive(Debug, Clone, SimpleObject)]
pub struct User {
    pub id: String,
    pub username: String,
    pub favorite_genre: String,
}

/// A signed credential minted by login
#[derive(Debug, Clone, SimpleObject)]
pub struct Token {
    pub value: String,
}
