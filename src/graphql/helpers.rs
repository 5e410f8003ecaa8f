// Helper functions shared across GraphQL query/mutation modules.

use crate::db::{AuthorRecord, BookRecord, UserRecord};
use crate::graphql::types::{Author, Book, User};

/// Convert an AuthorRecord from the database to a GraphQL Author type
pub(crate) fn author_record_to_graphql(r: AuthorRecord) -> Author {
    Author {
        id: r.id,
        name: r.name,
        born: r.born,
        book_count: r.book_count,
    }
}

/// Convert a BookRecord plus its resolved author to a GraphQL Book type
pub(crate) fn book_record_to_graphql(r: BookRecord, author: AuthorRecord) -> Book {
    Book {
        id: r.id,
        title: r.title,
        published: r.published,
        genres: r.genres,
        author: author_record_to_graphql(author),
    }
}

/// Convert a UserRecord from the database to a GraphQL User type
pub(crate) fn user_record_to_graphql(r: UserRecord) -> User {
    User {
        id: r.id,
        username: r.username,
        favorite_genre: r.favorite_genre,
    }
}
