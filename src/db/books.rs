//! Books repository
//!
//! Genre lists are stored as JSON text and filtered in SQL via `json_each`.
//! Books are immutable once created: there is no update path.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteRow;
use uuid::Uuid;

use super::sqlite_helpers::{json_to_vec, now_iso8601, vec_to_json};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: String,
    pub title: String,
    pub published: i32,
    pub genres: Vec<String>,
    pub author_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct CreateBook {
    pub title: String,
    pub published: i32,
    pub genres: Vec<String>,
    pub author_id: String,
}

pub struct BookRepository {
    pool: SqlitePool,
}

fn row_to_record(row: SqliteRow) -> BookRecord {
    BookRecord {
        id: row.get("id"),
        title: row.get("title"),
        published: row.get("published"),
        genres: json_to_vec(row.get::<String, _>("genres").as_str()),
        author_id: row.get("author_id"),
        created_at: row.get("created_at"),
    }
}

impl BookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, book: CreateBook) -> Result<BookRecord> {
        let id = Uuid::new_v4().to_string();
        let now = now_iso8601();

        sqlx::query(
            r#"
            INSERT INTO books (id, title, published, genres, author_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&book.title)
        .bind(book.published)
        .bind(vec_to_json(&book.genres))
        .bind(&book.author_id)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| anyhow!("Book '{}' vanished after insert", book.title))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<BookRecord>> {
        let row = sqlx::query(
            "SELECT id, title, published, genres, author_id, created_at FROM books WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_record))
    }

    /// List books, optionally restricted to an author and/or a genre.
    /// Both filters combine with logical AND.
    pub async fn list(
        &self,
        author_id: Option<&str>,
        genre: Option<&str>,
    ) -> Result<Vec<BookRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, published, genres, author_id, created_at
            FROM books
            WHERE (?1 IS NULL OR author_id = ?1)
              AND (?2 IS NULL OR EXISTS (
                    SELECT 1 FROM json_each(books.genres) WHERE json_each.value = ?2
                  ))
            ORDER BY created_at, id
            "#,
        )
        .bind(author_id)
        .bind(genre)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_record).collect())
    }

    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::{CreateBook, Database};

    async fn seed_book(db: &Database, title: &str, author_id: &str, genres: &[&str]) {
        db.books()
            .create(CreateBook {
                title: title.to_string(),
                published: 2000,
                genres: genres.iter().map(|g| g.to_string()).collect(),
                author_id: author_id.to_string(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn genres_survive_the_json_roundtrip_in_order() {
        let db = Database::connect_in_memory().await.unwrap();
        let author = db.authors().create("Iain M. Banks").await.unwrap();

        let book = db
            .books()
            .create(CreateBook {
                title: "Excession".to_string(),
                published: 1996,
                genres: vec!["sf".to_string(), "space opera".to_string()],
                author_id: author.id.clone(),
            })
            .await
            .unwrap();

        assert_eq!(book.genres, vec!["sf", "space opera"]);
    }

    #[tokio::test]
    async fn genre_filter_matches_set_membership() {
        let db = Database::connect_in_memory().await.unwrap();
        let author = db.authors().create("Donald Knuth").await.unwrap();
        seed_book(&db, "TAOCP", &author.id, &["algorithms", "classic"]).await;
        seed_book(&db, "Surreal Numbers", &author.id, &["maths"]).await;

        let filtered = db.books().list(None, Some("classic")).await.unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "TAOCP");

        let none = db.books().list(None, Some("poetry")).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn author_and_genre_filters_combine() {
        let db = Database::connect_in_memory().await.unwrap();
        let knuth = db.authors().create("Donald Knuth").await.unwrap();
        let martin = db.authors().create("Robert Martin").await.unwrap();
        seed_book(&db, "TAOCP", &knuth.id, &["classic"]).await;
        seed_book(&db, "Clean Code", &martin.id, &["classic", "dev"]).await;

        let both = db
            .books()
            .list(Some(&martin.id), Some("classic"))
            .await
            .unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].title, "Clean Code");
    }
}
