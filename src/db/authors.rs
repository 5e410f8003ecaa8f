//! Authors repository
//!
//! `book_count` is a denormalized aggregate owned by the book-creation path.
//! It is only ever changed through [AuthorRepository::increment_book_count],
//! which runs as a single atomic UPDATE so concurrent writers to the same
//! author cannot under-count.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::sqlite_helpers::now_iso8601;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuthorRecord {
    pub id: String,
    pub name: String,
    pub born: Option<i32>,
    pub book_count: i32,
    pub created_at: String,
}

pub struct AuthorRepository {
    pool: SqlitePool,
}

impl AuthorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new author with a zero book count. Fails on a duplicate name
    /// (unique index), surfacing the violation to the caller.
    pub async fn create(&self, name: &str) -> Result<AuthorRecord> {
        let id = Uuid::new_v4().to_string();
        let now = now_iso8601();

        sqlx::query(
            r#"
            INSERT INTO authors (id, name, born, book_count, created_at)
            VALUES (?, ?, NULL, 0, ?)
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| anyhow!("Author '{}' vanished after insert", name))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<AuthorRecord>> {
        let record = sqlx::query_as::<_, AuthorRecord>(
            "SELECT id, name, born, book_count, created_at FROM authors WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Look up an author by exact name
    pub async fn get_by_name(&self, name: &str) -> Result<Option<AuthorRecord>> {
        let record = sqlx::query_as::<_, AuthorRecord>(
            "SELECT id, name, born, book_count, created_at FROM authors WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn list(&self) -> Result<Vec<AuthorRecord>> {
        let records = sqlx::query_as::<_, AuthorRecord>(
            "SELECT id, name, born, book_count, created_at FROM authors ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM authors")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Set or clear the birth year, returning the updated record
    pub async fn set_born(&self, id: &str, born: Option<i32>) -> Result<AuthorRecord> {
        sqlx::query("UPDATE authors SET born = ? WHERE id = ?")
            .bind(born)
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| anyhow!("Author '{}' not found after update", id))
    }

    /// Atomically add one to the author's book count. The increment happens
    /// inside the database, not via read-then-write in the application.
    pub async fn increment_book_count(&self, id: &str) -> Result<()> {
        let result = sqlx::query("UPDATE authors SET book_count = book_count + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(anyhow!("Author '{}' not found for book count update", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;

    #[tokio::test]
    async fn create_starts_with_zero_book_count() {
        let db = Database::connect_in_memory().await.unwrap();
        let author = db.authors().create("Ursula K. Le Guin").await.unwrap();

        assert_eq!(author.book_count, 0);
        assert_eq!(author.born, None);
        assert_eq!(author.name, "Ursula K. Le Guin");
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected() {
        let db = Database::connect_in_memory().await.unwrap();
        db.authors().create("Robert Martin").await.unwrap();

        let result = db.authors().create("Robert Martin").await;
        assert!(result.is_err(), "unique index should reject the duplicate");
    }

    #[tokio::test]
    async fn concurrent_increments_do_not_under_count() {
        let db = Database::connect_in_memory().await.unwrap();
        let author = db.authors().create("Terry Pratchett").await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let authors = db.authors();
            let id = author.id.clone();
            handles.push(tokio::spawn(async move {
                authors.increment_book_count(&id).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let updated = db.authors().get_by_id(&author.id).await.unwrap().unwrap();
        assert_eq!(updated.book_count, 20);
    }

    #[tokio::test]
    async fn set_born_roundtrips_and_clears() {
        let db = Database::connect_in_memory().await.unwrap();
        let author = db.authors().create("Octavia Butler").await.unwrap();

        let updated = db.authors().set_born(&author.id, Some(1947)).await.unwrap();
        assert_eq!(updated.born, Some(1947));

        let cleared = db.authors().set_born(&author.id, None).await.unwrap();
        assert_eq!(cleared.born, None);
    }
}
