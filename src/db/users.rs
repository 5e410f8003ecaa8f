//! Users repository for authentication

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::sqlite_helpers::now_iso8601;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub favorite_genre: String,
    pub password_hash: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub favorite_genre: String,
    pub password_hash: String,
}

pub struct UsersRepository {
    pool: SqlitePool,
}

impl UsersRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user. A duplicate username fails on the unique index.
    pub async fn create(&self, user: CreateUser) -> Result<UserRecord> {
        let id = Uuid::new_v4().to_string();
        let now = now_iso8601();

        sqlx::query(
            r#"
            INSERT INTO users (id, username, favorite_genre, password_hash, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&user.username)
        .bind(&user.favorite_genre)
        .bind(&user.password_hash)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| anyhow!("User '{}' vanished after insert", user.username))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<UserRecord>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, favorite_genre, password_hash, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, favorite_genre, password_hash, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::{CreateUser, Database};

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let db = Database::connect_in_memory().await.unwrap();
        let users = db.users();

        users
            .create(CreateUser {
                username: "mika".to_string(),
                favorite_genre: "sf".to_string(),
                password_hash: "x".to_string(),
            })
            .await
            .unwrap();

        let duplicate = users
            .create(CreateUser {
                username: "mika".to_string(),
                favorite_genre: "crime".to_string(),
                password_hash: "y".to_string(),
            })
            .await;

        assert!(duplicate.is_err());
    }

    #[tokio::test]
    async fn lookup_by_username_and_id() {
        let db = Database::connect_in_memory().await.unwrap();
        let users = db.users();

        let created = users
            .create(CreateUser {
                username: "aino".to_string(),
                favorite_genre: "fantasy".to_string(),
                password_hash: "x".to_string(),
            })
            .await
            .unwrap();

        let by_name = users.get_by_username("aino").await.unwrap().unwrap();
        assert_eq!(by_name.id, created.id);

        let by_id = users.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "aino");

        assert!(users.get_by_username("nobody").await.unwrap().is_none());
    }
}
