//! Authentication service for user management and JWT handling
//!
//! Provides:
//! - User creation (no credential issued; the login password is shared and
//!   configured, stored per user as a bcrypt hash)
//! - Login with a non-enumerating failure mode
//! - JWT token minting and verification

use anyhow::{Context, Result};
use bcrypt::{hash, verify};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::db::{CreateUser, Database, UserRecord};

/// Claims carried by a catalog access token. Tokens have no expiry and no
/// server-side revocation; they stay valid as long as the signing key does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User ID
    pub id: String,
    /// Username
    pub username: String,
}

/// Auth service configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT signing secret
    pub jwt_secret: String,
    /// Shared login password, hashed per user at creation
    pub login_password: String,
    /// Bcrypt cost factor
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            login_password: config.login_password.clone(),
            bcrypt_cost: config.bcrypt_cost,
        }
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: Database,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(db: Database, config: AuthConfig) -> Self {
        Self { db, config }
    }

    /// Create a new user. The stored hash is derived from the configured
    /// shared login password; callers don't pick a password of their own.
    pub async fn create_user(&self, username: &str, favorite_genre: &str) -> Result<UserRecord> {
        let password_hash = hash(&self.config.login_password, self.config.bcrypt_cost)
            .context("Password hashing failed")?;

        let user = self
            .db
            .users()
            .create(CreateUser {
                username: username.to_string(),
                favorite_genre: favorite_genre.to_string(),
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User created");
        Ok(user)
    }

    /// Authenticate a username/password pair. Returns `Ok(None)` for an
    /// unknown username and for a wrong password alike, so callers cannot
    /// probe which usernames exist. `Err` is reserved for storage failures.
    pub async fn login(&self, username: &str, password: &str) -> Result<Option<String>> {
        let Some(user) = self.db.users().get_by_username(username).await? else {
            tracing::warn!(username, "Login failed");
            return Ok(None);
        };

        if !verify(password, &user.password_hash).unwrap_or(false) {
            tracing::warn!(username, "Login failed");
            return Ok(None);
        }

        let token = self.sign_token(&user)?;
        tracing::info!(user_id = %user.id, username = %user.username, "User logged in");
        Ok(Some(token))
    }

    /// Mint a signed token encoding the user's id and username
    pub fn sign_token(&self, user: &UserRecord) -> Result<String> {
        let claims = TokenClaims {
            id: user.id.clone(),
            username: user.username.clone(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .context("Token signing failed")
    }

    /// Verify a token's signature and decode its claims. The claims carry a
    /// user id that may no longer resolve; resolving it is the caller's job.
    pub fn verify_token(&self, token: &str) -> Result<TokenClaims> {
        // Tokens carry no exp claim, so spec-claim validation is disabled
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .context("Token verification failed")?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            login_password: "secret".to_string(),
            // Minimum cost keeps the tests fast
            bcrypt_cost: 4,
        }
    }

    async fn service() -> AuthService {
        let db = Database::connect_in_memory().await.unwrap();
        AuthService::new(db, test_config())
    }

    #[tokio::test]
    async fn login_roundtrip_yields_a_verifiable_token() {
        let auth = service().await;
        let user = auth.create_user("ada", "sf").await.unwrap();

        let token = auth.login("ada", "secret").await.unwrap().unwrap();
        let claims = auth.verify_token(&token).unwrap();

        assert_eq!(claims.id, user.id);
        assert_eq!(claims.username, "ada");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_indistinguishable() {
        let auth = service().await;
        auth.create_user("ada", "sf").await.unwrap();

        let wrong_password = auth.login("ada", "hunter2").await.unwrap();
        let unknown_user = auth.login("ghost", "secret").await.unwrap();

        assert!(wrong_password.is_none());
        assert!(unknown_user.is_none());
    }

    #[tokio::test]
    async fn tampered_token_fails_verification() {
        let auth = service().await;
        let user = auth.create_user("ada", "sf").await.unwrap();
        let token = auth.sign_token(&user).unwrap();

        let other = AuthService::new(
            Database::connect_in_memory().await.unwrap(),
            AuthConfig {
                jwt_secret: "different-secret".to_string(),
                ..test_config()
            },
        );

        assert!(other.verify_token(&token).is_err());
        assert!(auth.verify_token("not-a-token").is_err());
    }
}
