//! User account and session repository implementation.
//!
//! Passwords are hashed with Argon2. Session tokens are opaque random
//! strings handed to clients in a cookie; only their SHA-256 digest is
//! stored, so a leaked table cannot be replayed.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use quillpad_core::{defaults, Error, Result, User, UserStore};

/// PostgreSQL implementation of UserStore.
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Generate a cryptographically secure random string.
    fn generate_token(length: usize) -> String {
        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        let mut rng = rand::thread_rng();
        (0..length)
            .map(|_| {
                let idx = rng.gen_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }

    /// Hash a session token using SHA256.
    fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Hash a password using Argon2.
    fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash.
    fn verify_password(password: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| Error::Internal(format!("Invalid password hash: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    fn parse_user_row(row: sqlx::postgres::PgRow) -> User {
        User {
            id: row.get("id"),
            email: row.get("email"),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl UserStore for PgUserRepository {
    async fn create_account(&self, email: &str, password: &str) -> Result<User> {
        let email = Self::normalize_email(email);
        let password_hash = Self::hash_password(password)?;
        let now = Utc::now();
        let id = Uuid::now_v7();

        let row = sqlx::query(
            "INSERT INTO app_user (id, email, password_hash, created_at)
             VALUES ($1, $2, $3, $4)
             RETURNING id, email, created_at",
        )
        .bind(id)
        .bind(&email)
        .bind(&password_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("duplicate key") || e.to_string().contains("unique") {
                Error::Conflict("email already registered".to_string())
            } else {
                Error::Database(e)
            }
        })?;

        Ok(Self::parse_user_row(row))
    }

    async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<User>> {
        let email = Self::normalize_email(email);

        let row = sqlx::query(
            "SELECT id, email, password_hash, created_at FROM app_user WHERE email = $1",
        )
        .bind(&email)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let stored_hash: Option<String> = row.get("password_hash");
        // OAuth-only accounts have no password and can never log in with one.
        let Some(stored_hash) = stored_hash else {
            return Ok(None);
        };

        if Self::verify_password(password, &stored_hash)? {
            Ok(Some(Self::parse_user_row(row)))
        } else {
            Ok(None)
        }
    }

    async fn upsert_oauth_account(&self, email: &str) -> Result<User> {
        let email = Self::normalize_email(email);
        let now = Utc::now();
        let id = Uuid::now_v7();

        // Insert-or-fetch keyed on email; an existing password account is
        // reused as-is (the provider asserted ownership of the address).
        let row = sqlx::query(
            "INSERT INTO app_user (id, email, password_hash, created_at)
             VALUES ($1, $2, NULL, $3)
             ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
             RETURNING id, email, created_at",
        )
        .bind(id)
        .bind(&email)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(Self::parse_user_row(row))
    }

    async fn create_session(&self, user_id: Uuid, ttl: Duration) -> Result<String> {
        let token = Self::generate_token(defaults::SESSION_TOKEN_LENGTH);
        let token_hash = Self::hash_token(&token);
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO session (id, token_hash, user_id, created_at, expires_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::now_v7())
        .bind(&token_hash)
        .bind(user_id)
        .bind(now)
        .bind(now + ttl)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(token)
    }

    async fn resolve_session(&self, token: &str) -> Result<Option<User>> {
        let token_hash = Self::hash_token(token);

        let row = sqlx::query(
            "SELECT u.id, u.email, u.created_at
             FROM session s
             JOIN app_user u ON u.id = s.user_id
             WHERE s.token_hash = $1 AND s.expires_at > $2",
        )
        .bind(&token_hash)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(Self::parse_user_row))
    }

    async fn delete_session(&self, token: &str) -> Result<()> {
        let token_hash = Self::hash_token(token);

        sqlx::query("DELETE FROM session WHERE token_hash = $1")
            .bind(&token_hash)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_length_and_charset() {
        let token = PgUserRepository::generate_token(48);
        assert_eq!(token.len(), 48);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_token_is_random() {
        let a = PgUserRepository::generate_token(48);
        let b = PgUserRepository::generate_token(48);
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_token_is_deterministic() {
        let h1 = PgUserRepository::hash_token("secret");
        let h2 = PgUserRepository::hash_token("secret");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64); // hex-encoded SHA-256
    }

    #[test]
    fn test_hash_token_differs_per_input() {
        assert_ne!(
            PgUserRepository::hash_token("a"),
            PgUserRepository::hash_token("b")
        );
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = PgUserRepository::hash_password("correct horse battery").unwrap();
        assert!(PgUserRepository::verify_password("correct horse battery", &hash).unwrap());
        assert!(!PgUserRepository::verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_password_hashes_are_salted() {
        let h1 = PgUserRepository::hash_password("pw").unwrap();
        let h2 = PgUserRepository::hash_password("pw").unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            PgUserRepository::normalize_email("  Alice@Example.COM "),
            "alice@example.com"
        );
    }
}
