//! # quillpad-db
//!
//! PostgreSQL database layer for quillpad.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for notes, users/sessions, and jobs
//! - A filesystem-backed object store for generated thumbnails
//!
//! ## Example
//!
//! ```rust,ignore
//! use quillpad_db::Database;
//! use quillpad_core::{CreateNoteRequest, NoteRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/quillpad").await?;
//!
//!     let note_id = db.notes.insert(CreateNoteRequest {
//!         owner_id: user.id,
//!         name: "Trip Plan".to_string(),
//!     }).await?;
//!
//!     println!("Created note: {}", note_id);
//!     Ok(())
//! }
//! ```

pub mod jobs;
pub mod notes;
pub mod object_store;
pub mod pool;
pub mod users;

// Re-export core types
pub use quillpad_core::*;

// Re-export repository implementations
pub use jobs::PgJobRepository;
pub use notes::PgNoteRepository;
pub use object_store::{thumbnail_key, FilesystemStore};
pub use pool::{create_pool, create_pool_with_config, PoolConfig};
pub use users::PgUserRepository;

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Note repository for CRUD operations.
    pub notes: PgNoteRepository,
    /// User account and session repository.
    pub users: PgUserRepository,
    /// Job repository for background processing.
    pub jobs: PgJobRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            notes: PgNoteRepository::new(pool.clone()),
            users: PgUserRepository::new(pool.clone()),
            jobs: PgJobRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}
