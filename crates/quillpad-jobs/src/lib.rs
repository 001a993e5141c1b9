//! # quillpad-jobs
//!
//! Background job queue system for quillpad.
//!
//! This crate provides:
//! - Priority-based job queueing
//! - Async job processing with concurrent workers
//! - Progress tracking and notifications via broadcast channels
//! - Retry logic with configurable limits
//! - The thumbnail generation pipeline handler
//!
//! ## Example
//!
//! ```ignore
//! use quillpad_jobs::{JobWorker, WorkerConfig, WorkerBuilder, ThumbnailHandler};
//! use quillpad_db::Database;
//!
//! let db = Database::connect("postgres://...").await?;
//!
//! let worker = WorkerBuilder::new(db.clone())
//!     .with_config(WorkerConfig::default().with_poll_interval(1000))
//!     .with_handler(ThumbnailHandler::new(notes, textgen, imagegen, store))
//!     .build()
//!     .await;
//!
//! let handle = worker.start();
//!
//! // Graceful shutdown
//! handle.shutdown().await?;
//! ```

pub mod handler;
pub mod thumbnail;
pub mod worker;

// Re-export core types
pub use quillpad_core::*;

pub use handler::{JobContext, JobHandler, JobResult, NoOpHandler};
pub use thumbnail::ThumbnailHandler;
pub use worker::{JobWorker, WorkerBuilder, WorkerConfig, WorkerEvent, WorkerHandle};

/// Default maximum retries for failed jobs.
pub const DEFAULT_MAX_RETRIES: i32 = quillpad_core::defaults::JOB_MAX_RETRIES;

/// Default polling interval for job processing (milliseconds).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = quillpad_core::defaults::JOB_POLL_INTERVAL_MS;
