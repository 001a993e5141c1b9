//! # quillpad-core
//!
//! Core types, traits, and abstractions for the quillpad notebook service.
//!
//! This crate provides the foundational data structures and trait definitions
//! that other quillpad crates depend on.

pub mod defaults;
pub mod editor;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use editor::extract_text;
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
