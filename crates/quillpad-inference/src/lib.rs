//! # quillpad-inference
//!
//! Generative backend abstraction for quillpad.
//!
//! This crate provides:
//! - A Gemini text-generation backend (default)
//! - A Hugging Face text-to-image backend
//! - The fixed prompt templates the workflows use
//! - Mock backends for tests (feature `mock`)
//!
//! # Example
//!
//! ```rust,no_run
//! use quillpad_inference::GeminiBackend;
//! use quillpad_core::TextGenerator;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = GeminiBackend::from_env();
//!     let text = backend.generate("Say hello.").await.unwrap();
//!     println!("{}", text);
//! }
//! ```

pub mod gemini;
pub mod image;
pub mod prompts;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use quillpad_core::*;

pub use gemini::GeminiBackend;
pub use image::HfImageBackend;
pub use prompts::{completion_prompt, summarize_prompt, thumbnail_description_prompt};

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockImageGenerator, MockTextGenerator};
