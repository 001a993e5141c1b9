//! HTTP request handlers.

pub mod auth;
pub mod jobs;
pub mod notes;
