//! Mock generative backends for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use quillpad_core::{Error, GeneratedImage, ImageGenerator, Result, TextGenerator};

/// Mock text generator returning a canned response.
pub struct MockTextGenerator {
    response: Mutex<String>,
    fail: bool,
    calls: AtomicUsize,
}

impl MockTextGenerator {
    /// Create a mock that returns the given text for every prompt.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: Mutex::new(response.into()),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a mock that fails every call.
    pub fn failing() -> Self {
        Self {
            response: Mutex::new(String::new()),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of generate calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Inference("mock text failure".to_string()));
        }
        Ok(self.response.lock().unwrap().clone())
    }

    fn model_name(&self) -> &str {
        "mock-text"
    }
}

/// Mock image generator returning fixed bytes.
pub struct MockImageGenerator {
    bytes: Vec<u8>,
    fail: bool,
    calls: AtomicUsize,
}

impl MockImageGenerator {
    /// Create a mock that returns the given bytes for every description.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a mock that fails every call.
    pub fn failing() -> Self {
        Self {
            bytes: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of generate calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    async fn generate(&self, _description: &str) -> Result<GeneratedImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Inference("mock image failure".to_string()));
        }
        Ok(GeneratedImage {
            bytes: self.bytes.clone(),
            content_type: "image/png".to_string(),
        })
    }

    fn model_name(&self) -> &str {
        "mock-image"
    }
}
