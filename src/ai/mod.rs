//! Upstream vision model integration
//!
//! The proxy talks to the model through [`VisionService`] so tests can swap
//! in [`MockVisionClient`] and count upstream calls.

pub mod mime;
pub mod mock;
pub mod openai;

pub use mock::MockVisionClient;
pub use openai::OpenAiVisionClient;

use crate::Result;
use async_trait::async_trait;

/// One fully assembled vision prompt: instructions plus inline images.
#[derive(Debug, Clone, PartialEq)]
pub struct VisionRequest {
    pub system: String,
    pub prompt: String,
    /// Data URIs, attached to the user turn in order.
    pub image_urls: Vec<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[async_trait]
pub trait VisionService: Send + Sync {
    /// Send one request and return the model's text content, or `None` when
    /// the reply carried no content.
    async fn complete(&self, api_key: &str, request: &VisionRequest) -> Result<Option<String>>;
}
