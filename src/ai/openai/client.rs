use super::types::{ChatCompletionRequest, ChatCompletionResponse};
use crate::{Error, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Thin JSON-over-HTTP client for an OpenAI-compatible API.
///
/// No request timeout is configured here; the hosting platform bounds how
/// long a proxied request may run.
pub struct OpenAiHttpClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
}

impl OpenAiHttpClient {
    pub fn new(base_url: String) -> Self {
        Self::new_with_client(base_url, Client::new())
    }

    pub fn new_with_client(base_url: String, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn post<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        path: &str,
        api_key: &str,
        request: &Req,
    ) -> Result<Resp> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to upstream model: {}", e);
                e
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Upstream model error (status {}): {}", status, error_text);
            return Err(Error::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse upstream response: {}\nBody: {}", e, body);
            Error::Upstream(format!("Malformed completion envelope: {}", e))
        })
    }

    pub async fn chat_completion(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        self.post(CHAT_COMPLETIONS_PATH, api_key, request).await
    }
}
