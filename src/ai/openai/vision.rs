use super::client::OpenAiHttpClient;
use super::types::{ChatCompletionRequest, ChatMessage, ChatMessageContent, MessagePart};
use crate::ai::{VisionRequest, VisionService};
use crate::Result;
use async_trait::async_trait;

pub struct OpenAiVisionClient {
    http: OpenAiHttpClient,
    model: String,
}

impl OpenAiVisionClient {
    pub fn new(base_url: String, model: String) -> Self {
        Self::new_with_client(base_url, model, reqwest::Client::new())
    }

    pub fn new_with_client(base_url: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: OpenAiHttpClient::new_with_client(base_url, client),
            model,
        }
    }

    fn build_request(&self, request: &VisionRequest) -> ChatCompletionRequest {
        let system_message = ChatMessage {
            role: "system".to_string(),
            content: Some(ChatMessageContent::Text(request.system.clone())),
        };

        let mut parts = Vec::with_capacity(request.image_urls.len() + 1);
        parts.push(MessagePart::text(request.prompt.clone()));
        parts.extend(request.image_urls.iter().cloned().map(MessagePart::image));

        let user_message = ChatMessage {
            role: "user".to_string(),
            content: Some(ChatMessageContent::Parts(parts)),
        };

        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![system_message, user_message],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[async_trait]
impl VisionService for OpenAiVisionClient {
    async fn complete(&self, api_key: &str, request: &VisionRequest) -> Result<Option<String>> {
        tracing::debug!(
            "Sending vision request to {} ({} images, prompt {} chars)",
            self.model,
            request.image_urls.len(),
            request.prompt.len()
        );

        let response = self
            .http
            .chat_completion(api_key, &self.build_request(request))
            .await?;

        if let Some(reason) = response.choices.first().and_then(|c| c.finish_reason.as_deref()) {
            tracing::debug!("Vision completion finished: {}", reason);
        }

        Ok(response.first_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::openai::client::CHAT_COMPLETIONS_PATH;
    use crate::Error;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_client(server: &MockServer) -> OpenAiVisionClient {
        OpenAiVisionClient::new(server.uri(), "grok-test".to_string())
    }

    fn vision_request() -> VisionRequest {
        VisionRequest {
            system: "JSON only".to_string(),
            prompt: "Analyze these".to_string(),
            image_urls: vec![
                "data:image/jpeg;base64,FRONT".to_string(),
                "data:image/jpeg;base64,SIDE".to_string(),
            ],
            temperature: 0.3,
            max_tokens: 2000,
        }
    }

    #[tokio::test]
    async fn test_complete_returns_message_content() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(CHAT_COMPLETIONS_PATH))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": { "role": "assistant", "content": "{\"currentScore\": 6.5}" },
                    "finish_reason": "stop"
                }]
            })))
            .mount(&server)
            .await;

        let content = make_client(&server)
            .complete("test-key", &vision_request())
            .await
            .unwrap();
        assert_eq!(content.as_deref(), Some("{\"currentScore\": 6.5}"));
    }

    #[tokio::test]
    async fn test_complete_sends_images_in_user_turn() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(CHAT_COMPLETIONS_PATH))
            .and(body_partial_json(serde_json::json!({
                "model": "grok-test",
                "temperature": 0.3,
                "max_tokens": 2000,
                "messages": [
                    { "role": "system", "content": "JSON only" },
                    {
                        "role": "user",
                        "content": [
                            { "type": "text", "text": "Analyze these" },
                            { "type": "image_url", "image_url": { "url": "data:image/jpeg;base64,FRONT" } },
                            { "type": "image_url", "image_url": { "url": "data:image/jpeg;base64,SIDE" } }
                        ]
                    }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": { "role": "assistant", "content": "{}" },
                    "finish_reason": "stop"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        make_client(&server)
            .complete("key", &vision_request())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_non_success_status_is_upstream_status_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(CHAT_COMPLETIONS_PATH))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = make_client(&server)
            .complete("key", &vision_request())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UpstreamStatus { status: 429 }));
    }

    #[tokio::test]
    async fn test_empty_choices_yield_none() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(CHAT_COMPLETIONS_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let content = make_client(&server)
            .complete("key", &vision_request())
            .await
            .unwrap();
        assert!(content.is_none());
    }

    #[tokio::test]
    async fn test_null_content_yields_none() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(CHAT_COMPLETIONS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": { "role": "assistant", "content": null },
                    "finish_reason": "length"
                }]
            })))
            .mount(&server)
            .await;

        let content = make_client(&server)
            .complete("key", &vision_request())
            .await
            .unwrap();
        assert!(content.is_none());
    }

    #[tokio::test]
    async fn test_malformed_envelope_is_upstream_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(CHAT_COMPLETIONS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = make_client(&server)
            .complete("key", &vision_request())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }
}
