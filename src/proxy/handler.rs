use super::normalize::{normalize, parse_analysis};
use crate::ai::mime::ensure_data_uri;
use crate::ai::{VisionRequest, VisionService};
use crate::config::ProxyConfig;
use crate::models::{AnalysisRequest, AnalysisResponse, ErrorBody};
use crate::{prompts, Error, Result};
use axum::http::{header, HeaderName, HeaderValue, Method, StatusCode};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";
pub const INVALID_BODY: &str = "Invalid request body";
pub const CONFIGURATION_ERROR: &str = "API configuration error";
pub const SERVICE_ERROR: &str = "Analysis service error";
pub const NO_ANALYSIS: &str = "No analysis generated";
pub const PARSE_FAILED: &str = "Failed to parse analysis";
pub const INTERNAL_ERROR: &str = "Internal server error";

/// Headers attached to every proxy response, preflight included.
pub fn cors_headers() -> [(HeaderName, HeaderValue); 4] {
    [
        (
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ),
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ),
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProxyBody {
    Empty,
    Analysis(AnalysisResponse),
    Failure(ErrorBody),
}

/// Framework-independent outcome of one handled request.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub body: ProxyBody,
}

impl ProxyResponse {
    pub fn preflight() -> Self {
        Self {
            status: StatusCode::OK,
            body: ProxyBody::Empty,
        }
    }

    pub fn success(analysis: AnalysisResponse) -> Self {
        Self {
            status: StatusCode::OK,
            body: ProxyBody::Analysis(analysis),
        }
    }

    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ProxyBody::Failure(ErrorBody::new(message)),
        }
    }

    pub fn headers(&self) -> [(HeaderName, HeaderValue); 4] {
        cors_headers()
    }

    pub fn body_json(&self) -> Result<Option<String>> {
        Ok(match &self.body {
            ProxyBody::Empty => None,
            ProxyBody::Analysis(analysis) => Some(serde_json::to_string(analysis)?),
            ProxyBody::Failure(failure) => Some(serde_json::to_string(failure)?),
        })
    }

    /// Message carried by a failure body.
    pub fn error_message(&self) -> Option<&str> {
        match &self.body {
            ProxyBody::Failure(failure) => failure.error.as_deref(),
            _ => None,
        }
    }
}

/// Stateless request handler between the app and the vision model.
pub struct AnalysisProxy {
    config: ProxyConfig,
    vision: Arc<dyn VisionService>,
}

impl AnalysisProxy {
    pub fn new(config: ProxyConfig, vision: Arc<dyn VisionService>) -> Self {
        Self { config, vision }
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    pub async fn handle(&self, method: &Method, body: &[u8]) -> ProxyResponse {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("analyze_face", %request_id, %method);

        async move {
            if *method == Method::OPTIONS {
                return ProxyResponse::preflight();
            }
            if *method != Method::POST {
                tracing::warn!("Rejected {} request", method);
                return ProxyResponse::failure(StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED);
            }

            match self.analyze(body).await {
                Ok(analysis) => {
                    tracing::info!(
                        "Analysis complete: current {} ({}), potential {} ({}), {} metrics",
                        analysis.current_score,
                        analysis.current_tier,
                        analysis.potential_score,
                        analysis.potential_tier,
                        analysis.metrics.len()
                    );
                    ProxyResponse::success(analysis)
                }
                Err(e) => Self::error_response(e),
            }
        }
        .instrument(span)
        .await
    }

    async fn analyze(&self, body: &[u8]) -> Result<AnalysisResponse> {
        let request: AnalysisRequest = serde_json::from_slice(body).map_err(|e| {
            tracing::warn!("Unreadable request body: {}", e);
            Error::InvalidInput(INVALID_BODY.to_string())
        })?;
        request.validate()?;

        tracing::debug!(
            "Front image {} chars, side image {} chars",
            request.front_image.len(),
            request.side_image.len()
        );

        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Configuration("XAI_API_KEY not configured".to_string()))?;

        let vision_request = self.build_vision_request(&request);
        let content = self
            .vision
            .complete(api_key, &vision_request)
            .await?
            .ok_or(Error::EmptyCompletion)?;

        let analysis = parse_analysis(&content)?;
        Ok(normalize(&analysis))
    }

    fn build_vision_request(&self, request: &AnalysisRequest) -> VisionRequest {
        VisionRequest {
            system: prompts::ANALYSIS_SYSTEM.to_string(),
            prompt: prompts::build_analysis_prompt(
                &self.config.prompt_template,
                request.user_data.as_ref(),
            ),
            image_urls: vec![
                ensure_data_uri(&request.front_image),
                ensure_data_uri(&request.side_image),
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }

    /// Map an error to a sanitized response; details stay in the logs.
    fn error_response(err: Error) -> ProxyResponse {
        match err {
            Error::InvalidInput(message) => {
                tracing::warn!("Rejected request: {}", message);
                ProxyResponse::failure(StatusCode::BAD_REQUEST, message)
            }
            Error::Configuration(detail) => {
                tracing::error!("{}", detail);
                ProxyResponse::failure(StatusCode::INTERNAL_SERVER_ERROR, CONFIGURATION_ERROR)
            }
            Error::UpstreamStatus { status } => ProxyResponse::failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{} (upstream status {})", SERVICE_ERROR, status),
            ),
            Error::Upstream(_) | Error::Http(_) => {
                ProxyResponse::failure(StatusCode::INTERNAL_SERVER_ERROR, SERVICE_ERROR)
            }
            Error::EmptyCompletion => {
                tracing::error!("Upstream reply had no content");
                ProxyResponse::failure(StatusCode::INTERNAL_SERVER_ERROR, NO_ANALYSIS)
            }
            Error::Parse(_) => {
                ProxyResponse::failure(StatusCode::INTERNAL_SERVER_ERROR, PARSE_FAILED)
            }
            other => {
                tracing::error!("Handler error: {}", other);
                ProxyResponse::failure(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
            }
        }
    }
}
