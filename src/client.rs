//! App-side envelope around the call to the analysis proxy.
//!
//! One attempt per call: no retry, no caching. A timeout or a caller
//! cancellation drops the in-flight request.

use crate::config::ClientConfig;
use crate::models::{AnalysisRequest, AnalysisResponse, ErrorBody};
use crate::{Error, Result};
use reqwest::{Client, StatusCode};
use tokio_util::sync::CancellationToken;

pub const ENDPOINT_NOT_FOUND: &str =
    "API endpoint not found (404). Please check that the analysis proxy is deployed.";
pub const ANALYSIS_FAILED: &str = "Analysis failed";

pub struct AnalysisClient {
    http: Client,
    config: ClientConfig,
}

impl AnalysisClient {
    pub fn new(config: ClientConfig) -> Self {
        Self::new_with_client(config, Client::new())
    }

    pub fn new_with_client(config: ClientConfig, http: Client) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Submit both photographs and wait for the normalized analysis.
    pub async fn analyze_face(&self, request: &AnalysisRequest) -> Result<AnalysisResponse> {
        self.analyze_face_with_cancel(request, CancellationToken::new())
            .await
    }

    /// Like [`analyze_face`](Self::analyze_face), but abortable through `cancel`.
    ///
    /// When the configured timeout elapses first, `cancel` is fired and the
    /// call fails with [`Error::Timeout`]; a caller-side cancellation yields
    /// [`Error::Cancelled`]. The timer lives only as long as this call.
    pub async fn analyze_face_with_cancel(
        &self,
        request: &AnalysisRequest,
        cancel: CancellationToken,
    ) -> Result<AnalysisResponse> {
        let url = self.config.analyze_url();
        tracing::info!("Starting analysis via {}", url);
        tracing::debug!(
            "Front image {} chars, side image {} chars, user data: {}",
            request.front_image.len(),
            request.side_image.len(),
            request.user_data.is_some()
        );

        tokio::select! {
            result = self.submit(&url, request) => {
                if let Err(e) = &result {
                    tracing::error!("Analysis failed: {}", e);
                }
                result
            }
            _ = tokio::time::sleep(self.config.timeout) => {
                cancel.cancel();
                tracing::warn!("Analysis timed out after {:?}", self.config.timeout);
                Err(Error::Timeout)
            }
            _ = cancel.cancelled() => {
                tracing::info!("Analysis cancelled by caller");
                Err(Error::Cancelled)
            }
        }
    }

    async fn submit(&self, url: &str, request: &AnalysisRequest) -> Result<AnalysisResponse> {
        let response = self.http.post(url).json(request).send().await?;

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!("Proxy responded with status {}", status);

        if !status.is_success() {
            tracing::error!("Error response body: {}", body);
            let message = server_error_message(status, &body);
            return Err(Error::Server {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ErrorBody = serde_json::from_str(&body)?;
        if !envelope.success {
            let message = envelope
                .error
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| ANALYSIS_FAILED.to_string());
            return Err(Error::ApplicationFailure(message));
        }

        let analysis: AnalysisResponse = serde_json::from_str(&body)?;
        tracing::info!(
            "Analysis successful: current {} ({})",
            analysis.current_score,
            analysis.current_tier
        );
        Ok(analysis)
    }
}

/// Prefer the proxy's own `error` field; fall back to a status message.
fn server_error_message(status: StatusCode, body: &str) -> String {
    let fallback = format!("Server error: {}", status.as_u16());
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => json
            .get("error")
            .and_then(serde_json::Value::as_str)
            .filter(|e| !e.trim().is_empty())
            .map(str::to_string)
            .unwrap_or(fallback),
        Err(_) if status == StatusCode::NOT_FOUND => ENDPOINT_NOT_FOUND.to_string(),
        Err(_) => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ANALYZE_PATH;
    use crate::models::{FacialMetric, Gender, UserData};
    use crate::tier::Tier;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_client(base_url: String, timeout: Duration) -> AnalysisClient {
        AnalysisClient::new(ClientConfig { base_url, timeout })
    }

    fn request() -> AnalysisRequest {
        AnalysisRequest::new(
            "data:image/jpeg;base64,FRONT".to_string(),
            "data:image/jpeg;base64,SIDE".to_string(),
        )
        .with_user_data(UserData {
            name: Some("Alex".to_string()),
            gender: Some(Gender::Male),
            age_range: Some("25-34".to_string()),
            focus_areas: Some(vec!["skin".to_string()]),
        })
    }

    fn sample_analysis() -> AnalysisResponse {
        AnalysisResponse {
            success: true,
            current_score: 5.9,
            potential_score: 7.8,
            current_tier: Tier::AboveAverage,
            potential_tier: Tier::Attractive,
            metrics: vec![FacialMetric {
                id: "eyes".to_string(),
                label: "Eye Area".to_string(),
                score: 6.0,
                potential: 7.5,
                insights: "Mild under-eye darkness".to_string(),
                improvements: vec!["Consistent sleep".to_string()],
            }],
            summary: "Balanced features.".to_string(),
            priority_actions: vec!["Sleep".to_string(), "Hydrate".to_string()],
            error: None,
        }
    }

    async fn mount(server: &MockServer, template: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(ANALYZE_PATH))
            .respond_with(template)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_success_round_trips_analysis() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ANALYZE_PATH))
            .and(header("Content-Type", "application/json"))
            .and(body_json(serde_json::to_value(request()).unwrap()))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_analysis()))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(server.uri(), Duration::from_secs(5));
        let analysis = client.analyze_face(&request()).await.unwrap();
        assert_eq!(analysis, sample_analysis());
    }

    #[tokio::test]
    async fn test_success_false_is_application_failure() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "success": false, "error": "x" })),
        )
        .await;

        let client = make_client(server.uri(), Duration::from_secs(5));
        let err = client.analyze_face(&request()).await.unwrap_err();
        assert!(matches!(err, Error::ApplicationFailure(_)));
        assert_eq!(err.to_string(), "x");
    }

    #[tokio::test]
    async fn test_success_false_without_message() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "success": false })),
        )
        .await;

        let client = make_client(server.uri(), Duration::from_secs(5));
        let err = client.analyze_face(&request()).await.unwrap_err();
        assert_eq!(err.to_string(), ANALYSIS_FAILED);
    }

    #[tokio::test]
    async fn test_json_error_body_message_is_surfaced() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "success": false,
                "error": "Both front and side images are required"
            })),
        )
        .await;

        let client = make_client(server.uri(), Duration::from_secs(5));
        let err = client.analyze_face(&request()).await.unwrap_err();
        assert!(matches!(err, Error::Server { status: 400, .. }));
        assert_eq!(err.to_string(), "Both front and side images are required");
    }

    #[tokio::test]
    async fn test_html_404_mentions_endpoint() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(404)
                .set_body_string("<!DOCTYPE html><html><body>404: NOT_FOUND</body></html>"),
        )
        .await;

        let client = make_client(server.uri(), Duration::from_secs(5));
        let err = client.analyze_face(&request()).await.unwrap_err();
        assert!(matches!(err, Error::Server { status: 404, .. }));
        let message = err.to_string();
        assert!(message.contains("endpoint"));
        assert!(message.contains("404"));
    }

    #[tokio::test]
    async fn test_html_error_falls_back_to_status() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(502).set_body_string("<html>Bad gateway</html>"),
        )
        .await;

        let client = make_client(server.uri(), Duration::from_secs(5));
        let err = client.analyze_face(&request()).await.unwrap_err();
        assert_eq!(err.to_string(), "Server error: 502");
    }

    #[tokio::test]
    async fn test_timeout_aborts_request() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(200)
                .set_body_json(sample_analysis())
                .set_delay(Duration::from_secs(5)),
        )
        .await;

        let client = make_client(server.uri(), Duration::from_millis(100));
        let cancel = CancellationToken::new();
        let err = client
            .analyze_face_with_cancel(&request(), cancel.clone())
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert!(err.to_string().contains("timed out"));
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_caller_cancellation() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(200)
                .set_body_json(sample_analysis())
                .set_delay(Duration::from_secs(5)),
        )
        .await;

        let client = make_client(server.uri(), Duration::from_secs(30));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let err = client
            .analyze_face_with_cancel(&request(), cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[tokio::test]
    async fn test_timer_does_not_fire_after_success() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(200).set_body_json(sample_analysis()),
        )
        .await;

        let client = make_client(server.uri(), Duration::from_millis(200));
        let cancel = CancellationToken::new();
        client
            .analyze_face_with_cancel(&request(), cancel.clone())
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(!cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = make_client(format!("http://{}", addr), Duration::from_secs(5));
        let err = client.analyze_face(&request()).await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_server_error_message() {
        assert_eq!(
            server_error_message(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":"boom"}"#),
            "boom"
        );
        assert_eq!(
            server_error_message(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":""}"#),
            "Server error: 500"
        );
        assert_eq!(
            server_error_message(StatusCode::NOT_FOUND, "<html></html>"),
            ENDPOINT_NOT_FOUND
        );
        assert_eq!(
            server_error_message(StatusCode::NOT_FOUND, r#"{"success":false}"#),
            "Server error: 404"
        );
    }
}
