//! Axum wiring for [`AnalysisProxy`].

use super::handler::{AnalysisProxy, ProxyResponse, INTERNAL_ERROR};
use crate::config::{ANALYZE_PATH, MAX_BODY_BYTES};
use axum::body::{Body, Bytes};
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let (status, body) = match self.body_json() {
            Ok(Some(json)) => (self.status, Body::from(json)),
            Ok(None) => (self.status, Body::empty()),
            Err(e) => {
                tracing::error!("Failed to encode response body: {}", e);
                let fallback = ProxyResponse::failure(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR);
                let json = fallback.body_json().ok().flatten().unwrap_or_default();
                (fallback.status, Body::from(json))
            }
        };

        let mut response = Response::new(body);
        *response.status_mut() = status;
        for (name, value) in self.headers() {
            response.headers_mut().insert(name, value);
        }
        response
    }
}

/// Build the router serving the analysis endpoint.
pub fn create_router(proxy: Arc<AnalysisProxy>) -> Router {
    Router::new()
        .route(ANALYZE_PATH, any(analyze_handler))
        // Two base64 photographs easily exceed the default limit
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(proxy)
}

async fn analyze_handler(
    State(proxy): State<Arc<AnalysisProxy>>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> ProxyResponse {
    match body {
        Ok(body) => proxy.handle(&method, &body).await,
        Err(rejection) => {
            tracing::warn!("Rejected request body: {}", rejection.body_text());
            ProxyResponse::failure(rejection.status(), rejection.body_text())
        }
    }
}

/// Serve the proxy until the listener fails.
pub async fn serve(listener: TcpListener, proxy: Arc<AnalysisProxy>) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Analysis proxy listening on http://{}{}", addr, ANALYZE_PATH);
    }
    axum::serve(listener, create_router(proxy)).await
}
