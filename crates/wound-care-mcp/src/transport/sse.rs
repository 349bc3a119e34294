//! HTTP transport — JSON-RPC over POST /mcp, plus GET /health.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json as AxumJson, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::protocol::ProtocolHandler;
use crate::tools::ToolRegistry;
use crate::types::{JsonRpcMessage, McpError, McpResult};

use super::framing;

/// HTTP transport for web-based MCP clients.
pub struct SseTransport {
    handler: Arc<ProtocolHandler>,
}

impl SseTransport {
    pub fn new(handler: ProtocolHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Build the axum router. Split out from `run` so it can be served in tests.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/mcp", post(handle_request))
            .route("/health", get(handle_health))
            .layer(CorsLayer::permissive())
            .with_state(self.handler.clone())
    }

    /// Run the HTTP server on the given address.
    pub async fn run(&self, addr: &str) -> McpResult<()> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(McpError::Io)?;

        tracing::info!("HTTP transport listening on {addr}");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| McpError::Transport(e.to_string()))?;

        Ok(())
    }
}

async fn handle_request(
    State(handler): State<Arc<ProtocolHandler>>,
    AxumJson(body): AxumJson<Value>,
) -> Response {
    let msg: JsonRpcMessage = match serde_json::from_value(body) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::warn!("Parse error: {e}");
            let error = McpError::ParseError(e.to_string());
            return (StatusCode::BAD_REQUEST, AxumJson(framing::unparsed_error(&error)))
                .into_response();
        }
    };

    match handler.handle_message(msg).await {
        Some(response) => AxumJson(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

async fn handle_health() -> AxumJson<Value> {
    AxumJson(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "tools": ToolRegistry::list_tools().len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use wound_care::types::Segmentation;
    use wound_care::{CalibrationRatio, Segmenter, VisionLanguageModel, WoundAnalyzer, WoundResult};

    use crate::service::WoundService;

    struct Nothing;

    impl Segmenter for Nothing {
        fn segment(&mut self, image: &image::RgbImage, _t: f32) -> WoundResult<Segmentation> {
            Ok(Segmentation::empty(image.width(), image.height()))
        }
    }

    #[async_trait::async_trait]
    impl VisionLanguageModel for Nothing {
        async fn generate(&self, _png: &[u8], _prompt: &str) -> WoundResult<String> {
            Ok("unclear".to_string())
        }
    }

    fn transport() -> SseTransport {
        let analyzer = WoundAnalyzer::new(
            Box::new(Nothing),
            Arc::new(Nothing),
            CalibrationRatio::default(),
        );
        let service = WoundService::new(analyzer, "/nonexistent/kb.json".into(), 0.1);
        SseTransport::new(ProtocolHandler::new(Arc::new(service)))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = transport()
            .router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["tools"], 5);
    }

    #[tokio::test]
    async fn test_post_request_and_notification() {
        let router = transport().router();

        let request = Request::post("/mcp")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"sum","arguments":{"a":1,"b":2}}}"#,
            ))
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["result"]["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("3"));

        let notification = Request::post("/mcp")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"jsonrpc":"2.0","method":"initialized"}"#))
            .unwrap();
        let response = router.clone().oneshot(notification).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let garbage = Request::post("/mcp")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"hello":"world"}"#))
            .unwrap();
        let response = router.oneshot(garbage).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
